#![forbid(unsafe_code)]

pub mod bundle;
mod cli;
mod config;
pub mod emit;
pub mod fault_injection;
pub mod fixtures;
pub mod keys;
pub mod root_metadata;
pub mod signing;
pub mod targets_metadata;
pub mod wire;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

use bundle::UpdateBundle;
use cli::{Cli, Command, GenerateArgs, InspectArgs};
use config::Config;
use fixtures::{default_payloads, FixtureGenerator};
use root_metadata::RootMetadata;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => handle_generate(&args),
        Command::Inspect(args) => handle_inspect(&args),
    }
}

fn handle_generate(args: &GenerateArgs) -> Result<()> {
    let config =
        Config::load(args.config.as_deref()).context("failed resolving configuration")?;
    tracing::debug!(
        config = %config.to_toml().unwrap_or_default(),
        "resolved fixture configuration"
    );

    let generator = FixtureGenerator::new(config.clone(), default_payloads())
        .context("failed initializing fixture generator")?;
    let set = generator
        .generate()
        .inspect_err(|e| tracing::error!(code = e.code(), error = %e, "fixture generation failed"))
        .context("fixture generation failed")?;
    let named = set.named();

    let paths = emit::write_fixture_files(&args.out_dir, &named).with_context(|| {
        format!("failed writing fixtures to {}", args.out_dir.display())
    })?;

    let header_path = if config.emit_header {
        let path = args
            .header
            .clone()
            .unwrap_or_else(|| args.out_dir.join("test_bundles.h"));
        emit::write_header(&path, &named)
            .with_context(|| format!("failed writing header {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    if args.json {
        let report = json!({
            "out_dir": args.out_dir.display().to_string(),
            "fixtures": named
                .iter()
                .zip(&paths)
                .map(|((name, data), path)| {
                    json!({
                        "name": name,
                        "path": path.display().to_string(),
                        "size_bytes": data.len(),
                    })
                })
                .collect::<Vec<_>>(),
            "header": header_path.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for ((name, data), path) in named.iter().zip(&paths) {
            println!("{name}: {} bytes -> {}", data.len(), path.display());
        }
        if let Some(path) = &header_path {
            println!("header -> {}", path.display());
        }
    }
    Ok(())
}

fn handle_inspect(args: &InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.bundle)
        .with_context(|| format!("failed reading {}", args.bundle.display()))?;
    let bundle = UpdateBundle::from_wire(&bytes)
        .with_context(|| format!("failed decoding {}", args.bundle.display()))?;

    let root = match &bundle.root_metadata {
        None => json!(null),
        Some(signed) => {
            let document = RootMetadata::from_wire(&signed.serialized_root_metadata)
                .context("failed decoding embedded root metadata")?;
            json!({
                "version": document.version,
                "root_keys": document.root_keys.len(),
                "targets_keys": document.targets_keys.len(),
                "signatures": signed.signatures.len(),
            })
        }
    };

    let payloads = bundle
        .target_payloads
        .iter()
        .map(|(name, data)| {
            json!({
                "name": name,
                "size_bytes": data.len(),
                "sha256": hex::encode(Sha256::digest(data)),
            })
        })
        .collect::<Vec<_>>();

    let summary = json!({
        "root_metadata": root,
        "targets_roles": bundle.targets_metadata.keys().collect::<Vec<_>>(),
        "target_payloads": payloads,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
