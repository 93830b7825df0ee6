//! Fixture-generation configuration.
//!
//! Loaded from `bundle_forge.toml` next to the invocation or from a
//! user-specified path; every field has a default so an absent file means the
//! stock fixture set.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fault_injection::DEFAULT_FILL;

/// Role name under which the targets metadata is keyed in the bundle.
pub const DEFAULT_TARGETS_ROLE: &str = "targets";

/// Top-level configuration for bundle-forge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Root metadata version. One value feeds every root document in a run,
    /// so rotation fixtures cannot accidentally differ in version.
    pub version: u32,

    /// Role name for the generated targets metadata.
    pub targets_role: String,

    /// Fill byte for corrupted signature slots.
    pub corrupt_fill: u8,

    /// Whether `generate` also renders the C byte-array header.
    pub emit_header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            targets_role: DEFAULT_TARGETS_ROLE.to_string(),
            corrupt_fill: DEFAULT_FILL,
            emit_header: true,
        }
    }
}

impl Config {
    /// Parse a TOML document; omitted fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            detail: e.to_string(),
        })
    }

    /// Render the resolved configuration back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            detail: e.to_string(),
        })
    }

    /// Load from an explicit path, or fall back to defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                    path: path.display().to_string(),
                    detail: e.to_string(),
                })?;
                Self::from_toml_str(&text)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

pub mod error_codes {
    pub const ERR_CONFIG_IO: &str = "ERR_CONFIG_IO";
    pub const ERR_CONFIG_PARSE: &str = "ERR_CONFIG_PARSE";
    pub const ERR_CONFIG_SERIALIZE: &str = "ERR_CONFIG_SERIALIZE";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, detail: String },
    Parse { detail: String },
    Serialize { detail: String },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_codes::ERR_CONFIG_IO,
            Self::Parse { .. } => error_codes::ERR_CONFIG_PARSE,
            Self::Serialize { .. } => error_codes::ERR_CONFIG_SERIALIZE,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, detail } => write!(f, "failed reading config {path}: {detail}"),
            Self::Parse { detail } => write!(f, "failed parsing config: {detail}"),
            Self::Serialize { detail } => write!(f, "failed serializing config: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}
