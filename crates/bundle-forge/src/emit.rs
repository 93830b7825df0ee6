//! Artifact emission: binary fixture files and the C byte-array header a
//! device test suite compiles in.

use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER_PREAMBLE: &str = "\
// Generated by bundle-forge. Do not edit by hand.
//
// Test fixtures for the secure-update verifier: serialized update bundles
// with dev-signed, rotation-signed, and deliberately corrupted root metadata.

#pragma once

#include <cstddef>

";

/// Render one `std::byte` array declaration.
pub fn byte_array_declaration(name: &str, data: &[u8]) -> String {
    let mut body = String::with_capacity(data.len() * 16);
    for byte in data {
        body.push_str(&format!("std::byte{{0x{byte:02x}}},"));
    }
    format!("[[maybe_unused]] const std::byte {name}[] = {{{body}}};\n")
}

/// Render the full header for a named fixture set.
pub fn render_header(fixtures: &[(&str, &[u8])]) -> String {
    let mut out = String::from(HEADER_PREAMBLE);
    for (name, data) in fixtures {
        out.push_str(&byte_array_declaration(name, data));
    }
    out
}

/// Write one `<name>.bin` per fixture into `out_dir`, returning the written
/// paths in emission order.
pub fn write_fixture_files(
    out_dir: &Path,
    fixtures: &[(&str, &[u8])],
) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut paths = Vec::with_capacity(fixtures.len());
    for (name, data) in fixtures {
        let path = out_dir.join(format!("{name}.bin"));
        let mut file = std::fs::File::create(&path)?;
        file.write_all(data)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Write the rendered header to `path`.
pub fn write_header(path: &Path, fixtures: &[(&str, &[u8])]) -> std::io::Result<()> {
    std::fs::write(path, render_header(fixtures))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_array_declaration_format() {
        let decl = byte_array_declaration("kTest", &[0x00, 0xab]);
        assert_eq!(
            decl,
            "[[maybe_unused]] const std::byte kTest[] = \
             {std::byte{0x00},std::byte{0xab},};\n"
        );
    }

    #[test]
    fn test_empty_array_declaration() {
        let decl = byte_array_declaration("kEmpty", &[]);
        assert_eq!(decl, "[[maybe_unused]] const std::byte kEmpty[] = {};\n");
    }

    #[test]
    fn test_render_header_contains_all_names() {
        let header = render_header(&[("kA", b"a".as_slice()), ("kB", b"b".as_slice())]);
        assert!(header.starts_with("// Generated by bundle-forge"));
        assert!(header.contains("#pragma once"));
        assert!(header.contains("const std::byte kA[]"));
        assert!(header.contains("const std::byte kB[]"));
    }

    #[test]
    fn test_render_header_deterministic() {
        let fixtures = [("kA", b"abc".as_slice())];
        assert_eq!(render_header(&fixtures), render_header(&fixtures));
    }

    #[test]
    fn test_write_fixture_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths =
            write_fixture_files(dir.path(), &[("kA", b"aaa".as_slice()), ("kB", b"b".as_slice())])
                .unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"aaa");
        assert_eq!(paths[1].file_name().unwrap(), "kB.bin");
    }

    #[test]
    fn test_write_header_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_bundles.h");
        write_header(&path, &[("kA", b"x".as_slice())]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("std::byte{0x78}"));
    }
}
