//! Root-of-trust metadata: the document naming trusted root and targets keys.
//!
//! A `RootMetadata` is a write-once value. Serialization is deterministic
//! (fixed field order, caller-ordered key sets) because one serialized buffer
//! is signed by multiple keys and must be byte-identical between signing and
//! verification.
//!
//! # Invariants
//!
//! - INV-ROOT-NONEMPTY: at least one root key and one targets key.
//! - INV-ROOT-DETERMINISTIC: identical inputs serialize to identical bytes.
//! - INV-ROOT-ROUND-TRIP: decoding re-derives the original key sets and version.

use std::fmt;

use crate::wire::{self, tags, WireError, WireReader, WireWriter};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

pub mod error_codes {
    pub const ERR_ROOT_NO_ROOT_KEYS: &str = "ERR_ROOT_NO_ROOT_KEYS";
    pub const ERR_ROOT_NO_TARGETS_KEYS: &str = "ERR_ROOT_NO_TARGETS_KEYS";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootMetadataError {
    /// The root key set is empty (INV-ROOT-NONEMPTY).
    EmptyRootKeys,
    /// The targets key set is empty (INV-ROOT-NONEMPTY).
    EmptyTargetsKeys,
}

impl RootMetadataError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyRootKeys => error_codes::ERR_ROOT_NO_ROOT_KEYS,
            Self::EmptyTargetsKeys => error_codes::ERR_ROOT_NO_TARGETS_KEYS,
        }
    }
}

impl fmt::Display for RootMetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRootKeys => write!(f, "root metadata requires at least one root key"),
            Self::EmptyTargetsKeys => {
                write!(f, "root metadata requires at least one targets key")
            }
        }
    }
}

impl std::error::Error for RootMetadataError {}

// ---------------------------------------------------------------------------
// RootMetadata
// ---------------------------------------------------------------------------

/// The unsigned root-of-trust document. Key entries are SubjectPublicKeyInfo
/// PEM bytes in caller order; order is preserved on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMetadata {
    /// Monotonically increasing document version.
    pub version: u32,
    /// Trusted root keys, ordered.
    pub root_keys: Vec<Vec<u8>>,
    /// Trusted targets keys, ordered.
    pub targets_keys: Vec<Vec<u8>>,
}

impl RootMetadata {
    /// Construct a root metadata document. Purely in-memory; no I/O.
    pub fn build(
        root_keys: Vec<Vec<u8>>,
        targets_keys: Vec<Vec<u8>>,
        version: u32,
    ) -> Result<Self, RootMetadataError> {
        if root_keys.is_empty() {
            return Err(RootMetadataError::EmptyRootKeys);
        }
        if targets_keys.is_empty() {
            return Err(RootMetadataError::EmptyTargetsKeys);
        }
        Ok(Self {
            version,
            root_keys,
            targets_keys,
        })
    }

    /// Serialize to the deterministic wire form the signatures cover.
    ///
    /// Layout: VERSION record, then one ROOT_KEY record per root key, then
    /// one TARGETS_KEY record per targets key.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.u32_record(tags::VERSION, self.version);
        for key in &self.root_keys {
            w.record(tags::ROOT_KEY, key);
        }
        for key in &self.targets_keys {
            w.record(tags::TARGETS_KEY, key);
        }
        w.into_bytes()
    }

    /// Decode a wire buffer back into the logical document.
    ///
    /// Strict about record order: VERSION first, then ROOT_KEY records, then
    /// TARGETS_KEY records. Anything else is rejected rather than reordered,
    /// so decode(encode(x)) == x and nothing non-canonical round-trips.
    pub fn from_wire(buf: &[u8]) -> Result<Self, WireError> {
        let mut r = WireReader::new(buf);
        let version = wire::read_u32(tags::VERSION, r.expect(tags::VERSION)?)?;

        let mut root_keys = Vec::new();
        let mut targets_keys = Vec::new();
        while let Some((tag, payload)) = r.next_record()? {
            match tag {
                tags::ROOT_KEY if targets_keys.is_empty() => {
                    root_keys.push(payload.to_vec());
                }
                tags::TARGETS_KEY => targets_keys.push(payload.to_vec()),
                found => {
                    return Err(WireError::UnexpectedTag {
                        expected: tags::TARGETS_KEY,
                        found,
                    })
                }
            }
        }
        Ok(Self {
            version,
            root_keys,
            targets_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RootMetadata {
        RootMetadata::build(
            vec![b"root-key-pem".to_vec()],
            vec![b"targets-key-pem".to_vec()],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_build_rejects_empty_root_keys() {
        let err = RootMetadata::build(vec![], vec![b"t".to_vec()], 1).unwrap_err();
        assert_eq!(err.code(), error_codes::ERR_ROOT_NO_ROOT_KEYS);
    }

    #[test]
    fn test_build_rejects_empty_targets_keys() {
        let err = RootMetadata::build(vec![b"r".to_vec()], vec![], 1).unwrap_err();
        assert_eq!(err, RootMetadataError::EmptyTargetsKeys);
    }

    #[test]
    fn test_serialization_deterministic() {
        assert_eq!(sample().to_wire(), sample().to_wire());
    }

    #[test]
    fn test_wire_round_trip() {
        let doc = RootMetadata::build(
            vec![b"root-a".to_vec(), b"root-b".to_vec()],
            vec![b"targets-a".to_vec()],
            42,
        )
        .unwrap();
        let decoded = RootMetadata::from_wire(&doc.to_wire()).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_key_order_preserved() {
        let doc = RootMetadata::build(
            vec![b"first".to_vec(), b"second".to_vec()],
            vec![b"t".to_vec()],
            1,
        )
        .unwrap();
        let decoded = RootMetadata::from_wire(&doc.to_wire()).unwrap();
        assert_eq!(decoded.root_keys, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn test_version_changes_wire_bytes() {
        let mut other = sample();
        other.version = 2;
        assert_ne!(sample().to_wire(), other.to_wire());
    }

    #[test]
    fn test_from_wire_rejects_root_key_after_targets_key() {
        let mut w = WireWriter::new();
        w.u32_record(tags::VERSION, 1)
            .record(tags::TARGETS_KEY, b"t")
            .record(tags::ROOT_KEY, b"r");
        let err = RootMetadata::from_wire(&w.into_bytes()).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedTag { .. }));
    }

    #[test]
    fn test_from_wire_requires_version_first() {
        let mut w = WireWriter::new();
        w.record(tags::ROOT_KEY, b"r");
        assert!(RootMetadata::from_wire(&w.into_bytes()).is_err());
    }
}
