//! Targets manifest: binds payload names to verifiable descriptors.
//!
//! Each payload is described by its name, byte length, and SHA-256 digest.
//! The manifest is keyed by a `BTreeMap`, so serialization order is the sorted
//! name order regardless of how the caller assembled the payload map.
//!
//! The signed wrapper carries no signature in the minimal flow; it is a
//! serialization boundary kept structurally symmetric with the signed root
//! document so a signature list can be added without reshaping the wire.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::keys::SIGNATURE_LEN;
use crate::signing::Signature;
use crate::wire::{self, tags, WireError, WireReader, WireWriter};

// ---------------------------------------------------------------------------
// TargetFile
// ---------------------------------------------------------------------------

/// Descriptor of one named payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    pub file_name: String,
    pub length: u64,
    pub sha256: [u8; 32],
}

impl TargetFile {
    /// Compute a descriptor for a payload.
    pub fn describe(file_name: &str, payload: &[u8]) -> Self {
        Self {
            file_name: file_name.to_string(),
            length: payload.len() as u64,
            sha256: Sha256::digest(payload).into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TargetsMetadata
// ---------------------------------------------------------------------------

/// The targets manifest: payload name -> descriptor, unique per name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetsMetadata {
    pub targets: BTreeMap<String, TargetFile>,
}

impl TargetsMetadata {
    /// Build a manifest describing every payload in the map.
    pub fn build(payloads: &BTreeMap<String, Vec<u8>>) -> Self {
        let targets = payloads
            .iter()
            .map(|(name, payload)| (name.clone(), TargetFile::describe(name, payload)))
            .collect();
        Self { targets }
    }

    /// Serialize deterministically: one nested TARGET_FILE record per entry,
    /// in sorted name order.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        for target in self.targets.values() {
            let mut entry = WireWriter::new();
            entry
                .record(tags::FILE_NAME, target.file_name.as_bytes())
                .u64_record(tags::FILE_LENGTH, target.length)
                .record(tags::FILE_SHA256, &target.sha256);
            w.record(tags::TARGET_FILE, &entry.into_bytes());
        }
        w.into_bytes()
    }

    pub fn from_wire(buf: &[u8]) -> Result<Self, WireError> {
        let mut r = WireReader::new(buf);
        let mut targets = BTreeMap::new();
        while let Some((tag, payload)) = r.next_record()? {
            if tag != tags::TARGET_FILE {
                return Err(WireError::UnexpectedTag {
                    expected: tags::TARGET_FILE,
                    found: tag,
                });
            }
            let mut entry = WireReader::new(payload);
            let file_name =
                wire::read_string(tags::FILE_NAME, entry.expect(tags::FILE_NAME)?)?;
            let length = wire::read_u64(tags::FILE_LENGTH, entry.expect(tags::FILE_LENGTH)?)?;
            let digest = entry.expect(tags::FILE_SHA256)?;
            let sha256: [u8; 32] = digest.try_into().map_err(|_| WireError::BadLength {
                tag: tags::FILE_SHA256,
                expected: 32,
                found: digest.len(),
            })?;
            targets.insert(
                file_name.clone(),
                TargetFile {
                    file_name,
                    length,
                    sha256,
                },
            );
        }
        Ok(Self { targets })
    }

    /// Serialize and wrap. No signature is applied in the minimal flow.
    pub fn sign(&self) -> SignedTargetsMetadata {
        SignedTargetsMetadata {
            serialized_targets_metadata: self.to_wire(),
            signatures: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SignedTargetsMetadata
// ---------------------------------------------------------------------------

/// A serialized targets manifest ready for bundle embedding. The exact bytes
/// here are what a future signature list would cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTargetsMetadata {
    pub serialized_targets_metadata: Vec<u8>,
    pub signatures: Vec<Signature>,
}

impl SignedTargetsMetadata {
    pub fn to_wire(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.record(
            tags::SERIALIZED_TARGETS,
            &self.serialized_targets_metadata,
        );
        for sig in &self.signatures {
            w.record(tags::SIGNATURE, sig.as_bytes());
        }
        w.into_bytes()
    }

    pub fn from_wire(buf: &[u8]) -> Result<Self, WireError> {
        let mut r = WireReader::new(buf);
        let serialized = r.expect(tags::SERIALIZED_TARGETS)?.to_vec();
        let mut signatures = Vec::new();
        while let Some((tag, payload)) = r.next_record()? {
            if tag != tags::SIGNATURE {
                return Err(WireError::UnexpectedTag {
                    expected: tags::SIGNATURE,
                    found: tag,
                });
            }
            let bytes: [u8; SIGNATURE_LEN] =
                payload.try_into().map_err(|_| WireError::BadLength {
                    tag,
                    expected: SIGNATURE_LEN,
                    found: payload.len(),
                })?;
            signatures.push(Signature(bytes));
        }
        Ok(Self {
            serialized_targets_metadata: serialized,
            signatures,
        })
    }
}
