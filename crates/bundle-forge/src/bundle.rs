//! Update-bundle assembly: the single artifact a verifier consumes.
//!
//! Assembly is pure composition with no cross-reference validation: a name in
//! the targets manifest without a matching payload (or the reverse) is left
//! alone, because negative fixtures are sometimes deliberately inconsistent.

use std::collections::BTreeMap;

use crate::signing::SignedRootMetadata;
use crate::targets_metadata::SignedTargetsMetadata;
use crate::wire::{self, tags, WireError, WireReader, WireWriter};

/// The assembled bundle. Maps are `BTreeMap`s so serialization order never
/// depends on how the caller built them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateBundle {
    /// Signed root metadata, absent for bundles that rely on the device's
    /// already-provisioned root.
    pub root_metadata: Option<SignedRootMetadata>,
    /// Signed targets metadata by role name (e.g. "targets").
    pub targets_metadata: BTreeMap<String, SignedTargetsMetadata>,
    /// Raw payload bytes by payload name.
    pub target_payloads: BTreeMap<String, Vec<u8>>,
}

/// Compose a bundle. Pure; idempotent; no validation of cross-references.
pub fn assemble(
    signed_root: Option<SignedRootMetadata>,
    signed_targets: BTreeMap<String, SignedTargetsMetadata>,
    payloads: BTreeMap<String, Vec<u8>>,
) -> UpdateBundle {
    UpdateBundle {
        root_metadata: signed_root,
        targets_metadata: signed_targets,
        target_payloads: payloads,
    }
}

impl UpdateBundle {
    /// Serialize deterministically: optional BUNDLE_ROOT record, then one
    /// BUNDLE_TARGETS_ROLE record per role (sorted), then one PAYLOAD_ENTRY
    /// record per payload (sorted).
    pub fn to_wire(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        if let Some(root) = &self.root_metadata {
            w.record(tags::BUNDLE_ROOT, &root.to_wire());
        }
        for (role, signed) in &self.targets_metadata {
            let mut entry = WireWriter::new();
            entry
                .record(tags::ROLE_NAME, role.as_bytes())
                .record(tags::SIGNED_TARGETS, &signed.to_wire());
            w.record(tags::BUNDLE_TARGETS_ROLE, &entry.into_bytes());
        }
        for (name, payload) in &self.target_payloads {
            let mut entry = WireWriter::new();
            entry
                .record(tags::PAYLOAD_NAME, name.as_bytes())
                .record(tags::PAYLOAD_BYTES, payload);
            w.record(tags::PAYLOAD_ENTRY, &entry.into_bytes());
        }
        w.into_bytes()
    }

    pub fn from_wire(buf: &[u8]) -> Result<Self, WireError> {
        let mut r = WireReader::new(buf);
        let mut bundle = UpdateBundle::default();
        while let Some((tag, payload)) = r.next_record()? {
            match tag {
                tags::BUNDLE_ROOT => {
                    bundle.root_metadata = Some(SignedRootMetadata::from_wire(payload)?);
                }
                tags::BUNDLE_TARGETS_ROLE => {
                    let mut entry = WireReader::new(payload);
                    let role =
                        wire::read_string(tags::ROLE_NAME, entry.expect(tags::ROLE_NAME)?)?;
                    let signed =
                        SignedTargetsMetadata::from_wire(entry.expect(tags::SIGNED_TARGETS)?)?;
                    bundle.targets_metadata.insert(role, signed);
                }
                tags::PAYLOAD_ENTRY => {
                    let mut entry = WireReader::new(payload);
                    let name =
                        wire::read_string(tags::PAYLOAD_NAME, entry.expect(tags::PAYLOAD_NAME)?)?;
                    let bytes = entry.expect(tags::PAYLOAD_BYTES)?.to_vec();
                    bundle.target_payloads.insert(name, bytes);
                }
                found => {
                    return Err(WireError::UnexpectedTag {
                        expected: tags::PAYLOAD_ENTRY,
                        found,
                    })
                }
            }
        }
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TEST_DEV_KEY_PEM;
    use crate::keys::KeyMaterial;
    use crate::signing::dev_sign_root;
    use crate::targets_metadata::TargetsMetadata;

    fn sample_payloads() -> BTreeMap<String, Vec<u8>> {
        let mut payloads = BTreeMap::new();
        payloads.insert("file1".to_string(), b"file 1 content".to_vec());
        payloads.insert("file2".to_string(), b"file 2 content".to_vec());
        payloads
    }

    fn sample_bundle() -> UpdateBundle {
        let dev = KeyMaterial::from_pkcs8_pem(TEST_DEV_KEY_PEM).unwrap();
        let payloads = sample_payloads();
        let signed_root = dev_sign_root(b"serialized root".to_vec(), &dev);
        let mut targets = BTreeMap::new();
        targets.insert(
            "targets".to_string(),
            TargetsMetadata::build(&payloads).sign(),
        );
        assemble(Some(signed_root), targets, payloads)
    }

    #[test]
    fn test_assemble_preserves_payload_map_exactly() {
        let bundle = sample_bundle();
        assert_eq!(bundle.target_payloads, sample_payloads());
    }

    #[test]
    fn test_assemble_is_idempotent() {
        assert_eq!(sample_bundle().to_wire(), sample_bundle().to_wire());
    }

    #[test]
    fn test_assemble_without_root_metadata() {
        let bundle = assemble(None, BTreeMap::new(), sample_payloads());
        assert!(bundle.root_metadata.is_none());
        let decoded = UpdateBundle::from_wire(&bundle.to_wire()).unwrap();
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn test_wire_round_trip() {
        let bundle = sample_bundle();
        let decoded = UpdateBundle::from_wire(&bundle.to_wire()).unwrap();
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn test_serialization_independent_of_payload_insertion_order() {
        let mut reversed = BTreeMap::new();
        reversed.insert("file2".to_string(), b"file 2 content".to_vec());
        reversed.insert("file1".to_string(), b"file 1 content".to_vec());
        let a = assemble(None, BTreeMap::new(), sample_payloads());
        let b = assemble(None, BTreeMap::new(), reversed);
        assert_eq!(a.to_wire(), b.to_wire());
    }

    #[test]
    fn test_no_cross_reference_validation() {
        // A manifest naming payloads that are absent from the payload map is
        // assembled unchanged; negative fixtures depend on this.
        let manifest = TargetsMetadata::build(&sample_payloads()).sign();
        let mut targets = BTreeMap::new();
        targets.insert("targets".to_string(), manifest);
        let bundle = assemble(None, targets, BTreeMap::new());
        assert!(bundle.target_payloads.is_empty());
        assert_eq!(bundle.targets_metadata.len(), 1);
    }

    #[test]
    fn test_from_wire_rejects_unknown_top_level_tag() {
        let mut w = WireWriter::new();
        w.record(0x7f, b"junk");
        assert!(UpdateBundle::from_wire(&w.into_bytes()).is_err());
    }

    #[test]
    fn test_empty_bundle_round_trips() {
        let empty = UpdateBundle::default();
        assert!(empty.to_wire().is_empty());
        assert_eq!(UpdateBundle::from_wire(&[]).unwrap(), empty);
    }
}
