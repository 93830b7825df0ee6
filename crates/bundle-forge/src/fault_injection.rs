//! Deterministic signature corruption for negative test fixtures.
//!
//! Replaces one signature slot of an already-signed root document with a
//! fixed fill pattern: syntactically well-formed (correct length) but invalid
//! under every key. The goal is deterministic rejection by the verifier, not
//! cryptanalytic realism, so no attempt is made to forge a plausible value.
//!
//! The clean input is never mutated; a new value is returned so the clean
//! fixture stays independently reproducible.
//!
//! Which slot is corrupted decides which negative fixture results:
//! slot 0 -> the outgoing-root co-signature is bad; slot 1 -> the
//! incoming-root self-proof is bad. Verifiers must fail these two cases
//! distinguishably.

use std::fmt;

use crate::keys::SIGNATURE_LEN;
use crate::signing::{Signature, SignedRootMetadata};

/// Fill byte used by the stock negative fixtures (a 64-byte run of `'1'`).
pub const DEFAULT_FILL: u8 = b'1';

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

pub mod error_codes {
    pub const ERR_FAULT_INDEX_OUT_OF_RANGE: &str = "ERR_FAULT_INDEX_OUT_OF_RANGE";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultInjectionError {
    /// The requested signature slot does not exist.
    IndexOutOfRange { index: usize, len: usize },
}

impl FaultInjectionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange { .. } => error_codes::ERR_FAULT_INDEX_OUT_OF_RANGE,
        }
    }
}

impl fmt::Display for FaultInjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "signature slot {index} out of range ({len} slots)")
            }
        }
    }
}

impl std::error::Error for FaultInjectionError {}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

/// Return a copy of `signed` with signature slot `index` replaced by a
/// 64-byte run of `fill`. All other slots and the serialized document are
/// carried over untouched.
pub fn corrupt_signature(
    signed: &SignedRootMetadata,
    index: usize,
    fill: u8,
) -> Result<SignedRootMetadata, FaultInjectionError> {
    if index >= signed.signatures.len() {
        return Err(FaultInjectionError::IndexOutOfRange {
            index,
            len: signed.signatures.len(),
        });
    }
    let mut corrupted = signed.clone();
    corrupted.signatures[index] = Signature([fill; SIGNATURE_LEN]);
    Ok(corrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{TEST_DEV_KEY_PEM, TEST_PROD_KEY_PEM};
    use crate::keys::{verify_raw_signature, KeyMaterial};
    use crate::signing::rotation_sign_root;

    fn rotation_signed() -> (SignedRootMetadata, KeyMaterial, KeyMaterial) {
        let dev = KeyMaterial::from_pkcs8_pem(TEST_DEV_KEY_PEM).unwrap();
        let prod = KeyMaterial::from_pkcs8_pem(TEST_PROD_KEY_PEM).unwrap();
        let signed = rotation_sign_root(b"rotation doc".to_vec(), &dev, &prod);
        (signed, dev, prod)
    }

    #[test]
    fn test_corrupt_replaces_only_requested_slot() {
        let (signed, _, _) = rotation_signed();
        let corrupted = corrupt_signature(&signed, 0, DEFAULT_FILL).unwrap();
        assert_eq!(corrupted.signatures[0], Signature([b'1'; SIGNATURE_LEN]));
        assert_eq!(corrupted.signatures[1], signed.signatures[1]);
        assert_eq!(
            corrupted.serialized_root_metadata,
            signed.serialized_root_metadata
        );
    }

    #[test]
    fn test_clean_input_is_not_mutated() {
        let (signed, dev, _) = rotation_signed();
        let before = signed.clone();
        let _ = corrupt_signature(&signed, 0, DEFAULT_FILL).unwrap();
        assert_eq!(signed, before);
        assert!(verify_raw_signature(
            dev.public_key_pem(),
            &signed.serialized_root_metadata,
            signed.signatures[0].as_bytes()
        )
        .unwrap());
    }

    #[test]
    fn test_corrupt_slot_zero_breaks_only_outgoing_verification() {
        let (signed, dev, prod) = rotation_signed();
        let corrupted = corrupt_signature(&signed, 0, DEFAULT_FILL).unwrap();
        let doc = &corrupted.serialized_root_metadata;
        assert!(!verify_raw_signature(
            dev.public_key_pem(),
            doc,
            corrupted.signatures[0].as_bytes()
        )
        .unwrap());
        assert!(verify_raw_signature(
            prod.public_key_pem(),
            doc,
            corrupted.signatures[1].as_bytes()
        )
        .unwrap());
    }

    #[test]
    fn test_corrupt_slot_one_breaks_only_incoming_verification() {
        let (signed, dev, prod) = rotation_signed();
        let corrupted = corrupt_signature(&signed, 1, DEFAULT_FILL).unwrap();
        let doc = &corrupted.serialized_root_metadata;
        assert!(verify_raw_signature(
            dev.public_key_pem(),
            doc,
            corrupted.signatures[0].as_bytes()
        )
        .unwrap());
        assert!(!verify_raw_signature(
            prod.public_key_pem(),
            doc,
            corrupted.signatures[1].as_bytes()
        )
        .unwrap());
    }

    #[test]
    fn test_index_out_of_range() {
        let (signed, _, _) = rotation_signed();
        let err = corrupt_signature(&signed, 2, DEFAULT_FILL).unwrap_err();
        assert_eq!(err, FaultInjectionError::IndexOutOfRange { index: 2, len: 2 });
        assert_eq!(err.code(), error_codes::ERR_FAULT_INDEX_OUT_OF_RANGE);
    }

    #[test]
    fn test_corruption_is_deterministic() {
        let (signed, _, _) = rotation_signed();
        let a = corrupt_signature(&signed, 1, DEFAULT_FILL).unwrap();
        let b = corrupt_signature(&signed, 1, DEFAULT_FILL).unwrap();
        assert_eq!(a, b);
    }
}
