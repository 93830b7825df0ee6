//! Root-metadata signing policies and the signed wrapper types.
//!
//! Two policies wrap an already-serialized root document:
//!
//! - dev-signed: exactly one signature by the dev root key. Models a device's
//!   initial, development-only trust anchor.
//! - prod rotation: exactly two signatures in fixed order. Slot 0 is the
//!   outgoing (currently trusted, dev) root key authorizing the rotation;
//!   slot 1 is the incoming (prod) root key proving possession. An attacker
//!   who only holds the new key cannot produce slot 0, so trust cannot be
//!   hijacked by compromising the incoming key alone.
//!
//! Signature-to-key association is positional. A verifier checks slot 0
//! against its currently trusted root set and slot 1 against the key set the
//! rotation document itself names, with distinguishable failures for each.
//!
//! # Invariants
//!
//! - INV-SIGN-VERBATIM: signatures cover `serialized_root_metadata` exactly.
//! - INV-SIGN-ORDER: rotation slot 0 = outgoing key, slot 1 = incoming key.
//! - INV-SIGN-ANY-DOC: policies sign whatever buffer they are handed; they
//!   never rebuild the document themselves.

use std::fmt;

use tracing::info;

use crate::keys::{KeyMaterial, SIGNATURE_LEN};
use crate::wire::{tags, WireError, WireReader, WireWriter};

// ---------------------------------------------------------------------------
// Event codes
// ---------------------------------------------------------------------------

pub mod event_codes {
    /// Root metadata wrapped under the single-signer dev policy.
    pub const SGN_DEV_SIGNED: &str = "SGN-001";
    /// Root metadata wrapped under the dual-signer rotation policy.
    pub const SGN_ROTATION_SIGNED: &str = "SGN-002";
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

pub mod error_codes {
    pub const ERR_SIGN_MISSING_KEY: &str = "ERR_SIGN_MISSING_KEY";
}

/// Errors from applying a signing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningPolicyError {
    /// The policy needs a key for `role` that the caller did not supply.
    MissingKey {
        policy: RootSigningPolicy,
        role: &'static str,
    },
}

impl SigningPolicyError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingKey { .. } => error_codes::ERR_SIGN_MISSING_KEY,
        }
    }
}

impl fmt::Display for SigningPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey { policy, role } => {
                write!(f, "policy {policy} requires a {role} key")
            }
        }
    }
}

impl std::error::Error for SigningPolicyError {}

// ---------------------------------------------------------------------------
// Signature / SignedRootMetadata
// ---------------------------------------------------------------------------

/// One fixed-length signature slot. The slot's position in the surrounding
/// sequence encodes which key it is expected to verify under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

/// A serialized root document plus its ordered signature slots.
///
/// `serialized_root_metadata` is the exact buffer that was signed; consumers
/// must hash and verify it verbatim, never re-serialize (INV-SIGN-VERBATIM).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRootMetadata {
    pub serialized_root_metadata: Vec<u8>,
    pub signatures: Vec<Signature>,
}

impl SignedRootMetadata {
    /// Serialize: one SERIALIZED_ROOT record, then SIGNATURE records in slot
    /// order.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.record(tags::SERIALIZED_ROOT, &self.serialized_root_metadata);
        for sig in &self.signatures {
            w.record(tags::SIGNATURE, sig.as_bytes());
        }
        w.into_bytes()
    }

    pub fn from_wire(buf: &[u8]) -> Result<Self, WireError> {
        let mut r = WireReader::new(buf);
        let serialized = r.expect(tags::SERIALIZED_ROOT)?.to_vec();
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
            serialized_root_metadata: serialized,
            signatures,
        })
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// The named root-signing policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSigningPolicy {
    /// Single signature by the dev root key.
    DevSigned,
    /// Dual signature: outgoing root key first, incoming root key second.
    ProdRotation,
}

impl RootSigningPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DevSigned => "dev_signed",
            Self::ProdRotation => "prod_rotation",
        }
    }
}

impl fmt::Display for RootSigningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keys available to a signing policy, by role. Either may be absent; each
/// policy checks for what it needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyKeys<'a> {
    /// The currently trusted (outgoing) root key.
    pub dev_root: Option<&'a KeyMaterial>,
    /// The newly introduced (incoming) root key.
    pub prod_root: Option<&'a KeyMaterial>,
}

/// Wrap a serialized root document with signatures under `policy`.
///
/// The buffer is signed verbatim (INV-SIGN-ANY-DOC): callers may hand in a
/// document other than the one they just built, e.g. to rotate onto a root
/// that names different keys.
pub fn sign_root_with_policy(
    policy: RootSigningPolicy,
    serialized_root_metadata: Vec<u8>,
    keys: PolicyKeys<'_>,
) -> Result<SignedRootMetadata, SigningPolicyError> {
    match policy {
        RootSigningPolicy::DevSigned => {
            let dev = keys.dev_root.ok_or(SigningPolicyError::MissingKey {
                policy,
                role: "dev root",
            })?;
            Ok(dev_sign_root(serialized_root_metadata, dev))
        }
        RootSigningPolicy::ProdRotation => {
            let dev = keys.dev_root.ok_or(SigningPolicyError::MissingKey {
                policy,
                role: "dev root",
            })?;
            let prod = keys.prod_root.ok_or(SigningPolicyError::MissingKey {
                policy,
                role: "prod root",
            })?;
            Ok(rotation_sign_root(serialized_root_metadata, dev, prod))
        }
    }
}

/// Single-signer dev policy: exactly one signature by the dev root key.
pub fn dev_sign_root(
    serialized_root_metadata: Vec<u8>,
    dev_root: &KeyMaterial,
) -> SignedRootMetadata {
    let signature = Signature(dev_root.sign(&serialized_root_metadata));
    info!(
        event = event_codes::SGN_DEV_SIGNED,
        signer = dev_root.key_id(),
        document_len = serialized_root_metadata.len(),
        "root metadata dev-signed"
    );
    SignedRootMetadata {
        serialized_root_metadata,
        signatures: vec![signature],
    }
}

/// Rotation policy: slot 0 by the outgoing root key, slot 1 by the incoming
/// root key (INV-SIGN-ORDER).
pub fn rotation_sign_root(
    serialized_root_metadata: Vec<u8>,
    outgoing_root: &KeyMaterial,
    incoming_root: &KeyMaterial,
) -> SignedRootMetadata {
    let signatures = vec![
        Signature(outgoing_root.sign(&serialized_root_metadata)),
        Signature(incoming_root.sign(&serialized_root_metadata)),
    ];
    info!(
        event = event_codes::SGN_ROTATION_SIGNED,
        outgoing = outgoing_root.key_id(),
        incoming = incoming_root.key_id(),
        document_len = serialized_root_metadata.len(),
        "root metadata rotation-signed"
    );
    SignedRootMetadata {
        serialized_root_metadata,
        signatures,
    }
}
