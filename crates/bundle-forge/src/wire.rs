//! Deterministic tag/length-prefixed record codec for trust artifacts.
//!
//! Every serialized structure in this crate is a flat sequence of records,
//! each laid out as `[tag: u8][len: u32 LE][payload: len bytes]`. Encoding the
//! same logical value twice yields byte-identical output: maps are iterated in
//! `BTreeMap` order, sequences keep caller order, and no floats or timestamps
//! ever appear on the wire. Signatures are computed over these exact bytes, so
//! any re-serialization must reproduce them verbatim.
//!
//! # Invariants
//!
//! - INV-WIRE-DETERMINISTIC: identical logical values encode to identical bytes.
//! - INV-WIRE-ROUND-TRIP: every encoded structure decodes back to the original.
//! - INV-WIRE-NO-FLOAT: no floating-point values in serialized trust artifacts.

use std::fmt;

// ---------------------------------------------------------------------------
// Record tags
// ---------------------------------------------------------------------------

/// Wire tags. These are part of the fixture contract: a verifier consuming
/// generated bundles parses records by these values.
pub mod tags {
    /// Root metadata version (4-byte u32 LE payload).
    pub const VERSION: u8 = 0x01;
    /// One trusted root key (SubjectPublicKeyInfo PEM bytes).
    pub const ROOT_KEY: u8 = 0x02;
    /// One trusted targets key (SubjectPublicKeyInfo PEM bytes).
    pub const TARGETS_KEY: u8 = 0x03;

    /// Exact serialized root metadata the signatures cover.
    pub const SERIALIZED_ROOT: u8 = 0x10;
    /// One 64-byte signature slot (position encodes trust semantics).
    pub const SIGNATURE: u8 = 0x11;
    /// Exact serialized targets metadata.
    pub const SERIALIZED_TARGETS: u8 = 0x12;

    /// One target-file descriptor (nested record sequence).
    pub const TARGET_FILE: u8 = 0x20;
    /// Target file name (UTF-8).
    pub const FILE_NAME: u8 = 0x21;
    /// Target file length (8-byte u64 LE payload).
    pub const FILE_LENGTH: u8 = 0x22;
    /// Target file SHA-256 digest (32 bytes).
    pub const FILE_SHA256: u8 = 0x23;

    /// Embedded signed root metadata (nested record sequence).
    pub const BUNDLE_ROOT: u8 = 0x30;
    /// One role entry of the bundle's targets-metadata map (nested).
    pub const BUNDLE_TARGETS_ROLE: u8 = 0x31;
    /// Role name (UTF-8).
    pub const ROLE_NAME: u8 = 0x32;
    /// One payload entry of the bundle (nested).
    pub const PAYLOAD_ENTRY: u8 = 0x33;
    /// Payload name (UTF-8).
    pub const PAYLOAD_NAME: u8 = 0x34;
    /// Raw payload bytes.
    pub const PAYLOAD_BYTES: u8 = 0x35;
    /// Embedded signed targets metadata (nested record sequence).
    pub const SIGNED_TARGETS: u8 = 0x36;
}

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

pub mod error_codes {
    pub const ERR_WIRE_TRUNCATED: &str = "ERR_WIRE_TRUNCATED";
    pub const ERR_WIRE_UNEXPECTED_TAG: &str = "ERR_WIRE_UNEXPECTED_TAG";
    pub const ERR_WIRE_BAD_LENGTH: &str = "ERR_WIRE_BAD_LENGTH";
    pub const ERR_WIRE_BAD_UTF8: &str = "ERR_WIRE_BAD_UTF8";
}

/// Errors from decoding a record stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The buffer ended inside a record header or payload.
    Truncated { offset: usize },
    /// A record carried a tag the decoder did not expect at this position.
    UnexpectedTag { expected: u8, found: u8 },
    /// A fixed-length payload had the wrong length.
    BadLength {
        tag: u8,
        expected: usize,
        found: usize,
    },
    /// A name field was not valid UTF-8.
    BadUtf8 { tag: u8 },
}

impl WireError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => error_codes::ERR_WIRE_TRUNCATED,
            Self::UnexpectedTag { .. } => error_codes::ERR_WIRE_UNEXPECTED_TAG,
            Self::BadLength { .. } => error_codes::ERR_WIRE_BAD_LENGTH,
            Self::BadUtf8 { .. } => error_codes::ERR_WIRE_BAD_UTF8,
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset } => {
                write!(f, "record stream truncated at offset {offset}")
            }
            Self::UnexpectedTag { expected, found } => {
                write!(f, "unexpected tag {found:#04x}, expected {expected:#04x}")
            }
            Self::BadLength {
                tag,
                expected,
                found,
            } => write!(
                f,
                "tag {tag:#04x} payload length {found}, expected {expected}"
            ),
            Self::BadUtf8 { tag } => write!(f, "tag {tag:#04x} payload is not valid UTF-8"),
        }
    }
}

impl std::error::Error for WireError {}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Appends records to an owned buffer. Record order is the caller's order;
/// the writer never reorders or deduplicates.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record.
    pub fn record(&mut self, tag: u8, payload: &[u8]) -> &mut Self {
        self.buf.push(tag);
        self.buf
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(payload);
        self
    }

    /// Append a u32 scalar record (4-byte LE payload).
    pub fn u32_record(&mut self, tag: u8, value: u32) -> &mut Self {
        self.record(tag, &value.to_le_bytes())
    }

    /// Append a u64 scalar record (8-byte LE payload).
    pub fn u64_record(&mut self, tag: u8, value: u64) -> &mut Self {
        self.record(tag, &value.to_le_bytes())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Iterates records of an encoded buffer in order.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read the next record, or `None` at end of buffer.
    pub fn next_record(&mut self) -> Result<Option<(u8, &'a [u8])>, WireError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let start = self.pos;
        if self.buf.len() - self.pos < 5 {
            return Err(WireError::Truncated { offset: start });
        }
        let tag = self.buf[self.pos];
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&self.buf[self.pos + 1..self.pos + 5]);
        let len = u32::from_le_bytes(len_bytes) as usize;
        self.pos += 5;
        if self.buf.len() - self.pos < len {
            return Err(WireError::Truncated { offset: start });
        }
        let payload = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(Some((tag, payload)))
    }

    /// Read the next record and require it to carry `tag`.
    pub fn expect(&mut self, tag: u8) -> Result<&'a [u8], WireError> {
        match self.next_record()? {
            Some((found, payload)) if found == tag => Ok(payload),
            Some((found, _)) => Err(WireError::UnexpectedTag {
                expected: tag,
                found,
            }),
            None => Err(WireError::Truncated { offset: self.pos }),
        }
    }
}

/// Decode a 4-byte LE u32 scalar payload.
pub fn read_u32(tag: u8, payload: &[u8]) -> Result<u32, WireError> {
    let bytes: [u8; 4] = payload.try_into().map_err(|_| WireError::BadLength {
        tag,
        expected: 4,
        found: payload.len(),
    })?;
    Ok(u32::from_le_bytes(bytes))
}

/// Decode an 8-byte LE u64 scalar payload.
pub fn read_u64(tag: u8, payload: &[u8]) -> Result<u64, WireError> {
    let bytes: [u8; 8] = payload.try_into().map_err(|_| WireError::BadLength {
        tag,
        expected: 8,
        found: payload.len(),
    })?;
    Ok(u64::from_le_bytes(bytes))
}

/// Decode a UTF-8 name payload.
pub fn read_string(tag: u8, payload: &[u8]) -> Result<String, WireError> {
    String::from_utf8(payload.to_vec()).map_err(|_| WireError::BadUtf8 { tag })
}
