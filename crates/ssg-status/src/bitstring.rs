//! # Bitstring Status List
//!
//! A fixed-length list of status bits following
//! [Bitstring Status List v1.0](https://www.w3.org/TR/vc-bitstring-status-list/).
//!
//! Index 0 is the left-most bit of the first byte. The published form
//! (`encodedList`) is the GZIP-compressed bytes, base64url encoded without
//! padding and prefixed with the multibase code `u`.

use std::io::{Read, Write};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bitvec::order::Msb0;
use bitvec::vec::BitVec;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

/// Number of entries in every status list (16 KiB uncompressed, the minimum
/// for herd privacy).
pub const STATUS_LIST_LENGTH: usize = 131_072;

/// Multibase prefix for base64url without padding.
const MULTIBASE_BASE64URL: char = 'u';

/// Errors from status list manipulation.
#[derive(Error, Debug)]
pub enum BitstringError {
    /// The index is outside the list.
    #[error("status list index {index} out of range (length {length})")]
    OutOfRange { index: usize, length: usize },

    /// Compression failed.
    #[error("status list encoding failed: {0}")]
    Encoding(String),

    /// The encoded list is not valid.
    #[error("invalid encoded status list: {0}")]
    Decoding(String),
}

/// A bitstring status list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusList {
    bits: BitVec<u8, Msb0>,
}

impl StatusList {
    /// A list with every bit cleared.
    pub fn new() -> Self {
        Self {
            bits: BitVec::repeat(false, STATUS_LIST_LENGTH),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Read the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool, BitstringError> {
        self.bits
            .get(index)
            .map(|bit| *bit)
            .ok_or(BitstringError::OutOfRange {
                index,
                length: self.len(),
            })
    }

    /// Write the bit at `index`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<(), BitstringError> {
        if index >= self.len() {
            return Err(BitstringError::OutOfRange {
                index,
                length: self.len(),
            });
        }
        self.bits.set(index, value);
        Ok(())
    }

    /// Indices of all set bits.
    pub fn set_indices(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }

    /// Produce the `encodedList` value.
    pub fn encode(&self) -> Result<String, BitstringError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(self.bits.as_raw_slice())
            .map_err(|e| BitstringError::Encoding(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| BitstringError::Encoding(e.to_string()))?;
        Ok(format!(
            "{MULTIBASE_BASE64URL}{}",
            URL_SAFE_NO_PAD.encode(compressed)
        ))
    }

    /// Parse an `encodedList` value. The multibase prefix is optional.
    pub fn decode(encoded: &str) -> Result<Self, BitstringError> {
        let payload = encoded.strip_prefix(MULTIBASE_BASE64URL).unwrap_or(encoded);
        let compressed = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| BitstringError::Decoding(format!("base64url: {e}")))?;

        let mut bytes = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut bytes)
            .map_err(|e| BitstringError::Decoding(format!("gzip: {e}")))?;

        if bytes.len() * 8 < STATUS_LIST_LENGTH {
            return Err(BitstringError::Decoding(format!(
                "list holds {} entries, expected at least {STATUS_LIST_LENGTH}",
                bytes.len() * 8
            )));
        }
        Ok(Self {
            bits: BitVec::from_vec(bytes),
        })
    }
}

impl Default for StatusList {
    fn default() -> Self {
        Self::new()
    }
}
