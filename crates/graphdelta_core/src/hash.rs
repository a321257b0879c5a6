//! Content hashing for graph nodes.
//!
//! Uses BLAKE3 for all hashing operations. Every field is written with a
//! one-byte tag and a length prefix so that distinct structures can never
//! produce the same byte stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A BLAKE3 hash (256 bits / 32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Compute BLAKE3 hash of data
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex rendering, as used for content ids
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<blake3::Hash> for Hash {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

/// Field tags written ahead of every item in the canonical stream.
pub(crate) mod tag {
    pub const TYPE_TAG: u8 = 0x01;
    pub const APP_ID: u8 = 0x02;
    pub const NO_APP_ID: u8 = 0x03;
    pub const MEMBER: u8 = 0x04;
    pub const NULL: u8 = 0x10;
    pub const BOOL: u8 = 0x11;
    pub const INT: u8 = 0x12;
    pub const FLOAT: u8 = 0x13;
    pub const TEXT: u8 = 0x14;
    pub const NODE_REF: u8 = 0x20;
    pub const LIST: u8 = 0x21;
    pub const MAP: u8 = 0x22;
}

/// Incremental hasher producing a canonical, prefix-free byte stream
pub struct ContentHasher {
    inner: blake3::Hasher,
}

impl ContentHasher {
    /// Create a new hasher
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Write a bare tag byte
    pub fn write_tag(&mut self, tag: u8) {
        self.inner.update(&[tag]);
    }

    /// Write a tagged, length-prefixed string
    pub fn write_str(&mut self, tag: u8, value: &str) {
        self.write_tag(tag);
        self.write_len(value.len());
        self.inner.update(value.as_bytes());
    }

    /// Write a length or element count
    pub fn write_len(&mut self, len: usize) {
        self.inner.update(&(len as u64).to_le_bytes());
    }

    /// Write a tagged 64-bit payload
    pub fn write_u64(&mut self, tag: u8, value: u64) {
        self.write_tag(tag);
        self.inner.update(&value.to_le_bytes());
    }

    /// Finish hashing
    #[must_use]
    pub fn finish(&self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
