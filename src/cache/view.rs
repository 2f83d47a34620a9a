//! Byte View Module
//!
//! Immutable view over cached bytes, the value type stored by groups.

use std::fmt;

use bytes::Bytes;

use crate::cache::Value;

// == Byte View ==
/// Read-only bytes held in the cache.
///
/// Cloning is cheap: the underlying buffer is reference counted and never
/// mutated, so callers cannot alter what the cache holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Wraps the given bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Shares the underlying buffer.
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}
