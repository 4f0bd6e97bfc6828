//! Version tags used for compare-and-swap.

use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque version of a stored object.
///
/// A tag is the hex SHA-256 digest of the object's bytes, so it changes
/// whenever the payload changes and can be recomputed by any reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// Compute the tag of a payload.
    pub fn of(bytes: &[u8]) -> Self {
        Tag(hex::encode(Sha256::digest(bytes)))
    }

    /// The full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}
