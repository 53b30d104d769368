//! Content hashing for source text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// XXH3-128 digest of a unit's text.
///
/// Units compare by identity. The digest tells two units apart by content,
/// so a replacement that carries the same text can skip rescanning.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Hashes UTF-8 source text.
    pub fn of_text(text: &str) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(text.as_bytes()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}
