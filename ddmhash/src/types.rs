/// Common value types shared by the cache, DAG and Hashimoto code paths.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::HASH_BYTES;

/// Words per node when the 64 bytes are viewed as little-endian u32 lanes.
pub const NODE_WORDS: usize = HASH_BYTES / 4;

/// 256-bit hash (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct H256(pub [u8; 32]);

impl H256 {
    /// Create from bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from slice (must be 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self, &'static str> {
        if slice.len() != 32 {
            return Err("H256 requires exactly 32 bytes");
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex)?;
        Self::from_slice(&bytes).map_err(|_| hex::FromHexError::InvalidStringLength)
    }

    /// Check whether the hash is at most the boundary (`2^256 / difficulty`).
    ///
    /// Both values are compared lexicographically as big-endian unsigned
    /// integers, which is the byte order the boundary is distributed in.
    pub fn meets_boundary(&self, boundary: &H256) -> bool {
        for i in 0..32 {
            if self.0[i] == boundary.0[i] {
                continue;
            }
            return self.0[i] < boundary.0[i];
        }
        true
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for H256 {
    fn default() -> Self {
        Self([0u8; 32])
    }
}

/// The universal 64-byte unit of the cache and the DAG.
///
/// All arithmetic treats a node as 16 little-endian 32-bit words; the byte
/// array is the canonical representation (it is what gets hashed and what
/// lands on disk), so the word accessors decode on demand. That keeps every
/// code path endian-portable without a separate normalization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub bytes: [u8; HASH_BYTES],
}

impl Node {
    /// Read word `i` as a little-endian u32.
    #[inline(always)]
    pub fn word(&self, i: usize) -> u32 {
        let off = i * 4;
        u32::from_le_bytes([
            self.bytes[off],
            self.bytes[off + 1],
            self.bytes[off + 2],
            self.bytes[off + 3],
        ])
    }

    /// Decode all 16 words.
    #[inline]
    pub fn words(&self) -> [u32; NODE_WORDS] {
        let mut words = [0u32; NODE_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.word(i);
        }
        words
    }

    /// Encode 16 words back into a node.
    #[inline]
    pub fn from_words(words: [u32; NODE_WORDS]) -> Self {
        let mut bytes = [0u8; HASH_BYTES];
        for (i, word) in words.iter().enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
        Self { bytes }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            bytes: [0u8; HASH_BYTES],
        }
    }
}

/// Result of a single proof-of-work computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowOutput {
    /// The 256-bit result hash, compared against the difficulty boundary.
    pub result: H256,
    /// The 256-bit mix digest, carried in block headers for fast
    /// pre-verification.
    pub mix_hash: H256,
}
