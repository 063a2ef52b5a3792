//! Core data model for the blockDAG consensus engine
//!
//! This crate holds the pure domain types shared by the storage layer and the
//! consensus engine: hashes, headers, blocks, transactions, block statuses,
//! GHOSTDAG data, rule errors and per-network parameters. It performs no I/O.

pub mod acceptance_data;
pub mod api;
pub mod block;
pub mod config;
pub mod errors;
pub mod ghostdag;
pub mod hashing;
pub mod header;
pub mod merkle;
pub mod status;
pub mod tx;
pub mod utxo;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Accumulated proof-of-work of a block's blue past.
pub type BlueWorkType = u128;

/// Domain of the GHOSTDAG security parameter k.
pub type KType = u16;

pub type BlockHashMap<V> = HashMap<Hash, V>;
pub type BlockHashSet = HashSet<Hash>;

pub const HASH_SIZE: usize = 32;

/// A 32-byte block or transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Hash([u8; HASH_SIZE]);

pub const ZERO_HASH: Hash = Hash([0u8; HASH_SIZE]);

/// Key under which the virtual block's rows are stored. Real block hashes
/// must satisfy a proof-of-work target far below this value, so the all-ones
/// hash can never collide with one.
pub const VIRTUAL_BLOCK_HASH: Hash = Hash([0xffu8; HASH_SIZE]);

impl Hash {
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; HASH_SIZE] {
        self.0
    }

    /// Builds a hash from four little-endian u64 words, least significant first.
    pub fn from_le_u64(words: [u64; 4]) -> Self {
        let mut bytes = [0u8; HASH_SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(words.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Hash(bytes)
    }

    /// Views the hash as four little-endian u64 words, least significant first.
    pub fn as_le_u64(&self) -> [u64; 4] {
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *word = u64::from_le_bytes(buf);
        }
        words
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Hash(bytes))
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = Hash::from_le_u64([1, 2, 3, 4]);
        let encoded = hash.to_string();
        assert_eq!(encoded.len(), 64);
        let decoded: Hash = encoded.parse().unwrap();
        assert_eq!(decoded, hash);
    }

    #[test]
    fn test_hash_le_u64_roundtrip() {
        let words = [u64::MAX, 0, 42, 7];
        assert_eq!(Hash::from_le_u64(words).as_le_u64(), words);
    }

    #[test]
    fn test_virtual_hash_is_distinct() {
        assert_ne!(VIRTUAL_BLOCK_HASH, ZERO_HASH);
        assert_eq!(VIRTUAL_BLOCK_HASH.as_le_u64(), [u64::MAX; 4]);
    }
}
