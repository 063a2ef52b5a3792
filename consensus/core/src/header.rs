use crate::{hashing, BlueWorkType, Hash, ZERO_HASH};
use serde::{Deserialize, Serialize};

/// A block header.
///
/// The `hash` field memoizes the hash of the remaining fields and is filled
/// when the header is finalized; consumers that cannot trust the memo (the
/// insertion pipeline) recompute it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub hash: Hash,
    pub version: u16,
    /// Direct parents in the order chosen by the miner.
    pub parents: Vec<Hash>,
    pub hash_merkle_root: Hash,
    pub utxo_commitment: Hash,
    /// Milliseconds since the unix epoch.
    pub timestamp: u64,
    /// Difficulty target in compact representation.
    pub bits: u32,
    pub nonce: u64,
    pub daa_score: u64,
    pub blue_score: u64,
    pub blue_work: BlueWorkType,
    pub pruning_point: Hash,
}

impl Header {
    #[allow(clippy::too_many_arguments)]
    pub fn new_finalized(
        version: u16,
        parents: Vec<Hash>,
        hash_merkle_root: Hash,
        utxo_commitment: Hash,
        timestamp: u64,
        bits: u32,
        nonce: u64,
        daa_score: u64,
        blue_score: u64,
        blue_work: BlueWorkType,
        pruning_point: Hash,
    ) -> Self {
        let mut header = Self {
            hash: ZERO_HASH,
            version,
            parents,
            hash_merkle_root,
            utxo_commitment,
            timestamp,
            bits,
            nonce,
            daa_score,
            blue_score,
            blue_work,
            pruning_point,
        };
        header.finalize();
        header
    }

    /// Recomputes the memoized hash, e.g. after a nonce change.
    pub fn finalize(&mut self) {
        self.hash = hashing::header::calculate_header_hash(self);
    }

    pub fn direct_parents(&self) -> &[Hash] {
        &self.parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_tracks_nonce() {
        let mut header =
            Header::new_finalized(1, vec![], ZERO_HASH, ZERO_HASH, 0, 0x207fffff, 0, 0, 0, 0, ZERO_HASH);
        let original = header.hash;
        header.nonce += 1;
        header.finalize();
        assert_ne!(header.hash, original);
    }
}
