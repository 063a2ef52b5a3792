use crate::hashing;
use crate::tx::Transaction;
use crate::{Hash, ZERO_HASH};

/// Computes the merkle root over the block's transaction ids.
///
/// Levels are built bottom-up; an odd node is paired with itself. An empty
/// transaction list yields the zero hash.
pub fn calc_hash_merkle_root(transactions: &[Transaction]) -> Hash {
    let leaves: Vec<Hash> = transactions.iter().map(|tx| tx.id()).collect();
    merkle_root_from_hashes(leaves)
}

/// Merkle root over pre-computed leaf hashes.
pub fn merkle_root_from_hashes(mut level: Vec<Hash>) -> Hash {
    if level.is_empty() {
        return ZERO_HASH;
    }
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|chunk| {
                let left = chunk[0];
                let right = if chunk.len() == 2 { chunk[1] } else { left };
                hash_pair(&left, &right)
            })
            .collect();
    }
    level[0]
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(left.as_bytes());
    bytes[32..].copy_from_slice(right.as_bytes());
    hashing::double_sha256(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(merkle_root_from_hashes(vec![]), ZERO_HASH);
    }

    #[test]
    fn test_single_leaf_is_its_own_root() {
        let leaf = Hash::from_le_u64([1, 0, 0, 0]);
        assert_eq!(merkle_root_from_hashes(vec![leaf]), leaf);
    }

    #[test]
    fn test_order_matters() {
        let a = Hash::from_le_u64([1, 0, 0, 0]);
        let b = Hash::from_le_u64([2, 0, 0, 0]);
        assert_ne!(merkle_root_from_hashes(vec![a, b]), merkle_root_from_hashes(vec![b, a]));
    }

    #[test]
    fn test_odd_leaf_count_duplicates_last() {
        let a = Hash::from_le_u64([1, 0, 0, 0]);
        let b = Hash::from_le_u64([2, 0, 0, 0]);
        let c = Hash::from_le_u64([3, 0, 0, 0]);
        assert_eq!(
            merkle_root_from_hashes(vec![a, b, c]),
            merkle_root_from_hashes(vec![a, b, c, c])
        );
    }
}
