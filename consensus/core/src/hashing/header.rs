use crate::header::Header;
use crate::Hash;

/// Computes the hash of a block header.
///
/// The memoized `hash` field is excluded; every other field is serialized in
/// a fixed little-endian layout so the hash is stable across platforms.
pub fn calculate_header_hash(header: &Header) -> Hash {
    // Serialize the header without the hash field
    let mut bytes = Vec::with_capacity(160 + header.parents.len() * 32);
    bytes.extend_from_slice(&header.version.to_le_bytes());
    bytes.extend_from_slice(&(header.parents.len() as u64).to_le_bytes());
    for parent in &header.parents {
        bytes.extend_from_slice(parent.as_bytes());
    }
    bytes.extend_from_slice(header.hash_merkle_root.as_bytes());
    bytes.extend_from_slice(header.utxo_commitment.as_bytes());
    bytes.extend_from_slice(&header.timestamp.to_le_bytes());
    bytes.extend_from_slice(&header.bits.to_le_bytes());
    bytes.extend_from_slice(&header.nonce.to_le_bytes());
    bytes.extend_from_slice(&header.daa_score.to_le_bytes());
    bytes.extend_from_slice(&header.blue_score.to_le_bytes());
    bytes.extend_from_slice(&header.blue_work.to_le_bytes());
    bytes.extend_from_slice(header.pruning_point.as_bytes());

    super::double_sha256(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZERO_HASH;

    fn sample_header() -> Header {
        Header::new_finalized(1, vec![Hash::from_le_u64([5, 0, 0, 0])], ZERO_HASH, ZERO_HASH, 1_000, 0x207fffff, 0, 1, 1, 1, ZERO_HASH)
    }

    #[test]
    fn test_nonce_changes_hash() {
        let base = sample_header();
        let mut other = base.clone();
        other.nonce = 1;
        other.finalize();
        assert_ne!(calculate_header_hash(&base), calculate_header_hash(&other));
    }

    #[test]
    fn test_memo_field_does_not_feed_hash() {
        let base = sample_header();
        let mut tampered = base.clone();
        tampered.hash = ZERO_HASH;
        assert_eq!(calculate_header_hash(&base), calculate_header_hash(&tampered));
    }
}
