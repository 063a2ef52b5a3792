//! Hashing of consensus entities.

pub mod header;
pub mod tx;
pub mod utxo;

use crate::{Hash, HASH_SIZE};
use sha2::{Digest, Sha256};

/// Double SHA-256 over raw bytes.
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut bytes = [0u8; HASH_SIZE];
    bytes.copy_from_slice(&second);
    Hash::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_differs_from_input() {
        let hash = double_sha256(b"payload");
        assert_ne!(hash, double_sha256(b"payloae"));
        assert_eq!(hash, double_sha256(b"payload"));
    }
}
