use crate::block::Block;
use crate::config::constants::{BLOCK_VERSION, TX_VERSION};
use crate::header::Header;
use crate::merkle::calc_hash_merkle_root;
use crate::tx::Transaction;
use crate::{Hash, ZERO_HASH};
use serde::{Deserialize, Serialize};

/// The constants uniquely representing a network's genesis block.
///
/// The block itself is materialized on demand; its hash is a pure function
/// of these fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisBlock {
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
    pub coinbase_payload: Vec<u8>,
}

impl GenesisBlock {
    /// The single transaction of the genesis block: a coinbase with no
    /// outputs, so the initial UTXO set is empty.
    pub fn build_genesis_transactions(&self) -> Vec<Transaction> {
        vec![Transaction::new(TX_VERSION, Vec::new(), Vec::new(), 0, self.coinbase_payload.clone())]
    }

    pub fn hash(&self) -> Hash {
        Header::from(self).hash
    }
}

impl From<&GenesisBlock> for Header {
    fn from(genesis: &GenesisBlock) -> Self {
        let merkle_root = calc_hash_merkle_root(&genesis.build_genesis_transactions());
        Header::new_finalized(
            BLOCK_VERSION,
            Vec::new(),
            merkle_root,
            ZERO_HASH,
            genesis.timestamp,
            genesis.bits,
            genesis.nonce,
            0,
            0,
            0,
            ZERO_HASH,
        )
    }
}

impl From<&GenesisBlock> for Block {
    fn from(genesis: &GenesisBlock) -> Self {
        Block::new(genesis.into(), genesis.build_genesis_transactions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_build_is_deterministic() {
        let genesis = GenesisBlock { timestamp: 1_715_000_000_000, bits: 0x207fffff, nonce: 0, coinbase_payload: b"genesis".to_vec() };
        let a: Block = (&genesis).into();
        let b: Block = (&genesis).into();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.header.hash_merkle_root, calc_hash_merkle_root(&a.transactions));
        assert!(a.header.parents.is_empty());
    }
}
