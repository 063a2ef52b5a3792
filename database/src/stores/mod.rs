//! Store facades over the column families.
//!
//! Every facade reads through a [`StagingArea`]: staged puts shadow committed
//! values, staged deletes hide them, and anything else falls through to the
//! database. All mutation is expressed as staged writes; nothing here writes
//! to rocksdb directly.

pub mod acceptance_data_store;
pub mod block_store;
pub mod ghostdag_store;
pub mod header_store;
pub mod header_tips_store;
pub mod pruning_store;
pub mod relations_store;
pub mod status_store;
pub mod utxo_diff_store;
pub mod utxo_store;

pub use acceptance_data_store::AcceptanceDataStore;
pub use block_store::BlockStore;
pub use ghostdag_store::GhostdagStore;
pub use header_store::HeaderStore;
pub use header_tips_store::{HeaderTipsStore, HeadersSelectedTipStore};
pub use pruning_store::PruningStore;
pub use relations_store::{BlockRelations, RelationsStore};
pub use status_store::StatusStore;
pub use utxo_diff_store::UtxoDiffStore;
pub use utxo_store::VirtualUtxoStore;

use crate::errors::{DbError, DbResult};
use crate::staging::{StagedWrite, StagingArea, StoreId};
use crate::Database;
use consensus_core::tx::{TransactionIndexType, TransactionOutpoint};
use consensus_core::{Hash, HASH_SIZE};
use serde::de::DeserializeOwned;

/// Overlay read: staged put wins, staged delete means absent, otherwise the
/// committed value is deserialized.
pub(crate) fn read_staged<T: DeserializeOwned>(
    db: &Database,
    area: &StagingArea,
    store: StoreId,
    key: &[u8],
) -> DbResult<Option<T>> {
    match area.staged(store, key) {
        Some(StagedWrite::Put(bytes)) => Ok(Some(bincode::deserialize(bytes)?)),
        Some(StagedWrite::Delete) => Ok(None),
        None => match db.get(store.cf(), key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        },
    }
}

/// Overlay existence check, same shadowing rules as [`read_staged`].
pub(crate) fn exists_staged(db: &Database, area: &StagingArea, store: StoreId, key: &[u8]) -> DbResult<bool> {
    match area.staged(store, key) {
        Some(StagedWrite::Put(_)) => Ok(true),
        Some(StagedWrite::Delete) => Ok(false),
        None => db.exists(store.cf(), key),
    }
}

pub(crate) fn hash_from_key(key: &[u8]) -> DbResult<Hash> {
    let bytes: [u8; HASH_SIZE] =
        key.try_into().map_err(|_| DbError::InvalidData(format!("key of length {} is not a hash", key.len())))?;
    Ok(Hash::from_bytes(bytes))
}

/// Serializes an outpoint as transaction id bytes followed by the big-endian
/// index, so the lexicographic column-family order equals outpoint order.
pub(crate) fn outpoint_to_key(outpoint: &TransactionOutpoint) -> Vec<u8> {
    let mut key = outpoint.transaction_id.as_bytes().to_vec();
    key.extend_from_slice(&outpoint.index.to_be_bytes());
    key
}

pub(crate) fn outpoint_from_key(key: &[u8]) -> DbResult<TransactionOutpoint> {
    if key.len() != HASH_SIZE + 4 {
        return Err(DbError::InvalidData(format!("key of length {} is not an outpoint", key.len())));
    }
    let transaction_id = hash_from_key(&key[..HASH_SIZE])?;
    let mut index_bytes = [0u8; 4];
    index_bytes.copy_from_slice(&key[HASH_SIZE..]);
    Ok(TransactionOutpoint::new(transaction_id, TransactionIndexType::from_be_bytes(index_bytes)))
}
