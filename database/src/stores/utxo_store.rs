use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbResult};
use consensus_core::tx::{TransactionOutpoint, UtxoEntry};
use rocksdb::{Direction, IteratorMode};
use std::sync::Arc;

/// The virtual block's UTXO set, keyed by outpoint in canonical order.
pub struct VirtualUtxoStore {
    db: Arc<Database>,
}

impl VirtualUtxoStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage_insert(&self, area: &mut StagingArea, outpoint: &TransactionOutpoint, entry: &UtxoEntry) -> DbResult<()> {
        let serialized = bincode::serialize(entry)?;
        area.stage_put(StoreId::VirtualUtxoSet, super::outpoint_to_key(outpoint), serialized);
        Ok(())
    }

    pub fn stage_remove(&self, area: &mut StagingArea, outpoint: &TransactionOutpoint) {
        area.stage_delete(StoreId::VirtualUtxoSet, super::outpoint_to_key(outpoint));
    }

    pub fn get(&self, area: &StagingArea, outpoint: &TransactionOutpoint) -> DbResult<Option<UtxoEntry>> {
        super::read_staged(&self.db, area, StoreId::VirtualUtxoSet, &super::outpoint_to_key(outpoint))
    }

    pub fn has(&self, area: &StagingArea, outpoint: &TransactionOutpoint) -> DbResult<bool> {
        super::exists_staged(&self.db, area, StoreId::VirtualUtxoSet, &super::outpoint_to_key(outpoint))
    }

    /// Committed entries in outpoint order, strictly after `from_outpoint`
    /// when given, at most `limit`. Queries run between operations, so the
    /// committed view is the authoritative one.
    pub fn utxos_from(
        &self,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
    ) -> DbResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
        utxos_from_cf(&self.db, StoreId::VirtualUtxoSet, from_outpoint, limit)
    }
}

/// Shared range scan over an outpoint-keyed column family.
pub(crate) fn utxos_from_cf(
    db: &Database,
    store: StoreId,
    from_outpoint: Option<TransactionOutpoint>,
    limit: usize,
) -> DbResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
    let mut result = Vec::new();
    let start_key = from_outpoint.as_ref().map(super::outpoint_to_key);
    let mode = match &start_key {
        Some(key) => IteratorMode::From(key, Direction::Forward),
        None => IteratorMode::Start,
    };
    for item in db.iterator(store.cf(), mode)? {
        if result.len() >= limit {
            break;
        }
        let (key, value) = item?;
        let outpoint = super::outpoint_from_key(&key)?;
        if let Some(from) = from_outpoint {
            if outpoint <= from {
                continue;
            }
        }
        result.push((outpoint, bincode::deserialize(&value)?));
    }
    Ok(result)
}
