use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbResult};
use consensus_core::tx::{TransactionOutpoint, UtxoEntry};
use consensus_core::Hash;
use rocksdb::IteratorMode;
use std::sync::Arc;

const PRUNING_POINT_KEY: &[u8] = b"pruning_point";

/// The current pruning point hash plus the UTXO set imported for it.
///
/// The imported rows double as a landing zone while an import is in flight
/// and as the pruning point's UTXO set once the import is accepted.
pub struct PruningStore {
    db: Arc<Database>,
}

impl PruningStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage_pruning_point(&self, area: &mut StagingArea, hash: Hash) -> DbResult<()> {
        let serialized = bincode::serialize(&hash)?;
        area.stage_put(StoreId::PruningPoint, PRUNING_POINT_KEY.to_vec(), serialized);
        Ok(())
    }

    pub fn pruning_point(&self, area: &StagingArea) -> DbResult<Option<Hash>> {
        super::read_staged(&self.db, area, StoreId::PruningPoint, PRUNING_POINT_KEY)
    }

    pub fn stage_imported_utxo(
        &self,
        area: &mut StagingArea,
        outpoint: &TransactionOutpoint,
        entry: &UtxoEntry,
    ) -> DbResult<()> {
        let serialized = bincode::serialize(entry)?;
        area.stage_put(StoreId::PruningUtxoSet, super::outpoint_to_key(outpoint), serialized);
        Ok(())
    }

    /// Drops any staged imported rows and stages a delete for every committed
    /// one, so a commit leaves the imported set empty.
    pub fn stage_clear_imported_utxos(&self, area: &mut StagingArea) -> DbResult<()> {
        area.discard_store(StoreId::PruningUtxoSet);
        for item in self.db.iterator(StoreId::PruningUtxoSet.cf(), IteratorMode::Start)? {
            let (key, _) = item?;
            area.stage_delete(StoreId::PruningUtxoSet, key.to_vec());
        }
        Ok(())
    }

    /// Committed imported entries in outpoint order, strictly after
    /// `from_outpoint` when given, at most `limit`.
    pub fn imported_utxos_from(
        &self,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
    ) -> DbResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
        super::utxo_store::utxos_from_cf(&self.db, StoreId::PruningUtxoSet, from_outpoint, limit)
    }

    /// Walks every committed imported entry in outpoint order.
    pub fn for_each_imported_utxo<F>(&self, mut visit: F) -> DbResult<()>
    where
        F: FnMut(&TransactionOutpoint, &UtxoEntry) -> DbResult<()>,
    {
        for item in self.db.iterator(StoreId::PruningUtxoSet.cf(), IteratorMode::Start)? {
            let (key, value) = item?;
            let outpoint = super::outpoint_from_key(&key)?;
            let entry: UtxoEntry = bincode::deserialize(&value)?;
            visit(&outpoint, &entry)?;
        }
        Ok(())
    }

    pub fn has_imported_utxos(&self) -> DbResult<bool> {
        let mut iter = self.db.iterator(StoreId::PruningUtxoSet.cf(), IteratorMode::Start)?;
        match iter.next() {
            Some(item) => {
                item?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
