use crate::db::{self, Database};
use crate::errors::DbResult;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Identifies a store inside a staging area. One variant per column family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreId {
    Blocks,
    Headers,
    Statuses,
    Relations,
    Ghostdag,
    AcceptanceData,
    UtxoDiffs,
    VirtualUtxoSet,
    PruningPoint,
    PruningUtxoSet,
    HeaderTips,
    HeadersSelectedTip,
}

impl StoreId {
    pub fn cf(self) -> &'static str {
        match self {
            StoreId::Blocks => db::CF_BLOCKS,
            StoreId::Headers => db::CF_HEADERS,
            StoreId::Statuses => db::CF_STATUSES,
            StoreId::Relations => db::CF_RELATIONS,
            StoreId::Ghostdag => db::CF_GHOSTDAG,
            StoreId::AcceptanceData => db::CF_ACCEPTANCE_DATA,
            StoreId::UtxoDiffs => db::CF_UTXO_DIFFS,
            StoreId::VirtualUtxoSet => db::CF_VIRTUAL_UTXOS,
            StoreId::PruningPoint => db::CF_PRUNING_POINT,
            StoreId::PruningUtxoSet => db::CF_PRUNING_UTXOS,
            StoreId::HeaderTips => db::CF_HEADER_TIPS,
            StoreId::HeadersSelectedTip => db::CF_HEADERS_SELECTED_TIP,
        }
    }
}

/// A pending write: either a serialized value or a deletion marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedWrite {
    Put(Vec<u8>),
    Delete,
}

/// In-memory write buffer owned by a single consensus operation.
///
/// Stores read through the area (staged puts shadow committed values, staged
/// deletes hide them) and write only into it. The operation either discards
/// the buffer, leaving the database untouched, or commits it, which flushes
/// every staged write across all stores in one atomic rocksdb batch.
///
/// The area is passed by mutable reference down the call stack and never
/// outlives its operation.
#[derive(Debug, Default)]
pub struct StagingArea {
    writes: HashMap<StoreId, BTreeMap<Vec<u8>, StagedWrite>>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a value, replacing any previously staged write for the key.
    pub fn stage_put(&mut self, store: StoreId, key: Vec<u8>, value: Vec<u8>) {
        self.writes.entry(store).or_default().insert(key, StagedWrite::Put(value));
    }

    /// Stages a deletion, replacing any previously staged write for the key.
    pub fn stage_delete(&mut self, store: StoreId, key: Vec<u8>) {
        self.writes.entry(store).or_default().insert(key, StagedWrite::Delete);
    }

    /// The staged write for a key, if any.
    pub fn staged(&self, store: StoreId, key: &[u8]) -> Option<&StagedWrite> {
        self.writes.get(&store).and_then(|map| map.get(key))
    }

    /// All staged writes of one store, in key order.
    pub fn staged_entries(&self, store: StoreId) -> impl Iterator<Item = (&Vec<u8>, &StagedWrite)> {
        self.writes.get(&store).into_iter().flatten()
    }

    /// Drops every staged write of one store.
    pub fn discard_store(&mut self, store: StoreId) {
        self.writes.remove(&store);
    }

    /// Drops every staged write; nothing reaches the database.
    pub fn discard(&mut self) {
        self.writes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.writes.values().all(|map| map.is_empty())
    }

    pub fn write_count(&self) -> usize {
        self.writes.values().map(|map| map.len()).sum()
    }

    /// Flushes all staged writes in one atomic batch and empties the buffer,
    /// so the same area can stage a later phase of the operation.
    ///
    /// On error nothing is written and the staged writes are kept.
    pub fn commit(&mut self, db: &Database) -> DbResult<()> {
        let mut batch = db.batch();
        for (store, map) in self.writes.iter() {
            let cf = db.get_cf_handle(store.cf())?;
            for (key, write) in map.iter() {
                match write {
                    StagedWrite::Put(value) => batch.put_cf(cf, key, value),
                    StagedWrite::Delete => batch.delete_cf(cf, key),
                }
            }
        }
        let count = self.write_count();
        db.write_batch(batch)?;
        self.writes.clear();
        debug!(writes = count, "committed staging area");
        Ok(())
    }
}
