use crate::staging::{StagedWrite, StagingArea, StoreId};
use crate::{Database, DbResult};
use consensus_core::Hash;
use rocksdb::IteratorMode;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The set of DAG tips by header topology: headers no other known header
/// points to as a parent. Keys are the members; values carry nothing.
pub struct HeaderTipsStore {
    db: Arc<Database>,
}

impl HeaderTipsStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage_add(&self, area: &mut StagingArea, hash: Hash) {
        area.stage_put(StoreId::HeaderTips, hash.to_bytes().to_vec(), Vec::new());
    }

    pub fn stage_remove(&self, area: &mut StagingArea, hash: Hash) {
        area.stage_delete(StoreId::HeaderTips, hash.to_bytes().to_vec());
    }

    pub fn has(&self, area: &StagingArea, hash: Hash) -> DbResult<bool> {
        super::exists_staged(&self.db, area, StoreId::HeaderTips, hash.as_bytes())
    }

    /// The tip set as seen through the area: committed members minus staged
    /// removals plus staged additions, in hash order.
    pub fn tips(&self, area: &StagingArea) -> DbResult<Vec<Hash>> {
        let mut tips = BTreeSet::new();
        for item in self.db.iterator(StoreId::HeaderTips.cf(), IteratorMode::Start)? {
            let (key, _) = item?;
            tips.insert(super::hash_from_key(&key)?);
        }
        for (key, write) in area.staged_entries(StoreId::HeaderTips) {
            let hash = super::hash_from_key(key)?;
            match write {
                StagedWrite::Put(_) => {
                    tips.insert(hash);
                }
                StagedWrite::Delete => {
                    tips.remove(&hash);
                }
            }
        }
        Ok(tips.into_iter().collect())
    }
}

const SELECTED_TIP_KEY: &[u8] = b"selected_tip";

/// The header tip with the highest blue work, tracked as a singleton row.
pub struct HeadersSelectedTipStore {
    db: Arc<Database>,
}

impl HeadersSelectedTipStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, hash: Hash) -> DbResult<()> {
        let serialized = bincode::serialize(&hash)?;
        area.stage_put(StoreId::HeadersSelectedTip, SELECTED_TIP_KEY.to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea) -> DbResult<Option<Hash>> {
        super::read_staged(&self.db, area, StoreId::HeadersSelectedTip, SELECTED_TIP_KEY)
    }
}
