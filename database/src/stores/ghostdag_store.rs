use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbError, DbResult};
use consensus_core::ghostdag::GhostdagData;
use consensus_core::Hash;
use std::sync::Arc;

/// GHOSTDAG data per block, keyed by hash. The virtual block's data lives
/// under the virtual sentinel hash and is restaged on every virtual update.
pub struct GhostdagStore {
    db: Arc<Database>,
}

impl GhostdagStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, hash: Hash, data: &GhostdagData) -> DbResult<()> {
        let serialized = bincode::serialize(data)?;
        area.stage_put(StoreId::Ghostdag, hash.as_bytes().to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea, hash: Hash) -> DbResult<GhostdagData> {
        self.get_optional(area, hash)?.ok_or_else(|| DbError::NotFound(format!("ghostdag data of {}", hash)))
    }

    pub fn get_optional(&self, area: &StagingArea, hash: Hash) -> DbResult<Option<GhostdagData>> {
        super::read_staged(&self.db, area, StoreId::Ghostdag, hash.as_bytes())
    }

    pub fn has(&self, area: &StagingArea, hash: Hash) -> DbResult<bool> {
        super::exists_staged(&self.db, area, StoreId::Ghostdag, hash.as_bytes())
    }

    pub fn get_blue_score(&self, area: &StagingArea, hash: Hash) -> DbResult<u64> {
        Ok(self.get(area, hash)?.blue_score)
    }

    pub fn get_blue_work(&self, area: &StagingArea, hash: Hash) -> DbResult<u128> {
        Ok(self.get(area, hash)?.blue_work)
    }
}
