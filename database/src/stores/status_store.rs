use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbError, DbResult};
use consensus_core::status::BlockStatus;
use consensus_core::Hash;
use std::sync::Arc;

/// Validation status per block. A block "exists" to the engine exactly when
/// it has a status row.
pub struct StatusStore {
    db: Arc<Database>,
}

impl StatusStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, hash: Hash, status: BlockStatus) -> DbResult<()> {
        let serialized = bincode::serialize(&status)?;
        area.stage_put(StoreId::Statuses, hash.as_bytes().to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea, hash: Hash) -> DbResult<BlockStatus> {
        self.get_optional(area, hash)?.ok_or_else(|| DbError::NotFound(format!("status of {}", hash)))
    }

    pub fn get_optional(&self, area: &StagingArea, hash: Hash) -> DbResult<Option<BlockStatus>> {
        super::read_staged(&self.db, area, StoreId::Statuses, hash.as_bytes())
    }

    pub fn has(&self, area: &StagingArea, hash: Hash) -> DbResult<bool> {
        super::exists_staged(&self.db, area, StoreId::Statuses, hash.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_status_roundtrip_and_overlay() {
        let tmp = TempDir::new().unwrap();
        let db = Arc::new(Database::open(tmp.path()).unwrap());
        let store = StatusStore::new(db.clone());
        let hash = Hash::from_le_u64([3, 0, 0, 0]);

        let mut area = StagingArea::new();
        store.stage(&mut area, hash, BlockStatus::StatusHeaderOnly).unwrap();
        area.commit(&db).unwrap();

        let mut area = StagingArea::new();
        store.stage(&mut area, hash, BlockStatus::StatusUTXOValid).unwrap();
        assert_eq!(store.get(&area, hash).unwrap(), BlockStatus::StatusUTXOValid);

        area.discard();
        assert_eq!(store.get(&area, hash).unwrap(), BlockStatus::StatusHeaderOnly);
    }
}
