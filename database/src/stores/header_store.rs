use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbError, DbResult};
use consensus_core::header::Header;
use consensus_core::Hash;
use std::sync::Arc;

/// Block headers, keyed by hash. Present for every known block, body or not.
pub struct HeaderStore {
    db: Arc<Database>,
}

impl HeaderStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, header: &Header) -> DbResult<()> {
        let serialized = bincode::serialize(header)?;
        area.stage_put(StoreId::Headers, header.hash.as_bytes().to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea, hash: Hash) -> DbResult<Header> {
        self.get_optional(area, hash)?.ok_or_else(|| DbError::NotFound(format!("header {}", hash)))
    }

    pub fn get_optional(&self, area: &StagingArea, hash: Hash) -> DbResult<Option<Header>> {
        super::read_staged(&self.db, area, StoreId::Headers, hash.as_bytes())
    }

    pub fn has(&self, area: &StagingArea, hash: Hash) -> DbResult<bool> {
        super::exists_staged(&self.db, area, StoreId::Headers, hash.as_bytes())
    }

    /// Number of committed headers.
    pub fn count(&self) -> DbResult<u64> {
        let mut count = 0u64;
        let iter = self.db.iterator(StoreId::Headers.cf(), rocksdb::IteratorMode::Start)?;
        for item in iter {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
