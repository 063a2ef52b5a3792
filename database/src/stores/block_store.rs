use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbError, DbResult};
use consensus_core::block::Block;
use consensus_core::Hash;
use std::sync::Arc;

/// Body-carrying blocks, keyed by header hash.
pub struct BlockStore {
    db: Arc<Database>,
}

impl BlockStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, block: &Block) -> DbResult<()> {
        let serialized = bincode::serialize(block)?;
        area.stage_put(StoreId::Blocks, block.hash().as_bytes().to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea, hash: Hash) -> DbResult<Block> {
        self.get_optional(area, hash)?.ok_or_else(|| DbError::NotFound(format!("block {}", hash)))
    }

    pub fn get_optional(&self, area: &StagingArea, hash: Hash) -> DbResult<Option<Block>> {
        super::read_staged(&self.db, area, StoreId::Blocks, hash.as_bytes())
    }

    pub fn has(&self, area: &StagingArea, hash: Hash) -> DbResult<bool> {
        super::exists_staged(&self.db, area, StoreId::Blocks, hash.as_bytes())
    }

    /// Number of committed blocks. Staged writes are not counted; callers use
    /// this for sync progress reporting only.
    pub fn count(&self) -> DbResult<u64> {
        let mut count = 0u64;
        let iter = self.db.iterator(StoreId::Blocks.cf(), rocksdb::IteratorMode::Start)?;
        for item in iter {
            item?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::header::Header;
    use consensus_core::ZERO_HASH;
    use tempfile::TempDir;

    fn sample_block(nonce: u64) -> Block {
        Block::from_header(Header::new_finalized(
            1,
            vec![Hash::from_le_u64([1, 0, 0, 0])],
            ZERO_HASH,
            ZERO_HASH,
            1_000,
            0x207fffff,
            nonce,
            0,
            0,
            0,
            ZERO_HASH,
        ))
    }

    #[test]
    fn test_stage_commit_get() {
        let tmp = TempDir::new().unwrap();
        let db = Arc::new(Database::open(tmp.path()).unwrap());
        let store = BlockStore::new(db.clone());
        let block = sample_block(7);

        let mut area = StagingArea::new();
        store.stage(&mut area, &block).unwrap();

        // visible through the overlay before the commit, invisible to a fresh area
        assert_eq!(store.get(&area, block.hash()).unwrap(), block);
        assert!(!store.has(&StagingArea::new(), block.hash()).unwrap());

        area.commit(&db).unwrap();
        assert_eq!(store.get(&StagingArea::new(), block.hash()).unwrap(), block);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_missing_block_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let db = Arc::new(Database::open(tmp.path()).unwrap());
        let store = BlockStore::new(db);
        let area = StagingArea::new();
        assert!(matches!(store.get(&area, Hash::from_le_u64([9, 0, 0, 0])), Err(DbError::NotFound(_))));
    }
}
