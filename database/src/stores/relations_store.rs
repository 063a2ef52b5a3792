use crate::staging::{StagedWrite, StagingArea, StoreId};
use crate::{Database, DbError, DbResult};
use consensus_core::Hash;
use rocksdb::IteratorMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A block's direct DAG neighborhood.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRelations {
    pub parents: Vec<Hash>,
    pub children: Vec<Hash>,
}

/// Parent/child edges per block, keyed by hash. The virtual block keeps a
/// relations row too; its key is the virtual sentinel hash.
pub struct RelationsStore {
    db: Arc<Database>,
}

impl RelationsStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, hash: Hash, relations: &BlockRelations) -> DbResult<()> {
        let serialized = bincode::serialize(relations)?;
        area.stage_put(StoreId::Relations, hash.as_bytes().to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea, hash: Hash) -> DbResult<BlockRelations> {
        self.get_optional(area, hash)?.ok_or_else(|| DbError::NotFound(format!("relations of {}", hash)))
    }

    pub fn get_optional(&self, area: &StagingArea, hash: Hash) -> DbResult<Option<BlockRelations>> {
        super::read_staged(&self.db, area, StoreId::Relations, hash.as_bytes())
    }

    pub fn has(&self, area: &StagingArea, hash: Hash) -> DbResult<bool> {
        super::exists_staged(&self.db, area, StoreId::Relations, hash.as_bytes())
    }

    /// Every block with a relations row, the staged overlay applied, in hash
    /// order. The virtual block's row is included.
    pub fn all_hashes(&self, area: &StagingArea) -> DbResult<Vec<Hash>> {
        let mut hashes = BTreeSet::new();
        for item in self.db.iterator(StoreId::Relations.cf(), IteratorMode::Start)? {
            let (key, _) = item?;
            hashes.insert(super::hash_from_key(&key)?);
        }
        for (key, write) in area.staged_entries(StoreId::Relations) {
            let hash = super::hash_from_key(key)?;
            match write {
                StagedWrite::Put(_) => {
                    hashes.insert(hash);
                }
                StagedWrite::Delete => {
                    hashes.remove(&hash);
                }
            }
        }
        Ok(hashes.into_iter().collect())
    }
}
