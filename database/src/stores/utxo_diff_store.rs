use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbError, DbResult};
use consensus_core::utxo::UtxoDiff;
use consensus_core::Hash;
use std::sync::Arc;

/// The UTXO delta each applied block contributed, kept for undo and audit.
pub struct UtxoDiffStore {
    db: Arc<Database>,
}

impl UtxoDiffStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, hash: Hash, diff: &UtxoDiff) -> DbResult<()> {
        let serialized = bincode::serialize(diff)?;
        area.stage_put(StoreId::UtxoDiffs, hash.as_bytes().to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea, hash: Hash) -> DbResult<UtxoDiff> {
        self.get_optional(area, hash)?.ok_or_else(|| DbError::NotFound(format!("utxo diff of {}", hash)))
    }

    pub fn get_optional(&self, area: &StagingArea, hash: Hash) -> DbResult<Option<UtxoDiff>> {
        super::read_staged(&self.db, area, StoreId::UtxoDiffs, hash.as_bytes())
    }
}
