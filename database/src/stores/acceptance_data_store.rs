use crate::staging::{StagingArea, StoreId};
use crate::{Database, DbError, DbResult};
use consensus_core::acceptance_data::AcceptanceData;
use consensus_core::Hash;
use std::sync::Arc;

/// Acceptance data per chain block: which transactions of its mergeset the
/// block admitted into the UTXO set.
pub struct AcceptanceDataStore {
    db: Arc<Database>,
}

impl AcceptanceDataStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn stage(&self, area: &mut StagingArea, hash: Hash, data: &AcceptanceData) -> DbResult<()> {
        let serialized = bincode::serialize(data)?;
        area.stage_put(StoreId::AcceptanceData, hash.as_bytes().to_vec(), serialized);
        Ok(())
    }

    pub fn get(&self, area: &StagingArea, hash: Hash) -> DbResult<AcceptanceData> {
        self.get_optional(area, hash)?.ok_or_else(|| DbError::NotFound(format!("acceptance data of {}", hash)))
    }

    pub fn get_optional(&self, area: &StagingArea, hash: Hash) -> DbResult<Option<AcceptanceData>> {
        super::read_staged(&self.db, area, StoreId::AcceptanceData, hash.as_bytes())
    }
}
