//! Pruning point queries and imported-UTXO-set bookkeeping.

use std::sync::Arc;

use consensus_core::hashing::utxo::utxo_commitment;
use consensus_core::tx::{TransactionOutpoint, UtxoEntry};
use consensus_core::Hash;
use database::stores::{PruningStore, StatusStore};
use database::{DbError, StagingArea};

use crate::errors::ConsensusResult;
use crate::model::services::{PruningManager, ReachabilityService};

/// Serves pruning point queries. The pruning point stays pinned (at genesis,
/// or at an imported point) and only moves through an explicit import.
pub struct DbPruningManager {
    pruning_store: Arc<PruningStore>,
    statuses_store: Arc<StatusStore>,
    reachability: Arc<dyn ReachabilityService>,
}

impl DbPruningManager {
    pub fn new(
        pruning_store: Arc<PruningStore>,
        statuses_store: Arc<StatusStore>,
        reachability: Arc<dyn ReachabilityService>,
    ) -> Self {
        Self { pruning_store, statuses_store, reachability }
    }
}

impl PruningManager for DbPruningManager {
    fn is_valid_pruning_point(&self, area: &StagingArea, hash: Hash) -> ConsensusResult<bool> {
        match self.statuses_store.get_optional(area, hash)? {
            None => return Ok(false),
            // invalid blocks carry no ghostdag data to chain-walk over
            Some(status) if status.is_invalid() => return Ok(false),
            Some(_) => {}
        }
        let pruning_point = self
            .pruning_store
            .pruning_point(area)?
            .ok_or_else(|| DbError::NotFound("pruning point".to_string()))?;
        self.reachability.is_chain_ancestor_of(area, hash, pruning_point)
    }

    fn imported_utxo_set(&self) -> ConsensusResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
        Ok(self.pruning_store.imported_utxos_from(None, usize::MAX)?)
    }

    fn imported_utxo_commitment(&self) -> ConsensusResult<Hash> {
        let pairs = self.imported_utxo_set()?;
        Ok(utxo_commitment(pairs.iter().map(|(outpoint, entry)| (outpoint, entry))))
    }
}
