//! Maintains the virtual block: the in-flight successor of the current tips.
//!
//! The virtual block is never submitted or stored as a real block. Its
//! parents are the DAG tips, its GHOSTDAG data orders the whole DAG, and
//! its UTXO set is the state a next block would build on.

use std::sync::Arc;

use tracing::{debug, warn};

use consensus_core::acceptance_data::{AcceptanceData, MergesetBlockAcceptanceData};
use consensus_core::block::Block;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::status::BlockStatus;
use consensus_core::tx::{TransactionOutpoint, UtxoEntry};
use consensus_core::utxo::UtxoDiff;
use consensus_core::{Hash, VIRTUAL_BLOCK_HASH};
use database::stores::{
    AcceptanceDataStore, GhostdagStore, PruningStore, StatusStore, UtxoDiffStore, VirtualUtxoStore,
};
use database::{StagingArea, StoreId};

use crate::errors::ConsensusResult;
use crate::model::services::{DagTopologyManager, GhostdagManager};

/// Advances the virtual block after each body-carrying insertion and
/// rebuilds it from scratch on a pruning point import.
pub struct VirtualProcessor {
    ghostdag_manager: Arc<dyn GhostdagManager>,
    topology_manager: Arc<dyn DagTopologyManager>,
    ghostdag_store: Arc<GhostdagStore>,
    statuses_store: Arc<StatusStore>,
    acceptance_data_store: Arc<AcceptanceDataStore>,
    utxo_diff_store: Arc<UtxoDiffStore>,
    virtual_utxo_store: Arc<VirtualUtxoStore>,
    pruning_store: Arc<PruningStore>,
}

impl VirtualProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ghostdag_manager: Arc<dyn GhostdagManager>,
        topology_manager: Arc<dyn DagTopologyManager>,
        ghostdag_store: Arc<GhostdagStore>,
        statuses_store: Arc<StatusStore>,
        acceptance_data_store: Arc<AcceptanceDataStore>,
        utxo_diff_store: Arc<UtxoDiffStore>,
        virtual_utxo_store: Arc<VirtualUtxoStore>,
        pruning_store: Arc<PruningStore>,
    ) -> Self {
        Self {
            ghostdag_manager,
            topology_manager,
            ghostdag_store,
            statuses_store,
            acceptance_data_store,
            utxo_diff_store,
            virtual_utxo_store,
            pruning_store,
        }
    }

    /// Moves the virtual block on top of a freshly committed body-carrying
    /// block and resolves the block's transactions against the virtual UTXO
    /// set.
    ///
    /// Stages the new virtual parents and GHOSTDAG data, and on successful
    /// UTXO resolution the block's diff, acceptance data and the
    /// `StatusUTXOValid` promotion. A block spending an output the virtual
    /// set does not hold stays at pending verification; only the UTXO
    /// writes of this phase are rolled back in that case. The caller owns
    /// the commit.
    pub fn update_virtual(
        &self,
        area: &mut StagingArea,
        block: &Block,
        data: &GhostdagData,
    ) -> ConsensusResult<BlockStatus> {
        let hash = block.header.hash;
        let old_parents = self.topology_manager.virtual_parents(area)?;
        let mut new_parents: Vec<Hash> = old_parents
            .into_iter()
            .filter(|parent| *parent != hash && !block.header.parents.contains(parent))
            .collect();
        new_parents.push(hash);

        self.topology_manager.stage_virtual_parents(area, &new_parents)?;
        let virtual_data = self.ghostdag_manager.ghostdag(area, &new_parents)?;
        debug!(
            "virtual advanced over {}: {} parents, blue score {}",
            hash,
            new_parents.len(),
            virtual_data.blue_score
        );
        self.ghostdag_store.stage(area, VIRTUAL_BLOCK_HASH, &virtual_data)?;

        match self.apply_block_utxos(area, block, data)? {
            Some((diff, acceptance_data)) => {
                self.utxo_diff_store.stage(area, hash, &diff)?;
                self.acceptance_data_store.stage(area, hash, &acceptance_data)?;
                self.statuses_store.stage(area, hash, BlockStatus::StatusUTXOValid)?;
                Ok(BlockStatus::StatusUTXOValid)
            }
            None => Ok(BlockStatus::StatusUTXOPendingVerification),
        }
    }

    /// Rebuilds the virtual state on top of an imported pruning point:
    /// virtual parents and GHOSTDAG data over the single new root, and the
    /// imported UTXO rows copied into the virtual UTXO set.
    pub fn stage_virtual_over_imported_point(
        &self,
        area: &mut StagingArea,
        pruning_point: Hash,
    ) -> ConsensusResult<()> {
        let parents = vec![pruning_point];
        self.topology_manager.stage_virtual_parents(area, &parents)?;
        let virtual_data = self.ghostdag_manager.ghostdag(area, &parents)?;
        self.ghostdag_store.stage(area, VIRTUAL_BLOCK_HASH, &virtual_data)?;

        self.pruning_store.for_each_imported_utxo(|outpoint, entry| {
            self.virtual_utxo_store.stage_insert(area, outpoint, entry)
        })?;
        Ok(())
    }

    /// Spends the block's inputs from the virtual UTXO set and adds its
    /// outputs, staging every mutation. Returns the diff and acceptance
    /// data, or `None` when an input is not a live UTXO, in which case the
    /// staged UTXO writes of this phase are dropped.
    fn apply_block_utxos(
        &self,
        area: &mut StagingArea,
        block: &Block,
        data: &GhostdagData,
    ) -> ConsensusResult<Option<(UtxoDiff, AcceptanceData)>> {
        let hash = block.header.hash;
        let mut diff = UtxoDiff::new();
        let mut accepted_transaction_ids = Vec::with_capacity(block.transactions.len());

        for tx in block.transactions.iter() {
            for input in tx.inputs.iter() {
                let outpoint = input.previous_outpoint;
                match self.virtual_utxo_store.get(area, &outpoint)? {
                    Some(entry) => {
                        self.virtual_utxo_store.stage_remove(area, &outpoint);
                        diff.remove.insert(outpoint, entry);
                    }
                    None => {
                        warn!(
                            "block {} spends {} which is not in the virtual utxo set; leaving it pending verification",
                            hash, outpoint
                        );
                        area.discard_store(StoreId::VirtualUtxoSet);
                        return Ok(None);
                    }
                }
            }
            for (index, output) in tx.outputs.iter().enumerate() {
                let outpoint = TransactionOutpoint::new(tx.id(), index as u32);
                let entry = UtxoEntry::new(
                    output.value,
                    output.script_public_key.clone(),
                    data.blue_score,
                    tx.is_coinbase(),
                );
                self.virtual_utxo_store.stage_insert(area, &outpoint, &entry)?;
                diff.add.insert(outpoint, entry);
            }
            accepted_transaction_ids.push(tx.id());
        }

        let acceptance_data = vec![MergesetBlockAcceptanceData {
            block_hash: hash,
            accepted_transaction_ids,
        }];
        Ok(Some((diff, acceptance_data)))
    }
}
