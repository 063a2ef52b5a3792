//! Assembles mineable block templates on top of the current virtual state.

use std::sync::Arc;

use consensus_core::block::Block;
use consensus_core::config::constants::BLOCK_VERSION;
use consensus_core::header::Header;
use consensus_core::merkle::calc_hash_merkle_root;
use consensus_core::tx::{ScriptPublicKey, Transaction};
use consensus_core::{BlueWorkType, Hash, ZERO_HASH};
use database::stores::{GhostdagStore, PruningStore};
use database::{DbError, StagingArea};

use crate::errors::ConsensusResult;
use crate::model::services::{
    CoinbaseManager, DagTopologyManager, DifficultyManager, GhostdagManager,
    PastMedianTimeManager,
};
use crate::model::unix_now_millis;

/// Builds blocks that satisfy every contextual rule except the proof of
/// work, which the miner supplies by searching the nonce.
pub struct TemplateBuilder {
    max_block_parents: usize,
    ghostdag_store: Arc<GhostdagStore>,
    pruning_store: Arc<PruningStore>,
    topology_manager: Arc<dyn DagTopologyManager>,
    ghostdag_manager: Arc<dyn GhostdagManager>,
    difficulty_manager: Arc<dyn DifficultyManager>,
    past_median_time_manager: Arc<dyn PastMedianTimeManager>,
    coinbase_manager: Arc<dyn CoinbaseManager>,
}

impl TemplateBuilder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_block_parents: usize,
        ghostdag_store: Arc<GhostdagStore>,
        pruning_store: Arc<PruningStore>,
        topology_manager: Arc<dyn DagTopologyManager>,
        ghostdag_manager: Arc<dyn GhostdagManager>,
        difficulty_manager: Arc<dyn DifficultyManager>,
        past_median_time_manager: Arc<dyn PastMedianTimeManager>,
        coinbase_manager: Arc<dyn CoinbaseManager>,
    ) -> Self {
        Self {
            max_block_parents,
            ghostdag_store,
            pruning_store,
            topology_manager,
            ghostdag_manager,
            difficulty_manager,
            past_median_time_manager,
            coinbase_manager,
        }
    }

    /// A block over the current tips: required difficulty, a timestamp
    /// ahead of the past median time, computed scores, and the coinbase in
    /// first position paying `miner_script`.
    pub fn build_block_template(
        &self,
        miner_script: ScriptPublicKey,
        txs: Vec<Transaction>,
    ) -> ConsensusResult<Block> {
        let area = StagingArea::new();
        let mut parents = self.topology_manager.virtual_parents(&area)?;
        if parents.len() > self.max_block_parents {
            parents = self.strongest_parents(&area, parents)?;
        }

        let data = self.ghostdag_manager.ghostdag(&area, &parents)?;
        let bits = self.difficulty_manager.required_bits(&area, &parents)?;
        let past_median_time = self
            .past_median_time_manager
            .past_median_time(&area, data.selected_parent)?;
        let timestamp = unix_now_millis().max(past_median_time + 1);
        let pruning_point = self
            .pruning_store
            .pruning_point(&area)?
            .ok_or_else(|| DbError::NotFound("the pruning point row".to_string()))?;

        let coinbase = self
            .coinbase_manager
            .expected_coinbase(data.blue_score, miner_script);
        let mut transactions = Vec::with_capacity(txs.len() + 1);
        transactions.push(coinbase);
        transactions.extend(txs);
        let hash_merkle_root = calc_hash_merkle_root(&transactions);

        let header = Header::new_finalized(
            BLOCK_VERSION,
            parents,
            hash_merkle_root,
            ZERO_HASH,
            timestamp,
            bits,
            0,
            data.blue_score,
            data.blue_score,
            data.blue_work,
            pruning_point,
        );
        Ok(Block::new(header, transactions))
    }

    /// When the tip set outgrows the parent limit, keep the tips with the
    /// most accumulated work.
    fn strongest_parents(
        &self,
        area: &StagingArea,
        parents: Vec<Hash>,
    ) -> ConsensusResult<Vec<Hash>> {
        let mut keyed: Vec<(BlueWorkType, Hash)> = Vec::with_capacity(parents.len());
        for &parent in parents.iter() {
            keyed.push((self.ghostdag_store.get_blue_work(area, parent)?, parent));
        }
        keyed.sort_unstable_by(|a, b| b.cmp(a));
        Ok(keyed
            .into_iter()
            .take(self.max_block_parents)
            .map(|(_, hash)| hash)
            .collect())
    }
}
