//! Depth rules: bounded merge depth, finality and pruning point checks.

use std::sync::Arc;

use consensus_core::errors::RuleError;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::header::Header;
use consensus_core::{Hash, VIRTUAL_BLOCK_HASH};
use database::stores::{GhostdagStore, PruningStore};
use database::{DbError, StagingArea};

use crate::errors::ConsensusResult;
use crate::model::services::{DepthManager, ReachabilityService};

/// Enforces the depth rules anchored on the selected parent chain.
pub struct DbDepthManager {
    merge_depth: u64,
    finality_depth: u64,
    ghostdag_store: Arc<GhostdagStore>,
    pruning_store: Arc<PruningStore>,
    reachability: Arc<dyn ReachabilityService>,
}

impl DbDepthManager {
    pub fn new(
        merge_depth: u64,
        finality_depth: u64,
        ghostdag_store: Arc<GhostdagStore>,
        pruning_store: Arc<PruningStore>,
        reachability: Arc<dyn ReachabilityService>,
    ) -> Self {
        Self { merge_depth, finality_depth, ghostdag_store, pruning_store, reachability }
    }

    /// The first chain ancestor whose blue score is at least `depth` below
    /// the given data's, or the chain root if the chain is shorter.
    fn block_at_depth(&self, area: &StagingArea, data: &GhostdagData, depth: u64) -> ConsensusResult<Hash> {
        let target_score = data.blue_score.saturating_sub(depth);
        let mut current = data.selected_parent;
        loop {
            let current_data = self.ghostdag_store.get(area, current)?;
            if current_data.blue_score <= target_score || !current_data.has_selected_parent() {
                return Ok(current);
            }
            current = current_data.selected_parent;
        }
    }
}

impl DepthManager for DbDepthManager {
    fn check_bounded_merge_depth(&self, area: &StagingArea, block: Hash, data: &GhostdagData) -> ConsensusResult<()> {
        if data.mergeset_reds.is_empty() {
            return Ok(());
        }
        let depth_root = self.block_at_depth(area, data, self.merge_depth)?;
        for &red in data.mergeset_reds.iter() {
            if !self.reachability.is_dag_ancestor_of(area, depth_root, red)? {
                return Err(RuleError::ViolatingBoundedMergeDepth { block, red }.into());
            }
        }
        Ok(())
    }

    fn check_finality(&self, area: &StagingArea, block: Hash, _data: &GhostdagData) -> ConsensusResult<()> {
        let virtual_data = self.ghostdag_store.get(area, VIRTUAL_BLOCK_HASH)?;
        let finality_point = self.block_at_depth(area, &virtual_data, self.finality_depth)?;
        if !self.reachability.is_dag_ancestor_of(area, finality_point, block)? {
            return Err(RuleError::ViolatingFinality { block, finality_point }.into());
        }
        Ok(())
    }

    fn check_pruning_point_rules(&self, area: &StagingArea, header: &Header) -> ConsensusResult<()> {
        let pruning_point = self
            .pruning_store
            .pruning_point(area)?
            .ok_or_else(|| DbError::NotFound("pruning point".to_string()))?;
        for &parent in header.parents.iter() {
            if parent != pruning_point && self.reachability.is_dag_ancestor_of(area, parent, pruning_point)? {
                return Err(RuleError::ViolatingPruningPoint(parent).into());
            }
        }
        if header.pruning_point != pruning_point {
            return Err(
                RuleError::WrongHeaderPruningPoint { got: header.pruning_point, expected: pruning_point }.into()
            );
        }
        Ok(())
    }
}
