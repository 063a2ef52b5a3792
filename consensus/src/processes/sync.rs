//! Sync-oriented queries: progress info, block locators, missing bodies.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use consensus_core::api::SyncInfo;
use consensus_core::{BlockHashMap, BlockHashSet, Hash};
use database::stores::{BlockStore, GhostdagStore, HeaderStore, HeadersSelectedTipStore, RelationsStore, StatusStore};
use database::{DbError, StagingArea};

use crate::errors::{ConsensusError, ConsensusResult};
use crate::model::services::{ReachabilityService, SyncManager};

pub struct DbSyncManager {
    header_store: Arc<HeaderStore>,
    block_store: Arc<BlockStore>,
    statuses_store: Arc<StatusStore>,
    relations_store: Arc<RelationsStore>,
    ghostdag_store: Arc<GhostdagStore>,
    headers_selected_tip_store: Arc<HeadersSelectedTipStore>,
    reachability: Arc<dyn ReachabilityService>,
}

impl DbSyncManager {
    pub fn new(
        header_store: Arc<HeaderStore>,
        block_store: Arc<BlockStore>,
        statuses_store: Arc<StatusStore>,
        relations_store: Arc<RelationsStore>,
        ghostdag_store: Arc<GhostdagStore>,
        headers_selected_tip_store: Arc<HeadersSelectedTipStore>,
        reachability: Arc<dyn ReachabilityService>,
    ) -> Self {
        Self {
            header_store,
            block_store,
            statuses_store,
            relations_store,
            ghostdag_store,
            headers_selected_tip_store,
            reachability,
        }
    }

    /// Descends the selected parent chain from `from` to the first block
    /// whose blue score is at or below `score`.
    fn chain_ancestor_at_or_below(&self, area: &StagingArea, from: Hash, score: u64) -> ConsensusResult<Hash> {
        let mut current = from;
        let mut data = self.ghostdag_store.get(area, current)?;
        while data.blue_score > score && data.has_selected_parent() {
            current = data.selected_parent;
            data = self.ghostdag_store.get(area, current)?;
        }
        Ok(current)
    }
}

impl SyncManager for DbSyncManager {
    fn get_sync_info(&self, area: &StagingArea) -> ConsensusResult<SyncInfo> {
        let headers_selected_tip = self
            .headers_selected_tip_store
            .get(area)?
            .ok_or_else(|| DbError::NotFound("headers selected tip".to_string()))?;
        Ok(SyncInfo {
            headers_selected_tip,
            header_count: self.header_store.count()?,
            block_count: self.block_store.count()?,
        })
    }

    fn create_block_locator(
        &self,
        area: &StagingArea,
        low: Hash,
        high: Hash,
        limit: usize,
    ) -> ConsensusResult<Vec<Hash>> {
        if !self.reachability.is_chain_ancestor_of(area, low, high)? {
            return Err(ConsensusError::InvalidLocatorBounds { low, high });
        }
        let low_score = self.ghostdag_store.get_blue_score(area, low)?;
        let mut locator = Vec::new();
        let mut current = high;
        let mut step: u64 = 1;
        loop {
            locator.push(current);
            if current == low {
                break;
            }
            if limit != 0 && locator.len() == limit {
                // a truncated locator still anchors at the low bound
                if let Some(last) = locator.last_mut() {
                    *last = low;
                }
                break;
            }
            let current_score = self.ghostdag_store.get_blue_score(area, current)?;
            let next_score = current_score.saturating_sub(step).max(low_score);
            current = self.chain_ancestor_at_or_below(area, current, next_score)?;
            step = step.saturating_mul(2);
        }
        Ok(locator)
    }

    fn get_missing_block_body_hashes(&self, area: &StagingArea, high: Hash) -> ConsensusResult<Vec<Hash>> {
        let mut visited = BlockHashSet::from([high]);
        let mut queue = VecDeque::from([high]);
        while let Some(current) = queue.pop_front() {
            for parent in self.relations_store.get(area, current)?.parents {
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        // topological order over the visited cone, ties broken by hash so
        // the result is deterministic
        let mut in_degree: BlockHashMap<usize> = BlockHashMap::with_capacity(visited.len());
        for &hash in visited.iter() {
            in_degree.insert(hash, self.relations_store.get(area, hash)?.parents.len());
        }
        let mut ready: BTreeSet<Hash> =
            in_degree.iter().filter(|(_, degree)| **degree == 0).map(|(&hash, _)| hash).collect();
        let mut missing = Vec::new();
        while let Some(hash) = ready.pop_first() {
            if self.statuses_store.get(area, hash)?.is_header_only() {
                missing.push(hash);
            }
            for child in self.relations_store.get(area, hash)?.children {
                if let Some(degree) = in_degree.get_mut(&child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(child);
                    }
                }
            }
        }
        Ok(missing)
    }
}
