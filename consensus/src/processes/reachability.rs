//! Ancestry queries over the DAG and the selected parent chain.

use std::collections::VecDeque;
use std::sync::Arc;

use consensus_core::{BlockHashSet, Hash};
use database::stores::{GhostdagStore, RelationsStore};
use database::StagingArea;

use crate::errors::ConsensusResult;
use crate::model::services::ReachabilityService;

/// Answers ancestry queries by walking the stored relations.
///
/// The DAG walk is a plain breadth-first traversal over parent edges. Blue
/// score is not monotone across arbitrary parent edges, so the walk carries
/// no score bound; the chain walk does, because blue score strictly
/// increases along the selected parent chain.
pub struct DbReachabilityService {
    relations_store: Arc<RelationsStore>,
    ghostdag_store: Arc<GhostdagStore>,
}

impl DbReachabilityService {
    pub fn new(relations_store: Arc<RelationsStore>, ghostdag_store: Arc<GhostdagStore>) -> Self {
        Self { relations_store, ghostdag_store }
    }
}

impl ReachabilityService for DbReachabilityService {
    fn is_dag_ancestor_of(&self, area: &StagingArea, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        let mut visited = BlockHashSet::new();
        let mut queue = VecDeque::from([descendant]);
        while let Some(current) = queue.pop_front() {
            for parent in self.relations_store.get(area, current)?.parents {
                if parent == ancestor {
                    return Ok(true);
                }
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(false)
    }

    fn is_chain_ancestor_of(&self, area: &StagingArea, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool> {
        let ancestor_blue_score = self.ghostdag_store.get_blue_score(area, ancestor)?;
        let mut current = descendant;
        loop {
            if current == ancestor {
                return Ok(true);
            }
            let data = self.ghostdag_store.get(area, current)?;
            // descending to the ancestor's blue score without meeting it
            // places the ancestor on a different chain
            if data.blue_score <= ancestor_blue_score || !data.has_selected_parent() {
                return Ok(false);
            }
            current = data.selected_parent;
        }
    }
}
