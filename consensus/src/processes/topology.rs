//! Parent/child relations bookkeeping and anticone queries.

use std::collections::VecDeque;
use std::sync::Arc;

use consensus_core::{BlockHashSet, Hash, VIRTUAL_BLOCK_HASH};
use database::stores::{BlockRelations, RelationsStore};
use database::StagingArea;

use crate::errors::ConsensusResult;
use crate::model::services::DagTopologyManager;

/// Store-backed topology manager.
///
/// The virtual block holds a relations row like any other block but is never
/// registered as a child, so parent-walk traversals never encounter it.
pub struct DbDagTopologyManager {
    relations_store: Arc<RelationsStore>,
}

impl DbDagTopologyManager {
    pub fn new(relations_store: Arc<RelationsStore>) -> Self {
        Self { relations_store }
    }

    /// `past(block) ∪ {block}` by a parent-walk.
    fn past_cone(&self, area: &StagingArea, block: Hash) -> ConsensusResult<BlockHashSet> {
        let mut cone = BlockHashSet::from([block]);
        let mut queue = VecDeque::from([block]);
        while let Some(current) = queue.pop_front() {
            for parent in self.relations_store.get(area, current)?.parents {
                if cone.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(cone)
    }

    /// `future(block)` by a child-walk, the block itself excluded.
    fn future_cone(&self, area: &StagingArea, block: Hash) -> ConsensusResult<BlockHashSet> {
        let mut future = BlockHashSet::new();
        let mut queue = VecDeque::from([block]);
        while let Some(current) = queue.pop_front() {
            for child in self.relations_store.get(area, current)?.children {
                if future.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        Ok(future)
    }
}

impl DagTopologyManager for DbDagTopologyManager {
    fn set_parents(&self, area: &mut StagingArea, block: Hash, parents: &[Hash]) -> ConsensusResult<()> {
        // children accumulated earlier survive, e.g. when a header-only
        // block is upgraded after other blocks already built on it
        let children =
            self.relations_store.get_optional(area, block)?.map(|relations| relations.children).unwrap_or_default();
        self.relations_store.stage(area, block, &BlockRelations { parents: parents.to_vec(), children })?;
        for &parent in parents {
            let mut relations = self.relations_store.get(area, parent)?;
            if !relations.children.contains(&block) {
                relations.children.push(block);
                self.relations_store.stage(area, parent, &relations)?;
            }
        }
        Ok(())
    }

    fn parents(&self, area: &StagingArea, block: Hash) -> ConsensusResult<Vec<Hash>> {
        Ok(self.relations_store.get(area, block)?.parents)
    }

    fn children(&self, area: &StagingArea, block: Hash) -> ConsensusResult<Vec<Hash>> {
        Ok(self.relations_store.get(area, block)?.children)
    }

    fn stage_virtual_parents(&self, area: &mut StagingArea, parents: &[Hash]) -> ConsensusResult<()> {
        let relations = BlockRelations { parents: parents.to_vec(), children: Vec::new() };
        Ok(self.relations_store.stage(area, VIRTUAL_BLOCK_HASH, &relations)?)
    }

    fn virtual_parents(&self, area: &StagingArea) -> ConsensusResult<Vec<Hash>> {
        Ok(self.relations_store.get(area, VIRTUAL_BLOCK_HASH)?.parents)
    }

    fn anticone(&self, area: &StagingArea, block: Hash) -> ConsensusResult<Vec<Hash>> {
        let cone = self.past_cone(area, block)?;
        let future = self.future_cone(area, block)?;
        let mut anticone = Vec::new();
        for hash in self.relations_store.all_hashes(area)? {
            if hash == VIRTUAL_BLOCK_HASH || cone.contains(&hash) || future.contains(&hash) {
                continue;
            }
            anticone.push(hash);
        }
        Ok(anticone)
    }
}
