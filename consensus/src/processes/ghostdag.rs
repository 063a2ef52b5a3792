//! The GHOSTDAG k-cluster coloring protocol.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::Arc;

use consensus_core::ghostdag::GhostdagData;
use consensus_core::{BlockHashMap, BlockHashSet, Hash, KType, ZERO_HASH};
use database::stores::{GhostdagStore, HeaderStore, RelationsStore};
use database::{DbError, StagingArea};

use crate::errors::ConsensusResult;
use crate::model::services::{GhostdagManager, ReachabilityService};
use crate::processes::difficulty::calc_block_work;

/// Verdict for one mergeset candidate: blue with its blue anticone size and
/// the chain blues whose own anticone it enlarges, or red.
enum ColoringOutput {
    Blue(KType, BlockHashMap<KType>),
    Red,
}

/// Runs GHOSTDAG over the stored DAG.
///
/// For a block B and its parents, the selected parent is the parent with the
/// highest blue work; the mergeset is `past(B)` minus the selected parent's
/// past; each mergeset member is colored blue if admitting it keeps every
/// blue block's blue anticone within k, red otherwise.
pub struct DbGhostdagManager {
    k: KType,
    header_store: Arc<HeaderStore>,
    relations_store: Arc<RelationsStore>,
    ghostdag_store: Arc<GhostdagStore>,
    reachability: Arc<dyn ReachabilityService>,
}

impl DbGhostdagManager {
    pub fn new(
        k: KType,
        header_store: Arc<HeaderStore>,
        relations_store: Arc<RelationsStore>,
        ghostdag_store: Arc<GhostdagStore>,
        reachability: Arc<dyn ReachabilityService>,
    ) -> Self {
        Self { k, header_store, relations_store, ghostdag_store, reachability }
    }

    /// The mergeset minus the selected parent, ordered by ascending
    /// (blue work, hash). A parent-walk from the remaining parents that
    /// stops at anything already in the selected parent's past.
    fn ordered_mergeset_without_selected_parent(
        &self,
        area: &StagingArea,
        selected_parent: Hash,
        parents: &[Hash],
    ) -> ConsensusResult<Vec<Hash>> {
        let mut mergeset: BlockHashSet = parents.iter().copied().filter(|&parent| parent != selected_parent).collect();
        let mut queue: VecDeque<Hash> = mergeset.iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            for parent in self.relations_store.get(area, current)?.parents {
                if mergeset.contains(&parent)
                    || parent == selected_parent
                    || self.reachability.is_dag_ancestor_of(area, parent, selected_parent)?
                {
                    continue;
                }
                mergeset.insert(parent);
                queue.push_back(parent);
            }
        }

        let mut keyed: Vec<(u128, Hash)> = Vec::with_capacity(mergeset.len());
        for hash in mergeset {
            keyed.push((self.ghostdag_store.get_blue_work(area, hash)?, hash));
        }
        keyed.sort_unstable();
        Ok(keyed.into_iter().map(|(_, hash)| hash).collect())
    }

    /// The size of `block`'s blue anticone as known to `context`: the walk
    /// descends the chain from the context until some blue set records the
    /// block, honoring the copy-on-write bumps newer data carries.
    fn blue_anticone_size(&self, area: &StagingArea, block: Hash, context: &GhostdagData) -> ConsensusResult<KType> {
        let mut current_sizes = Cow::Borrowed(&context.blues_anticone_sizes);
        let mut current_selected_parent = context.selected_parent;
        loop {
            if let Some(size) = current_sizes.get(&block) {
                return Ok(*size);
            }
            if current_selected_parent == ZERO_HASH {
                return Err(
                    DbError::InvalidData(format!("block {} is not blue along the walked chain", block)).into()
                );
            }
            let data = self.ghostdag_store.get(area, current_selected_parent)?;
            current_selected_parent = data.selected_parent;
            current_sizes = Cow::Owned(data.blues_anticone_sizes);
        }
    }

    fn check_blue_candidate(
        &self,
        area: &StagingArea,
        new_block_data: &GhostdagData,
        blue_candidate: Hash,
    ) -> ConsensusResult<ColoringOutput> {
        // a full blue mergeset (selected parent plus k) admits no more
        if new_block_data.mergeset_blues.len() as KType == self.k + 1 {
            return Ok(ColoringOutput::Red);
        }

        let mut candidate_blues_anticone_sizes: BlockHashMap<KType> = BlockHashMap::with_capacity(self.k as usize);
        let mut candidate_blue_anticone_size: KType = 0;

        // walk down the prospective selected chain, starting at the block
        // under construction (which has no hash yet)
        let mut chain_hash: Option<Hash> = None;
        let mut chain_data: Cow<'_, GhostdagData> = Cow::Borrowed(new_block_data);
        loop {
            // a chain block in the candidate's past puts every remaining
            // blue in the candidate's past as well: the count is complete
            if let Some(hash) = chain_hash {
                if self.reachability.is_dag_ancestor_of(area, hash, blue_candidate)? {
                    return Ok(ColoringOutput::Blue(candidate_blue_anticone_size, candidate_blues_anticone_sizes));
                }
            }

            for &block in chain_data.mergeset_blues.iter() {
                // blues in the candidate's past are not in its anticone
                if self.reachability.is_dag_ancestor_of(area, block, blue_candidate)? {
                    continue;
                }
                let block_anticone_size = self.blue_anticone_size(area, block, new_block_data)?;
                candidate_blues_anticone_sizes.insert(block, block_anticone_size);
                candidate_blue_anticone_size += 1;
                if candidate_blue_anticone_size > self.k {
                    // the candidate's own blue anticone exceeded k
                    return Ok(ColoringOutput::Red);
                }
                if block_anticone_size == self.k {
                    // this blue's anticone is already full; the candidate
                    // would overflow it
                    return Ok(ColoringOutput::Red);
                }
            }

            if !chain_data.has_selected_parent() {
                break;
            }
            let next = chain_data.selected_parent;
            chain_data = Cow::Owned(self.ghostdag_store.get(area, next)?);
            chain_hash = Some(next);
        }
        Ok(ColoringOutput::Blue(candidate_blue_anticone_size, candidate_blues_anticone_sizes))
    }
}

impl GhostdagManager for DbGhostdagManager {
    fn genesis_ghostdag_data(&self) -> GhostdagData {
        GhostdagData::new_genesis()
    }

    fn find_selected_parent(&self, area: &StagingArea, parents: &[Hash]) -> ConsensusResult<Hash> {
        let mut best: Option<(u128, Hash)> = None;
        for &parent in parents {
            let candidate = (self.ghostdag_store.get_blue_work(area, parent)?, parent);
            if best.map_or(true, |current| candidate > current) {
                best = Some(candidate);
            }
        }
        best.map(|(_, hash)| hash)
            .ok_or_else(|| DbError::InvalidData("selected parent requested over an empty parent list".to_string()).into())
    }

    fn ghostdag(&self, area: &StagingArea, parents: &[Hash]) -> ConsensusResult<GhostdagData> {
        let selected_parent = self.find_selected_parent(area, parents)?;
        let mut new_block_data = GhostdagData::new_with_selected_parent(selected_parent, self.k);

        for blue_candidate in self.ordered_mergeset_without_selected_parent(area, selected_parent, parents)? {
            match self.check_blue_candidate(area, &new_block_data, blue_candidate)? {
                ColoringOutput::Blue(candidate_anticone_size, affected_blues) => {
                    new_block_data.add_blue(blue_candidate, candidate_anticone_size, &affected_blues);
                }
                ColoringOutput::Red => new_block_data.add_red(blue_candidate),
            }
        }

        let blue_score =
            self.ghostdag_store.get_blue_score(area, selected_parent)? + new_block_data.mergeset_blues.len() as u64;
        let mut blue_work = self.ghostdag_store.get_blue_work(area, selected_parent)?;
        for &blue in new_block_data.mergeset_blues.iter() {
            blue_work += calc_block_work(self.header_store.get(area, blue)?.bits);
        }
        new_block_data.finalize_score_and_work(blue_score, blue_work);
        Ok(new_block_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processes::reachability::DbReachabilityService;
    use consensus_core::header::Header;
    use database::stores::BlockRelations;
    use database::Database;
    use tempfile::TempDir;

    const SIMNET_BITS: u32 = 0x207fffff;

    fn test_header(hash: Hash, parents: Vec<Hash>) -> Header {
        Header {
            hash,
            version: 1,
            parents,
            hash_merkle_root: ZERO_HASH,
            utxo_commitment: ZERO_HASH,
            timestamp: 0,
            bits: SIMNET_BITS,
            nonce: 0,
            daa_score: 0,
            blue_score: 0,
            blue_work: 0,
            pruning_point: ZERO_HASH,
        }
    }

    struct Fixture {
        _tmp: TempDir,
        relations: Arc<RelationsStore>,
        ghostdag_store: Arc<GhostdagStore>,
        header_store: Arc<HeaderStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let db = Arc::new(Database::open(tmp.path()).unwrap());
            Self {
                _tmp: tmp,
                relations: Arc::new(RelationsStore::new(db.clone())),
                ghostdag_store: Arc::new(GhostdagStore::new(db.clone())),
                header_store: Arc::new(HeaderStore::new(db)),
            }
        }

        fn manager(&self, k: KType) -> DbGhostdagManager {
            let reachability =
                Arc::new(DbReachabilityService::new(self.relations.clone(), self.ghostdag_store.clone()));
            DbGhostdagManager::new(
                k,
                self.header_store.clone(),
                self.relations.clone(),
                self.ghostdag_store.clone(),
                reachability,
            )
        }

        fn genesis(&self, area: &mut StagingArea, manager: &DbGhostdagManager, hash: Hash) {
            self.header_store.stage(area, &test_header(hash, vec![])).unwrap();
            self.relations.stage(area, hash, &BlockRelations::default()).unwrap();
            self.ghostdag_store.stage(area, hash, &manager.genesis_ghostdag_data()).unwrap();
        }

        fn insert(
            &self,
            area: &mut StagingArea,
            manager: &DbGhostdagManager,
            hash: Hash,
            parents: Vec<Hash>,
        ) -> GhostdagData {
            self.header_store.stage(area, &test_header(hash, parents.clone())).unwrap();
            self.relations.stage(area, hash, &BlockRelations { parents: parents.clone(), children: vec![] }).unwrap();
            let data = manager.ghostdag(area, &parents).unwrap();
            self.ghostdag_store.stage(area, hash, &data).unwrap();
            data
        }
    }

    #[test]
    fn test_chain_accumulates_score_and_work() {
        let fx = Fixture::new();
        let manager = fx.manager(10);
        let g = Hash::from_le_u64([1, 0, 0, 0]);
        let a = Hash::from_le_u64([2, 0, 0, 0]);
        let b = Hash::from_le_u64([3, 0, 0, 0]);

        let mut area = StagingArea::new();
        fx.genesis(&mut area, &manager, g);
        let data_a = fx.insert(&mut area, &manager, a, vec![g]);
        let data_b = fx.insert(&mut area, &manager, b, vec![a]);

        assert_eq!(data_a.selected_parent, g);
        assert_eq!(data_a.blue_score, 1);
        assert_eq!(data_a.mergeset_blues, vec![g]);
        // simnet bits cost two expected attempts per block
        assert_eq!(data_a.blue_work, 2);
        assert_eq!(data_b.blue_score, 2);
        assert_eq!(data_b.blue_work, 4);
    }

    #[test]
    fn test_selected_parent_prefers_work_then_hash() {
        let fx = Fixture::new();
        let manager = fx.manager(10);
        let low = Hash::from_le_u64([9, 0, 0, 0]);
        let high = Hash::from_le_u64([1, 0, 0, 0]);

        let mut area = StagingArea::new();
        let mut heavy = GhostdagData::new_genesis();
        heavy.finalize_score_and_work(5, 100);
        fx.ghostdag_store.stage(&mut area, high, &heavy).unwrap();
        let mut light = GhostdagData::new_genesis();
        light.finalize_score_and_work(5, 40);
        fx.ghostdag_store.stage(&mut area, low, &light).unwrap();

        // more blue work wins despite the lower hash
        assert_eq!(manager.find_selected_parent(&area, &[low, high]).unwrap(), high);

        // equal work: the higher hash wins
        fx.ghostdag_store.stage(&mut area, low, &heavy).unwrap();
        assert_eq!(manager.find_selected_parent(&area, &[low, high]).unwrap(), low);
    }

    #[test]
    fn test_fork_merges_both_sides_blue() {
        let fx = Fixture::new();
        let manager = fx.manager(10);
        let g = Hash::from_le_u64([1, 0, 0, 0]);
        let a = Hash::from_le_u64([2, 0, 0, 0]);
        let b = Hash::from_le_u64([3, 0, 0, 0]);
        let c = Hash::from_le_u64([4, 0, 0, 0]);

        let mut area = StagingArea::new();
        fx.genesis(&mut area, &manager, g);
        fx.insert(&mut area, &manager, a, vec![g]);
        fx.insert(&mut area, &manager, b, vec![g]);
        let data_c = fx.insert(&mut area, &manager, c, vec![a, b]);

        // equal work, so the higher hash becomes the selected parent
        assert_eq!(data_c.selected_parent, b);
        assert_eq!(data_c.mergeset_blues, vec![b, a]);
        assert!(data_c.mergeset_reds.is_empty());
        assert_eq!(data_c.blue_score, 3);
        // a and b sit in each other's blue anticone
        assert_eq!(data_c.blues_anticone_sizes[&a], 1);
        assert_eq!(data_c.blues_anticone_sizes[&b], 1);
    }

    #[test]
    fn test_k_cluster_violation_turns_red() {
        let fx = Fixture::new();
        let manager = fx.manager(1);
        let g = Hash::from_le_u64([1, 0, 0, 0]);
        let a = Hash::from_le_u64([2, 0, 0, 0]);
        let b = Hash::from_le_u64([3, 0, 0, 0]);
        let c = Hash::from_le_u64([4, 0, 0, 0]);
        let d = Hash::from_le_u64([5, 0, 0, 0]);

        // three parallel blocks over genesis cannot all be blue with k = 1
        let mut area = StagingArea::new();
        fx.genesis(&mut area, &manager, g);
        fx.insert(&mut area, &manager, a, vec![g]);
        fx.insert(&mut area, &manager, b, vec![g]);
        fx.insert(&mut area, &manager, c, vec![g]);
        let data_d = fx.insert(&mut area, &manager, d, vec![a, b, c]);

        assert_eq!(data_d.selected_parent, c);
        assert_eq!(data_d.mergeset_blues, vec![c, a]);
        assert_eq!(data_d.mergeset_reds, vec![b]);
        assert_eq!(data_d.blue_score, 3);
    }

    #[test]
    fn test_same_parents_give_identical_data() {
        let fx = Fixture::new();
        let manager = fx.manager(10);
        let g = Hash::from_le_u64([1, 0, 0, 0]);
        let a = Hash::from_le_u64([2, 0, 0, 0]);
        let b = Hash::from_le_u64([3, 0, 0, 0]);

        let mut area = StagingArea::new();
        fx.genesis(&mut area, &manager, g);
        fx.insert(&mut area, &manager, a, vec![g]);
        fx.insert(&mut area, &manager, b, vec![g]);

        let first = manager.ghostdag(&area, &[a, b]).unwrap();
        let second = manager.ghostdag(&area, &[a, b]).unwrap();
        assert_eq!(first, second);
    }
}
