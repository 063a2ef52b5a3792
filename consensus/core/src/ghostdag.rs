use serde::{Deserialize, Serialize};

use crate::{BlockHashMap, BlueWorkType, Hash, KType, ZERO_HASH};

/// Represents GHOSTDAG data computed for a block.
///
/// The mergeset is the block's past minus its selected parent's past, minus
/// the selected parent itself. Blues are the mergeset members admitted into
/// the k-cluster, reds the rest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostdagData {
    /// Number of blue blocks in this block's past, the block itself excluded.
    pub blue_score: u64,
    /// Accumulated work of the blue past.
    pub blue_work: BlueWorkType,
    /// Parent with the highest blue work, ties broken by higher hash.
    pub selected_parent: Hash,
    /// Mergeset blues in consensus order, selected parent first.
    pub mergeset_blues: Vec<Hash>,
    /// Mergeset reds in consensus order.
    pub mergeset_reds: Vec<Hash>,
    /// For each mergeset blue, the size of its anticone restricted to blues.
    pub blues_anticone_sizes: BlockHashMap<KType>,
}

impl GhostdagData {
    pub fn new(
        blue_score: u64,
        blue_work: BlueWorkType,
        selected_parent: Hash,
        mergeset_blues: Vec<Hash>,
        mergeset_reds: Vec<Hash>,
        blues_anticone_sizes: BlockHashMap<KType>,
    ) -> Self {
        Self { blue_score, blue_work, selected_parent, mergeset_blues, mergeset_reds, blues_anticone_sizes }
    }

    /// Data of the genesis block: empty past, no selected parent.
    pub fn new_genesis() -> Self {
        Self {
            blue_score: 0,
            blue_work: 0,
            selected_parent: ZERO_HASH,
            mergeset_blues: Vec::new(),
            mergeset_reds: Vec::new(),
            blues_anticone_sizes: BlockHashMap::new(),
        }
    }

    /// Seed data for a block whose coloring is about to run: the selected
    /// parent is the first mergeset blue, scores are filled in at the end.
    pub fn new_with_selected_parent(selected_parent: Hash, k: KType) -> Self {
        let mut mergeset_blues = Vec::with_capacity(k as usize + 1);
        let mut blues_anticone_sizes = BlockHashMap::with_capacity(k as usize);
        mergeset_blues.push(selected_parent);
        blues_anticone_sizes.insert(selected_parent, 0);
        Self {
            blue_score: 0,
            blue_work: 0,
            selected_parent,
            mergeset_blues,
            mergeset_reds: Vec::new(),
            blues_anticone_sizes,
        }
    }

    pub fn has_selected_parent(&self) -> bool {
        self.selected_parent != ZERO_HASH
    }

    pub fn mergeset_size(&self) -> usize {
        self.mergeset_blues.len() + self.mergeset_reds.len()
    }

    /// Admits a block into the blue set, recording its blue anticone size and
    /// bumping the size of every affected blue already in the cluster. The
    /// bumped values shadow older chain data during later lookups.
    pub fn add_blue(&mut self, block: Hash, blue_anticone_size: KType, affected_blues: &BlockHashMap<KType>) {
        self.mergeset_blues.push(block);
        self.blues_anticone_sizes.insert(block, blue_anticone_size);
        for (blue, size) in affected_blues {
            self.blues_anticone_sizes.insert(*blue, size + 1);
        }
    }

    pub fn add_red(&mut self, block: Hash) {
        self.mergeset_reds.push(block);
    }

    /// Fills in the scores once the mergeset coloring is complete.
    pub fn finalize_score_and_work(&mut self, blue_score: u64, blue_work: BlueWorkType) {
        self.blue_score = blue_score;
        self.blue_work = blue_work;
    }

    /// All mergeset members, blues first, without a merged ordering.
    pub fn unordered_mergeset(&self) -> impl Iterator<Item = Hash> + '_ {
        self.mergeset_blues.iter().chain(self.mergeset_reds.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_data() {
        let data = GhostdagData::new_genesis();
        assert_eq!(data.blue_score, 0);
        assert_eq!(data.blue_work, 0);
        assert!(!data.has_selected_parent());
        assert_eq!(data.mergeset_size(), 0);
    }

    #[test]
    fn test_add_blue_bumps_affected_anticone_sizes() {
        let sp = Hash::from_le_u64([1, 0, 0, 0]);
        let blue = Hash::from_le_u64([2, 0, 0, 0]);
        let mut data = GhostdagData::new_with_selected_parent(sp, 18);
        assert_eq!(data.mergeset_blues, vec![sp]);

        let mut affected = BlockHashMap::new();
        affected.insert(sp, 0);
        data.add_blue(blue, 1, &affected);

        assert_eq!(data.mergeset_blues, vec![sp, blue]);
        assert_eq!(data.blues_anticone_sizes[&blue], 1);
        // the selected parent gained the new blue in its anticone count
        assert_eq!(data.blues_anticone_sizes[&sp], 1);
    }

    #[test]
    fn test_mergeset_iteration_order() {
        let sp = Hash::from_le_u64([1, 0, 0, 0]);
        let blue = Hash::from_le_u64([2, 0, 0, 0]);
        let red = Hash::from_le_u64([3, 0, 0, 0]);
        let data = GhostdagData::new(5, 100, sp, vec![sp, blue], vec![red], BlockHashMap::new());
        let mergeset: Vec<_> = data.unordered_mergeset().collect();
        assert_eq!(mergeset, vec![sp, blue, red]);
    }
}
