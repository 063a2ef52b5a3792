//! Past median time over the selected parent chain.

use std::sync::Arc;

use consensus_core::Hash;
use database::stores::{GhostdagStore, HeaderStore};
use database::StagingArea;

use crate::errors::ConsensusResult;
use crate::model::services::PastMedianTimeManager;

/// Median of the most recent window of timestamps along the selected parent
/// chain. An underfull window (a young chain) takes the median of whatever
/// exists.
pub struct DbPastMedianTimeManager {
    window_size: usize,
    header_store: Arc<HeaderStore>,
    ghostdag_store: Arc<GhostdagStore>,
}

impl DbPastMedianTimeManager {
    pub fn new(window_size: usize, header_store: Arc<HeaderStore>, ghostdag_store: Arc<GhostdagStore>) -> Self {
        Self { window_size, header_store, ghostdag_store }
    }
}

impl PastMedianTimeManager for DbPastMedianTimeManager {
    fn past_median_time(&self, area: &StagingArea, chain_start: Hash) -> ConsensusResult<u64> {
        let mut timestamps = Vec::with_capacity(self.window_size);
        let mut current = chain_start;
        loop {
            timestamps.push(self.header_store.get(area, current)?.timestamp);
            if timestamps.len() == self.window_size {
                break;
            }
            let data = self.ghostdag_store.get(area, current)?;
            if !data.has_selected_parent() {
                break;
            }
            current = data.selected_parent;
        }
        timestamps.sort_unstable();
        Ok(timestamps[timestamps.len() / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::ghostdag::GhostdagData;
    use consensus_core::header::Header;
    use consensus_core::{BlockHashMap, ZERO_HASH};
    use database::Database;
    use tempfile::TempDir;

    fn stage_chain_block(
        header_store: &HeaderStore,
        ghostdag_store: &GhostdagStore,
        area: &mut StagingArea,
        hash: Hash,
        sp: Hash,
        timestamp: u64,
    ) {
        let header = Header {
            hash,
            version: 1,
            parents: vec![],
            hash_merkle_root: ZERO_HASH,
            utxo_commitment: ZERO_HASH,
            timestamp,
            bits: 0x207fffff,
            nonce: 0,
            daa_score: 0,
            blue_score: 0,
            blue_work: 0,
            pruning_point: ZERO_HASH,
        };
        header_store.stage(area, &header).unwrap();
        let data = GhostdagData::new(0, 0, sp, vec![], vec![], BlockHashMap::new());
        ghostdag_store.stage(area, hash, &data).unwrap();
    }

    #[test]
    fn test_median_over_a_full_window() {
        let tmp = TempDir::new().unwrap();
        let db = Arc::new(Database::open(tmp.path()).unwrap());
        let header_store = Arc::new(HeaderStore::new(db.clone()));
        let ghostdag_store = Arc::new(GhostdagStore::new(db.clone()));
        let manager = DbPastMedianTimeManager::new(3, header_store.clone(), ghostdag_store.clone());

        // chain with shuffled timestamps; the median ignores insertion order
        let hashes: Vec<Hash> = (1..=5).map(|i| Hash::from_le_u64([i, 0, 0, 0])).collect();
        let timestamps = [10, 50, 30, 20, 40];
        let mut area = StagingArea::new();
        let mut sp = ZERO_HASH;
        for (&hash, &timestamp) in hashes.iter().zip(timestamps.iter()) {
            stage_chain_block(&header_store, &ghostdag_store, &mut area, hash, sp, timestamp);
            sp = hash;
        }
        area.commit(&db).unwrap();

        // window from the tip: [40, 20, 30] -> median 30
        let area = StagingArea::new();
        assert_eq!(manager.past_median_time(&area, hashes[4]).unwrap(), 30);
        // window from the middle: [30, 50, 10] -> median 30
        assert_eq!(manager.past_median_time(&area, hashes[2]).unwrap(), 30);
    }

    #[test]
    fn test_underfull_window_takes_what_exists() {
        let tmp = TempDir::new().unwrap();
        let db = Arc::new(Database::open(tmp.path()).unwrap());
        let header_store = Arc::new(HeaderStore::new(db.clone()));
        let ghostdag_store = Arc::new(GhostdagStore::new(db.clone()));
        let manager = DbPastMedianTimeManager::new(11, header_store.clone(), ghostdag_store.clone());

        let g = Hash::from_le_u64([1, 0, 0, 0]);
        let a = Hash::from_le_u64([2, 0, 0, 0]);
        let mut area = StagingArea::new();
        stage_chain_block(&header_store, &ghostdag_store, &mut area, g, ZERO_HASH, 100);
        stage_chain_block(&header_store, &ghostdag_store, &mut area, a, g, 200);

        assert_eq!(manager.past_median_time(&area, a).unwrap(), 200);
        assert_eq!(manager.past_median_time(&area, g).unwrap(), 100);
    }
}
