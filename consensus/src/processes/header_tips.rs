//! Header tip set maintenance.

use std::sync::Arc;

use consensus_core::Hash;
use database::stores::{GhostdagStore, HeaderTipsStore, HeadersSelectedTipStore, RelationsStore};
use database::StagingArea;

use crate::errors::ConsensusResult;
use crate::model::services::HeaderTipsManager;

/// Keeps the tip set (headers with no known children) and the headers
/// selected tip (the tip with the most blue work) current as blocks arrive.
pub struct DbHeaderTipsManager {
    header_tips_store: Arc<HeaderTipsStore>,
    headers_selected_tip_store: Arc<HeadersSelectedTipStore>,
    ghostdag_store: Arc<GhostdagStore>,
    relations_store: Arc<RelationsStore>,
}

impl DbHeaderTipsManager {
    pub fn new(
        header_tips_store: Arc<HeaderTipsStore>,
        headers_selected_tip_store: Arc<HeadersSelectedTipStore>,
        ghostdag_store: Arc<GhostdagStore>,
        relations_store: Arc<RelationsStore>,
    ) -> Self {
        Self { header_tips_store, headers_selected_tip_store, ghostdag_store, relations_store }
    }
}

impl HeaderTipsManager for DbHeaderTipsManager {
    fn add_header_tip(&self, area: &mut StagingArea, block: Hash) -> ConsensusResult<()> {
        for parent in self.relations_store.get(area, block)?.parents {
            if self.header_tips_store.has(area, parent)? {
                self.header_tips_store.stage_remove(area, parent);
            }
        }
        self.header_tips_store.stage_add(area, block);

        let block_work = self.ghostdag_store.get_blue_work(area, block)?;
        let advance = match self.headers_selected_tip_store.get(area)? {
            Some(tip) => (block_work, block) > (self.ghostdag_store.get_blue_work(area, tip)?, tip),
            None => true,
        };
        if advance {
            self.headers_selected_tip_store.stage(area, block)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::ghostdag::GhostdagData;
    use consensus_core::{BlockHashMap, ZERO_HASH};
    use database::stores::BlockRelations;
    use database::Database;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        db: Arc<Database>,
        relations: Arc<RelationsStore>,
        ghostdag_store: Arc<GhostdagStore>,
        tips_store: Arc<HeaderTipsStore>,
        selected_tip_store: Arc<HeadersSelectedTipStore>,
        manager: DbHeaderTipsManager,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let db = Arc::new(Database::open(tmp.path()).unwrap());
            let relations = Arc::new(RelationsStore::new(db.clone()));
            let ghostdag_store = Arc::new(GhostdagStore::new(db.clone()));
            let tips_store = Arc::new(HeaderTipsStore::new(db.clone()));
            let selected_tip_store = Arc::new(HeadersSelectedTipStore::new(db.clone()));
            let manager = DbHeaderTipsManager::new(
                tips_store.clone(),
                selected_tip_store.clone(),
                ghostdag_store.clone(),
                relations.clone(),
            );
            Self { _tmp: tmp, db, relations, ghostdag_store, tips_store, selected_tip_store, manager }
        }

        fn add(&self, area: &mut StagingArea, block: Hash, parents: Vec<Hash>, blue_work: u128) {
            self.relations.stage(area, block, &BlockRelations { parents, children: vec![] }).unwrap();
            let data = GhostdagData::new(0, blue_work, ZERO_HASH, vec![], vec![], BlockHashMap::new());
            self.ghostdag_store.stage(area, block, &data).unwrap();
        }
    }

    #[test]
    fn test_tips_retire_their_parents() {
        let fx = Fixture::new();
        let g = Hash::from_le_u64([1, 0, 0, 0]);
        let a = Hash::from_le_u64([2, 0, 0, 0]);
        let b = Hash::from_le_u64([3, 0, 0, 0]);

        let mut area = StagingArea::new();
        fx.add(&mut area, g, vec![], 0);
        fx.manager.add_header_tip(&mut area, g).unwrap();
        fx.add(&mut area, a, vec![g], 2);
        fx.manager.add_header_tip(&mut area, a).unwrap();
        fx.add(&mut area, b, vec![g], 2);
        fx.manager.add_header_tip(&mut area, b).unwrap();
        area.commit(&fx.db).unwrap();

        // g was retired when a arrived; a and b sit side by side
        let area = StagingArea::new();
        assert_eq!(fx.tips_store.tips(&area).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_selected_tip_advances_by_work_then_hash() {
        let fx = Fixture::new();
        let g = Hash::from_le_u64([1, 0, 0, 0]);
        let heavy = Hash::from_le_u64([2, 0, 0, 0]);
        let light = Hash::from_le_u64([3, 0, 0, 0]);

        let mut area = StagingArea::new();
        fx.add(&mut area, g, vec![], 0);
        fx.manager.add_header_tip(&mut area, g).unwrap();
        assert_eq!(fx.selected_tip_store.get(&area).unwrap(), Some(g));

        fx.add(&mut area, heavy, vec![g], 10);
        fx.manager.add_header_tip(&mut area, heavy).unwrap();
        assert_eq!(fx.selected_tip_store.get(&area).unwrap(), Some(heavy));

        // lower work never displaces the selected tip, even from a new tip
        fx.add(&mut area, light, vec![g], 4);
        fx.manager.add_header_tip(&mut area, light).unwrap();
        assert_eq!(fx.selected_tip_store.get(&area).unwrap(), Some(heavy));
        assert_eq!(fx.tips_store.tips(&area).unwrap(), vec![heavy, light]);
    }
}
