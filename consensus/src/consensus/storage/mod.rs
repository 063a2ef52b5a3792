//! The set of stores the consensus service owns.

use std::sync::Arc;

use database::stores::{
    AcceptanceDataStore, BlockStore, GhostdagStore, HeaderStore, HeaderTipsStore,
    HeadersSelectedTipStore, PruningStore, RelationsStore, StatusStore, UtxoDiffStore,
    VirtualUtxoStore,
};
use database::Database;

/// One store per column family, all over the same database, shared with the
/// managers through `Arc`s.
pub struct ConsensusStorage {
    pub block_store: Arc<BlockStore>,
    pub header_store: Arc<HeaderStore>,
    pub statuses_store: Arc<StatusStore>,
    pub relations_store: Arc<RelationsStore>,
    pub ghostdag_store: Arc<GhostdagStore>,
    pub acceptance_data_store: Arc<AcceptanceDataStore>,
    pub utxo_diff_store: Arc<UtxoDiffStore>,
    pub virtual_utxo_store: Arc<VirtualUtxoStore>,
    pub pruning_store: Arc<PruningStore>,
    pub header_tips_store: Arc<HeaderTipsStore>,
    pub headers_selected_tip_store: Arc<HeadersSelectedTipStore>,
}

impl ConsensusStorage {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            block_store: Arc::new(BlockStore::new(db.clone())),
            header_store: Arc::new(HeaderStore::new(db.clone())),
            statuses_store: Arc::new(StatusStore::new(db.clone())),
            relations_store: Arc::new(RelationsStore::new(db.clone())),
            ghostdag_store: Arc::new(GhostdagStore::new(db.clone())),
            acceptance_data_store: Arc::new(AcceptanceDataStore::new(db.clone())),
            utxo_diff_store: Arc::new(UtxoDiffStore::new(db.clone())),
            virtual_utxo_store: Arc::new(VirtualUtxoStore::new(db.clone())),
            pruning_store: Arc::new(PruningStore::new(db.clone())),
            header_tips_store: Arc::new(HeaderTipsStore::new(db.clone())),
            headers_selected_tip_store: Arc::new(HeadersSelectedTipStore::new(db)),
        }
    }
}
