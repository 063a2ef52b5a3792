//! Wires the store-backed managers, validator and processors together.

use std::sync::Arc;

use consensus_core::config::params::Params;
use database::Database;

use crate::consensus::storage::ConsensusStorage;
use crate::model::services::{
    BlockValidator, CoinbaseManager, DagTopologyManager, DepthManager, DifficultyManager,
    GhostdagManager, HeaderTipsManager, PastMedianTimeManager, PruningManager,
    ReachabilityService, SyncManager,
};
use crate::pipeline::{BlockProcessor, TemplateBuilder, VirtualProcessor};
use crate::processes::{
    DbDagTopologyManager, DbDepthManager, DbDifficultyManager, DbGhostdagManager,
    DbHeaderTipsManager, DbPastMedianTimeManager, DbPruningManager, DbReachabilityService,
    DbSyncManager, HalvingCoinbaseManager,
};
use crate::validation::DbBlockValidator;

/// Every manager and processor of one consensus instance, built over a
/// shared [`ConsensusStorage`]. The collaborators are held behind their
/// capability traits; the processors are concrete.
pub struct ConsensusServices {
    pub reachability_service: Arc<dyn ReachabilityService>,
    pub topology_manager: Arc<dyn DagTopologyManager>,
    pub ghostdag_manager: Arc<dyn GhostdagManager>,
    pub difficulty_manager: Arc<dyn DifficultyManager>,
    pub past_median_time_manager: Arc<dyn PastMedianTimeManager>,
    pub coinbase_manager: Arc<dyn CoinbaseManager>,
    pub depth_manager: Arc<dyn DepthManager>,
    pub header_tips_manager: Arc<dyn HeaderTipsManager>,
    pub sync_manager: Arc<dyn SyncManager>,
    pub pruning_manager: Arc<dyn PruningManager>,
    pub validator: Arc<dyn BlockValidator>,
    pub virtual_processor: Arc<VirtualProcessor>,
    pub block_processor: Arc<BlockProcessor>,
    pub template_builder: Arc<TemplateBuilder>,
}

impl ConsensusServices {
    pub fn new(db: Arc<Database>, params: &Params, storage: &ConsensusStorage) -> Self {
        let reachability_service: Arc<dyn ReachabilityService> = Arc::new(
            DbReachabilityService::new(storage.relations_store.clone(), storage.ghostdag_store.clone()),
        );
        let topology_manager: Arc<dyn DagTopologyManager> =
            Arc::new(DbDagTopologyManager::new(storage.relations_store.clone()));
        let ghostdag_manager: Arc<dyn GhostdagManager> = Arc::new(DbGhostdagManager::new(
            params.ghostdag_k,
            storage.header_store.clone(),
            storage.relations_store.clone(),
            storage.ghostdag_store.clone(),
            reachability_service.clone(),
        ));
        let difficulty_manager: Arc<dyn DifficultyManager> = Arc::new(DbDifficultyManager::new(
            params.genesis.bits,
            params.difficulty_window_size,
            params.target_time_per_block,
            ghostdag_manager.clone(),
            storage.ghostdag_store.clone(),
            storage.header_store.clone(),
        ));
        let past_median_time_manager: Arc<dyn PastMedianTimeManager> =
            Arc::new(DbPastMedianTimeManager::new(
                params.past_median_time_window_size,
                storage.header_store.clone(),
                storage.ghostdag_store.clone(),
            ));
        let coinbase_manager: Arc<dyn CoinbaseManager> = Arc::new(HalvingCoinbaseManager::new(
            params.deflationary_phase_daa_score,
            params.pre_deflationary_phase_base_subsidy,
            params.subsidy_halving_interval,
        ));
        let depth_manager: Arc<dyn DepthManager> = Arc::new(DbDepthManager::new(
            params.merge_depth,
            params.finality_depth,
            storage.ghostdag_store.clone(),
            storage.pruning_store.clone(),
            reachability_service.clone(),
        ));
        let header_tips_manager: Arc<dyn HeaderTipsManager> = Arc::new(DbHeaderTipsManager::new(
            storage.header_tips_store.clone(),
            storage.headers_selected_tip_store.clone(),
            storage.ghostdag_store.clone(),
            storage.relations_store.clone(),
        ));
        let sync_manager: Arc<dyn SyncManager> = Arc::new(DbSyncManager::new(
            storage.header_store.clone(),
            storage.block_store.clone(),
            storage.statuses_store.clone(),
            storage.relations_store.clone(),
            storage.ghostdag_store.clone(),
            storage.headers_selected_tip_store.clone(),
            reachability_service.clone(),
        ));
        let pruning_manager: Arc<dyn PruningManager> = Arc::new(DbPruningManager::new(
            storage.pruning_store.clone(),
            storage.statuses_store.clone(),
            reachability_service.clone(),
        ));
        let validator: Arc<dyn BlockValidator> = Arc::new(DbBlockValidator::new(
            params.max_block_parents,
            params.mergeset_size_limit,
            params.timestamp_deviation_tolerance,
            params.max_block_mass,
            params.mass_per_tx_byte,
            storage.statuses_store.clone(),
            difficulty_manager.clone(),
            past_median_time_manager.clone(),
            coinbase_manager.clone(),
            depth_manager.clone(),
        ));
        let virtual_processor = Arc::new(VirtualProcessor::new(
            ghostdag_manager.clone(),
            topology_manager.clone(),
            storage.ghostdag_store.clone(),
            storage.statuses_store.clone(),
            storage.acceptance_data_store.clone(),
            storage.utxo_diff_store.clone(),
            storage.virtual_utxo_store.clone(),
            storage.pruning_store.clone(),
        ));
        let block_processor = Arc::new(BlockProcessor::new(
            db,
            storage.block_store.clone(),
            storage.header_store.clone(),
            storage.statuses_store.clone(),
            storage.ghostdag_store.clone(),
            storage.pruning_store.clone(),
            storage.header_tips_store.clone(),
            validator.clone(),
            ghostdag_manager.clone(),
            topology_manager.clone(),
            header_tips_manager.clone(),
            pruning_manager.clone(),
            virtual_processor.clone(),
        ));
        let template_builder = Arc::new(TemplateBuilder::new(
            params.max_block_parents,
            storage.ghostdag_store.clone(),
            storage.pruning_store.clone(),
            topology_manager.clone(),
            ghostdag_manager.clone(),
            difficulty_manager.clone(),
            past_median_time_manager.clone(),
            coinbase_manager.clone(),
        ));

        Self {
            reachability_service,
            topology_manager,
            ghostdag_manager,
            difficulty_manager,
            past_median_time_manager,
            coinbase_manager,
            depth_manager,
            header_tips_manager,
            sync_manager,
            pruning_manager,
            validator,
            virtual_processor,
            block_processor,
            template_builder,
        }
    }
}
