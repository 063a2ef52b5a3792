//! Store-backed implementations of the domain manager traits.

pub mod coinbase;
pub mod depth;
pub mod difficulty;
pub mod ghostdag;
pub mod header_tips;
pub mod past_median_time;
pub mod pruning;
pub mod reachability;
pub mod sync;
pub mod topology;

pub use coinbase::HalvingCoinbaseManager;
pub use depth::DbDepthManager;
pub use difficulty::DbDifficultyManager;
pub use ghostdag::DbGhostdagManager;
pub use header_tips::DbHeaderTipsManager;
pub use past_median_time::DbPastMedianTimeManager;
pub use pruning::DbPruningManager;
pub use reachability::DbReachabilityService;
pub use sync::DbSyncManager;
pub use topology::DbDagTopologyManager;
