//! Capability traits of the domain managers.
//!
//! Each manager is consumed through a trait so components depend on the
//! capability, not the concrete store-backed implementation. Production
//! implementations live in [`crate::processes`]; tests substitute doubles
//! where a scenario calls for it.

use crate::errors::ConsensusResult;
use consensus_core::api::SyncInfo;
use consensus_core::block::Block;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::header::Header;
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionOutpoint, UtxoEntry};
use consensus_core::Hash;
use database::StagingArea;

/// Runs the GHOSTDAG coloring protocol.
pub trait GhostdagManager: Send + Sync {
    /// Data of the genesis block: empty past, no selected parent.
    fn genesis_ghostdag_data(&self) -> GhostdagData;

    /// The parent with the highest blue work, ties broken by higher hash.
    fn find_selected_parent(&self, area: &StagingArea, parents: &[Hash]) -> ConsensusResult<Hash>;

    /// Full GHOSTDAG data for a block with the given parents: selected
    /// parent, ordered mergeset coloring, blue score and blue work.
    fn ghostdag(&self, area: &StagingArea, parents: &[Hash]) -> ConsensusResult<GhostdagData>;
}

/// Ancestry queries over the DAG.
pub trait ReachabilityService: Send + Sync {
    /// Whether `ancestor` is in `past(descendant) ∪ {descendant}`.
    fn is_dag_ancestor_of(&self, area: &StagingArea, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool>;

    /// Whether `ancestor` lies on the selected parent chain of `descendant`
    /// (or is `descendant` itself).
    fn is_chain_ancestor_of(&self, area: &StagingArea, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool>;
}

/// Maintains parent/child relations.
pub trait DagTopologyManager: Send + Sync {
    /// Writes the block's relations row and registers it as a child of each
    /// of its parents.
    fn set_parents(&self, area: &mut StagingArea, block: Hash, parents: &[Hash]) -> ConsensusResult<()>;

    fn parents(&self, area: &StagingArea, block: Hash) -> ConsensusResult<Vec<Hash>>;

    fn children(&self, area: &StagingArea, block: Hash) -> ConsensusResult<Vec<Hash>>;

    /// Rewrites the virtual block's parents. The virtual is not registered
    /// as a child of anything; it is not a real block.
    fn stage_virtual_parents(&self, area: &mut StagingArea, parents: &[Hash]) -> ConsensusResult<()>;

    fn virtual_parents(&self, area: &StagingArea) -> ConsensusResult<Vec<Hash>>;

    /// Blocks neither in the past nor in the future of `block`, the virtual
    /// excluded.
    fn anticone(&self, area: &StagingArea, block: Hash) -> ConsensusResult<Vec<Hash>>;
}

/// Computes the difficulty a new block must carry.
pub trait DifficultyManager: Send + Sync {
    /// Compact difficulty bits required for a block over `parents`, from a
    /// retarget window along the selected parent lineage. While the window
    /// is underfull the genesis difficulty applies.
    fn required_bits(&self, area: &StagingArea, parents: &[Hash]) -> ConsensusResult<u32>;
}

/// Median timestamp over the recent selected parent chain.
pub trait PastMedianTimeManager: Send + Sync {
    /// Median of the last window timestamps along the selected parent chain
    /// beginning at `chain_start` (inclusive).
    fn past_median_time(&self, area: &StagingArea, chain_start: Hash) -> ConsensusResult<u64>;
}

/// Builds and checks coinbase transactions.
pub trait CoinbaseManager: Send + Sync {
    /// Subsidy a coinbase may mint at the given daa score.
    fn block_subsidy(&self, daa_score: u64) -> u64;

    /// The coinbase transaction for a block template paying `miner_script`.
    fn expected_coinbase(&self, daa_score: u64, miner_script: ScriptPublicKey) -> Transaction;

    /// Structural coinbase rules for a body-carrying block: the first
    /// transaction is a coinbase and no other transaction is.
    fn validate_coinbase(&self, block: &Block) -> ConsensusResult<()>;
}

/// Depth-based rules: bounded merge depth, finality, pruning point.
pub trait DepthManager: Send + Sync {
    /// Every red of the block's mergeset must be in the future of the
    /// block's merge depth root.
    fn check_bounded_merge_depth(&self, area: &StagingArea, block: Hash, data: &GhostdagData) -> ConsensusResult<()>;

    /// The block must have the virtual's finality point in its past.
    fn check_finality(&self, area: &StagingArea, block: Hash, data: &GhostdagData) -> ConsensusResult<()>;

    /// No parent may sit in the pruning point's past, and the header must
    /// name the expected pruning point.
    fn check_pruning_point_rules(&self, area: &StagingArea, header: &Header) -> ConsensusResult<()>;
}

/// Maintains the header tip set and the headers selected tip.
pub trait HeaderTipsManager: Send + Sync {
    /// Adds the block as a tip, retires its parents from the tip set and
    /// advances the headers selected tip when the block carries more blue
    /// work.
    fn add_header_tip(&self, area: &mut StagingArea, block: Hash) -> ConsensusResult<()>;
}

/// Sync-oriented queries a peer manager asks.
pub trait SyncManager: Send + Sync {
    fn get_sync_info(&self, area: &StagingArea) -> ConsensusResult<SyncInfo>;

    /// Exponentially spaced selected-chain hashes from `high` down to `low`.
    /// `limit` of zero means unbounded.
    fn create_block_locator(&self, area: &StagingArea, low: Hash, high: Hash, limit: usize)
        -> ConsensusResult<Vec<Hash>>;

    /// Header-only blocks in `past(high) ∪ {high}`, parents before children.
    fn get_missing_block_body_hashes(&self, area: &StagingArea, high: Hash) -> ConsensusResult<Vec<Hash>>;
}

/// Pruning point queries and import bookkeeping.
pub trait PruningManager: Send + Sync {
    /// Whether `hash` is the current pruning point or a selected-chain
    /// ancestor of it.
    fn is_valid_pruning_point(&self, area: &StagingArea, hash: Hash) -> ConsensusResult<bool>;

    /// The committed imported UTXO set, in outpoint order.
    fn imported_utxo_set(&self) -> ConsensusResult<Vec<(TransactionOutpoint, UtxoEntry)>>;

    /// Commitment hash of the committed imported UTXO set.
    fn imported_utxo_commitment(&self) -> ConsensusResult<Hash>;
}

/// The four validation stages of the insertion pipeline.
pub trait BlockValidator: Send + Sync {
    /// Checks needing no DAG state: version, parent list sanity, timestamp
    /// not too far in the future, submission mode consistency.
    fn validate_header_in_isolation(&self, block: &Block, is_header_only: bool, now: u64) -> ConsensusResult<()>;

    /// Parents known, difficulty bits as required, hash meets the target.
    /// Runs before anything is staged.
    fn validate_pow_and_difficulty(&self, area: &StagingArea, header: &Header) -> ConsensusResult<()>;

    /// Body-only checks: coinbase placement, merkle root, duplicate
    /// transactions, input presence, mass.
    fn validate_body_in_isolation(&self, block: &Block) -> ConsensusResult<()>;

    /// Checks against the DAG: header scores match the computed GHOSTDAG
    /// data, timestamp beyond the past median time, mergeset bounded, depth
    /// rules honored.
    fn validate_header_in_context(&self, area: &StagingArea, header: &Header, data: &GhostdagData)
        -> ConsensusResult<()>;
}
