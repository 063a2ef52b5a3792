use crate::status::BlockStatus;
use crate::Hash;
use serde::{Deserialize, Serialize};

/// Existence-style answer for a block lookup. Unlike other queries, asking
/// about an unknown hash is not an error here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub exists: bool,
    pub status: Option<BlockStatus>,
    pub blue_score: Option<u64>,
}

impl BlockInfo {
    pub fn missing() -> Self {
        Self { exists: false, status: None, blue_score: None }
    }
}

/// Snapshot of the virtual block's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualInfo {
    /// Current DAG tips, which the virtual merges.
    pub parents: Vec<Hash>,
    /// Difficulty bits a new block over these parents must carry.
    pub bits: u32,
    pub past_median_time: u64,
    pub blue_score: u64,
    pub daa_score: u64,
}

/// Header/block counts a syncing peer needs to estimate progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncInfo {
    pub headers_selected_tip: Hash,
    pub header_count: u64,
    pub block_count: u64,
}

/// Selected-parent-chain delta from some block up to the virtual: `added`
/// walks up towards the virtual, `removed` lists the abandoned branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPath {
    pub added: Vec<Hash>,
    pub removed: Vec<Hash>,
}

/// A block's direct neighborhood in the DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRelationsInfo {
    pub parents: Vec<Hash>,
    pub selected_parent: Hash,
    pub children: Vec<Hash>,
}
