//! Consensus engine of a blockDAG node.
//!
//! Blocks form a directed acyclic graph rather than a chain; the GHOSTDAG
//! protocol orders that DAG and a virtual block maintained over the current
//! tips carries the node's UTXO state. All of it is driven through the
//! [`Consensus`] facade, which serializes every operation onto a single
//! service thread.
//!
//! The crate splits into:
//! - [`consensus`]: the facade, its service thread, store and manager wiring.
//! - [`processes`]: the domain managers (GHOSTDAG, reachability, topology,
//!   difficulty, median time, coinbase, depth, tips, sync, pruning).
//! - [`pipeline`]: block insertion, virtual resolution and template building.
//! - [`validation`]: the staged block validation rules.
//! - [`model`]: the capability traits the managers are consumed through.

pub mod consensus;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod processes;
pub mod validation;

#[cfg(test)]
mod integration_test;

pub use consensus::Consensus;
pub use errors::{ConsensusError, ConsensusResult};

// Re-export the domain vocabulary so embedders need only this crate.
pub use consensus_core::api::{BlockInfo, BlockRelationsInfo, ChainPath, SyncInfo, VirtualInfo};
pub use consensus_core::block::Block;
pub use consensus_core::config::params::Params;
pub use consensus_core::errors::RuleError;
pub use consensus_core::header::Header;
pub use consensus_core::status::BlockStatus;
pub use consensus_core::Hash;
