//! The four validation stages a block passes through on its way into the DAG.

use std::sync::Arc;

use primitive_types::U256;

use consensus_core::block::Block;
use consensus_core::config::constants::BLOCK_VERSION;
use consensus_core::errors::RuleError;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::header::Header;
use consensus_core::merkle::calc_hash_merkle_root;
use consensus_core::{BlockHashSet, Hash};
use database::stores::StatusStore;
use database::StagingArea;

use crate::errors::ConsensusResult;
use crate::model::services::{
    BlockValidator, CoinbaseManager, DepthManager, DifficultyManager, PastMedianTimeManager,
};
use crate::processes::difficulty::bits_to_target;

/// Validates blocks in four stages of increasing context: header shape,
/// proof of work and difficulty, body structure, and finally the header
/// fields that depend on the block's position in the DAG.
///
/// The first three stages run before anything about the block is staged,
/// so a rejected block costs no storage work.
pub struct DbBlockValidator {
    max_block_parents: usize,
    mergeset_size_limit: u64,
    timestamp_deviation_tolerance: u64,
    max_block_mass: u64,
    mass_per_tx_byte: u64,
    statuses_store: Arc<StatusStore>,
    difficulty_manager: Arc<dyn DifficultyManager>,
    past_median_time_manager: Arc<dyn PastMedianTimeManager>,
    coinbase_manager: Arc<dyn CoinbaseManager>,
    depth_manager: Arc<dyn DepthManager>,
}

impl DbBlockValidator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_block_parents: usize,
        mergeset_size_limit: u64,
        timestamp_deviation_tolerance: u64,
        max_block_mass: u64,
        mass_per_tx_byte: u64,
        statuses_store: Arc<StatusStore>,
        difficulty_manager: Arc<dyn DifficultyManager>,
        past_median_time_manager: Arc<dyn PastMedianTimeManager>,
        coinbase_manager: Arc<dyn CoinbaseManager>,
        depth_manager: Arc<dyn DepthManager>,
    ) -> Self {
        Self {
            max_block_parents,
            mergeset_size_limit,
            timestamp_deviation_tolerance,
            max_block_mass,
            mass_per_tx_byte,
            statuses_store,
            difficulty_manager,
            past_median_time_manager,
            coinbase_manager,
            depth_manager,
        }
    }

    fn block_mass(&self, block: &Block) -> u64 {
        block
            .transactions
            .iter()
            .map(|tx| tx.estimated_size() as u64 * self.mass_per_tx_byte)
            .sum()
    }
}

impl BlockValidator for DbBlockValidator {
    fn validate_header_in_isolation(
        &self,
        block: &Block,
        is_header_only: bool,
        now: u64,
    ) -> ConsensusResult<()> {
        let header = &block.header;
        if header.version != BLOCK_VERSION {
            return Err(RuleError::WrongBlockVersion {
                got: header.version,
                expected: BLOCK_VERSION,
            }
            .into());
        }
        if is_header_only && !block.transactions.is_empty() {
            return Err(
                RuleError::HeaderOnlyHasBody(header.hash, block.transactions.len()).into(),
            );
        }
        if header.parents.is_empty() {
            return Err(RuleError::NoParents.into());
        }
        if header.parents.len() > self.max_block_parents {
            return Err(RuleError::TooManyParents {
                got: header.parents.len(),
                max: self.max_block_parents,
            }
            .into());
        }
        let mut seen = BlockHashSet::with_capacity(header.parents.len());
        for &parent in header.parents.iter() {
            if !seen.insert(parent) {
                return Err(RuleError::DuplicateParents(parent).into());
            }
        }
        if header.timestamp > now + self.timestamp_deviation_tolerance {
            return Err(RuleError::TimeTooFarIntoFuture {
                timestamp: header.timestamp,
                now,
                tolerance: self.timestamp_deviation_tolerance,
            }
            .into());
        }
        Ok(())
    }

    fn validate_pow_and_difficulty(
        &self,
        area: &StagingArea,
        header: &Header,
    ) -> ConsensusResult<()> {
        let mut missing: Vec<Hash> = Vec::new();
        for &parent in header.parents.iter() {
            if !self.statuses_store.has(area, parent)? {
                missing.push(parent);
            }
        }
        if !missing.is_empty() {
            return Err(RuleError::MissingParents(missing).into());
        }
        for &parent in header.parents.iter() {
            if self.statuses_store.get(area, parent)?.is_invalid() {
                return Err(RuleError::KnownInvalid(parent).into());
            }
        }
        let expected_bits = self.difficulty_manager.required_bits(area, &header.parents)?;
        if header.bits != expected_bits {
            return Err(RuleError::UnexpectedDifficulty {
                got: header.bits,
                expected: expected_bits,
            }
            .into());
        }
        // The caller recomputed the memoized hash, so it is the real one.
        if U256::from_little_endian(header.hash.as_bytes()) > bits_to_target(header.bits) {
            return Err(RuleError::InvalidProofOfWork(header.hash).into());
        }
        Ok(())
    }

    fn validate_body_in_isolation(&self, block: &Block) -> ConsensusResult<()> {
        self.coinbase_manager.validate_coinbase(block)?;
        let merkle_root = calc_hash_merkle_root(&block.transactions);
        if merkle_root != block.header.hash_merkle_root {
            return Err(RuleError::BadMerkleRoot {
                expected: block.header.hash_merkle_root,
                got: merkle_root,
            }
            .into());
        }
        let mut seen = BlockHashSet::with_capacity(block.transactions.len());
        for (position, tx) in block.transactions.iter().enumerate() {
            let id = tx.id();
            if !seen.insert(id) {
                return Err(RuleError::DuplicateTransactions(id).into());
            }
            if position > 0 && tx.inputs.is_empty() {
                return Err(RuleError::NoTxInputs(id).into());
            }
        }
        let mass = self.block_mass(block);
        if mass > self.max_block_mass {
            return Err(RuleError::ExceedsMassLimit {
                got: mass,
                max: self.max_block_mass,
            }
            .into());
        }
        Ok(())
    }

    fn validate_header_in_context(
        &self,
        area: &StagingArea,
        header: &Header,
        data: &GhostdagData,
    ) -> ConsensusResult<()> {
        let mergeset_size = data.mergeset_size() as u64;
        if mergeset_size > self.mergeset_size_limit {
            return Err(RuleError::MergesetTooBig {
                got: mergeset_size,
                max: self.mergeset_size_limit,
            }
            .into());
        }
        if header.blue_score != data.blue_score {
            return Err(RuleError::UnexpectedHeaderBlueScore {
                got: header.blue_score,
                expected: data.blue_score,
            }
            .into());
        }
        if header.blue_work != data.blue_work {
            return Err(RuleError::UnexpectedHeaderBlueWork {
                got: header.blue_work,
                expected: data.blue_work,
            }
            .into());
        }
        if header.daa_score != data.blue_score {
            return Err(RuleError::UnexpectedHeaderDaaScore {
                got: header.daa_score,
                expected: data.blue_score,
            }
            .into());
        }
        let past_median_time = self
            .past_median_time_manager
            .past_median_time(area, data.selected_parent)?;
        if header.timestamp <= past_median_time {
            return Err(RuleError::TimeTooOld {
                timestamp: header.timestamp,
                past_median_time,
            }
            .into());
        }
        self.depth_manager
            .check_bounded_merge_depth(area, header.hash, data)?;
        self.depth_manager.check_finality(area, header.hash, data)?;
        self.depth_manager.check_pruning_point_rules(area, header)?;
        Ok(())
    }
}
