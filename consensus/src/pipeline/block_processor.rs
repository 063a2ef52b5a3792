//! Drives a submitted block through validation, staging and commit.
//!
//! Every insertion runs the same phase sequence: status gate, isolation
//! checks, proof of work and difficulty, staged validation, first commit,
//! and for body-carrying blocks a virtual update. All stores are touched
//! through one staging area per operation, so a failing phase leaves the
//! database exactly as it was, apart from an explicit invalid-status mark.

use std::sync::Arc;

use primitive_types::U256;
use tracing::{debug, info, warn};

use consensus_core::block::Block;
use consensus_core::errors::RuleError;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::status::BlockStatus;
use consensus_core::{BlockHashMap, Hash, ZERO_HASH};
use database::stores::{
    BlockStore, GhostdagStore, HeaderStore, HeaderTipsStore, PruningStore, StatusStore,
};
use database::{Database, StagingArea};

use crate::errors::{ConsensusError, ConsensusResult};
use crate::model::services::{
    BlockValidator, DagTopologyManager, GhostdagManager, HeaderTipsManager, PruningManager,
};
use crate::model::unix_now_millis;
use crate::pipeline::virtual_processor::VirtualProcessor;
use crate::processes::difficulty::bits_to_target;

/// Orchestrates block insertion and pruning point import.
pub struct BlockProcessor {
    db: Arc<Database>,
    block_store: Arc<BlockStore>,
    header_store: Arc<HeaderStore>,
    statuses_store: Arc<StatusStore>,
    ghostdag_store: Arc<GhostdagStore>,
    pruning_store: Arc<PruningStore>,
    header_tips_store: Arc<HeaderTipsStore>,
    validator: Arc<dyn BlockValidator>,
    ghostdag_manager: Arc<dyn GhostdagManager>,
    topology_manager: Arc<dyn DagTopologyManager>,
    header_tips_manager: Arc<dyn HeaderTipsManager>,
    pruning_manager: Arc<dyn PruningManager>,
    virtual_processor: Arc<VirtualProcessor>,
}

impl BlockProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<Database>,
        block_store: Arc<BlockStore>,
        header_store: Arc<HeaderStore>,
        statuses_store: Arc<StatusStore>,
        ghostdag_store: Arc<GhostdagStore>,
        pruning_store: Arc<PruningStore>,
        header_tips_store: Arc<HeaderTipsStore>,
        validator: Arc<dyn BlockValidator>,
        ghostdag_manager: Arc<dyn GhostdagManager>,
        topology_manager: Arc<dyn DagTopologyManager>,
        header_tips_manager: Arc<dyn HeaderTipsManager>,
        pruning_manager: Arc<dyn PruningManager>,
        virtual_processor: Arc<VirtualProcessor>,
    ) -> Self {
        Self {
            db,
            block_store,
            header_store,
            statuses_store,
            ghostdag_store,
            pruning_store,
            header_tips_store,
            validator,
            ghostdag_manager,
            topology_manager,
            header_tips_manager,
            pruning_manager,
            virtual_processor,
        }
    }

    /// Validates and inserts a block, returning its resulting status.
    ///
    /// The memoized header hash is recomputed up front and the block is
    /// processed under the recomputed value throughout. The only admissible
    /// resubmission is a body-carrying block upgrading one previously
    /// inserted header-only.
    pub fn validate_and_insert_block(
        &self,
        block: Block,
        is_header_only: bool,
    ) -> ConsensusResult<BlockStatus> {
        let mut block = block;
        block.header.finalize();
        let hash = block.header.hash;
        let mut area = StagingArea::new();

        let existing = self.statuses_store.get_optional(&area, hash)?;
        if let Some(status) = existing {
            if status.is_invalid() {
                return Err(RuleError::KnownInvalid(hash).into());
            }
            if status.has_block_body() || is_header_only || block.is_header_only() {
                return Err(RuleError::DuplicateBlock(hash).into());
            }
        }

        self.validator
            .validate_header_in_isolation(&block, is_header_only, unix_now_millis())?;
        self.validator.validate_pow_and_difficulty(&area, &block.header)?;

        if existing.is_some() {
            self.upgrade_header_only_block(&mut area, &block)
        } else {
            self.insert_new_block(&mut area, &block, is_header_only)
        }
    }

    fn insert_new_block(
        &self,
        area: &mut StagingArea,
        block: &Block,
        is_header_only: bool,
    ) -> ConsensusResult<BlockStatus> {
        let hash = block.header.hash;
        let data = match self.stage_and_validate(area, block, is_header_only) {
            Ok(data) => data,
            Err(err) => return self.reject_staged_block(area, hash, err),
        };

        // First commit: the block becomes a durable part of the DAG.
        let status = if is_header_only {
            BlockStatus::StatusHeaderOnly
        } else {
            BlockStatus::StatusUTXOPendingVerification
        };
        self.statuses_store.stage(area, hash, status)?;
        self.header_tips_manager.add_header_tip(area, hash)?;
        area.commit(&self.db)?;
        debug!("committed block {} with status {:?}", hash, status);

        if is_header_only {
            return Ok(status);
        }

        let final_status = self.virtual_processor.update_virtual(area, block, &data)?;
        area.commit(&self.db)?;
        Ok(final_status)
    }

    /// Stages the body (when present), header, relations and GHOSTDAG data,
    /// and runs body isolation plus contextual validation over the staged
    /// view.
    fn stage_and_validate(
        &self,
        area: &mut StagingArea,
        block: &Block,
        is_header_only: bool,
    ) -> ConsensusResult<GhostdagData> {
        let hash = block.header.hash;
        if !is_header_only {
            self.block_store.stage(area, block)?;
            self.validator.validate_body_in_isolation(block)?;
        }
        self.header_store.stage(area, &block.header)?;
        self.topology_manager.set_parents(area, hash, &block.header.parents)?;
        let data = self.ghostdag_manager.ghostdag(area, &block.header.parents)?;
        self.ghostdag_store.stage(area, hash, &data)?;
        self.validator.validate_header_in_context(area, &block.header, &data)?;
        Ok(data)
    }

    /// A block already known as header-only arrives with its body: stage
    /// and validate the body, promote to pending verification, then let the
    /// virtual processor resolve it. Header context was validated when the
    /// header first entered, so it is not repeated.
    fn upgrade_header_only_block(
        &self,
        area: &mut StagingArea,
        block: &Block,
    ) -> ConsensusResult<BlockStatus> {
        let hash = block.header.hash;
        self.block_store.stage(area, block)?;
        if let Err(err) = self.validator.validate_body_in_isolation(block) {
            return self.reject_staged_block(area, hash, err);
        }
        self.statuses_store
            .stage(area, hash, BlockStatus::StatusUTXOPendingVerification)?;
        area.commit(&self.db)?;
        debug!("block {} upgraded from header-only to pending verification", hash);

        let data = self.ghostdag_store.get(area, hash)?;
        let status = self.virtual_processor.update_virtual(area, block, &data)?;
        area.commit(&self.db)?;
        Ok(status)
    }

    /// Discards everything staged for a failing block. A rule verdict is
    /// remembered as `StatusInvalid` in its own commit; an infrastructure
    /// error leaves no trace.
    fn reject_staged_block<T>(
        &self,
        area: &mut StagingArea,
        hash: Hash,
        err: ConsensusError,
    ) -> ConsensusResult<T> {
        area.discard();
        if err.is_rule_violation() {
            warn!("block {} rejected: {}", hash, err);
            let mut invalid_area = StagingArea::new();
            self.statuses_store
                .stage(&mut invalid_area, hash, BlockStatus::StatusInvalid)?;
            invalid_area.commit(&self.db)?;
        }
        Err(err)
    }

    /// Replaces the DAG root with an externally synced pruning point.
    ///
    /// Only allowed on a DAG holding nothing beyond genesis. The candidate
    /// header is checked in isolation and against its own proof of work;
    /// its parents and difficulty window lie behind the pruning horizon and
    /// cannot be checked. The header must commit to the previously imported
    /// UTXO set, which becomes the virtual UTXO set in the same commit.
    pub fn validate_and_insert_imported_pruning_point(&self, block: Block) -> ConsensusResult<()> {
        let mut block = block;
        block.header.finalize();
        let hash = block.header.hash;

        let headers = self.header_store.count()?;
        if headers > 1 {
            return Err(RuleError::PruningImportOnNonEmptyDag { headers }.into());
        }

        self.validator
            .validate_header_in_isolation(&block, block.is_header_only(), unix_now_millis())?;
        if U256::from_little_endian(hash.as_bytes()) > bits_to_target(block.header.bits) {
            return Err(RuleError::InvalidProofOfWork(hash).into());
        }

        let commitment = self.pruning_manager.imported_utxo_commitment()?;
        if commitment != block.header.utxo_commitment {
            return Err(RuleError::BadUtxoCommitment {
                expected: block.header.utxo_commitment,
                got: commitment,
            }
            .into());
        }

        let mut area = StagingArea::new();
        self.header_store.stage(&mut area, &block.header)?;
        let status = if block.is_header_only() {
            BlockStatus::StatusHeaderOnly
        } else {
            self.block_store.stage(&mut area, &block)?;
            BlockStatus::StatusUTXOValid
        };
        self.statuses_store.stage(&mut area, hash, status)?;

        // The point's real parents are behind the pruning horizon; it enters
        // as a chain root the way genesis does.
        self.topology_manager.set_parents(&mut area, hash, &[])?;
        let data = GhostdagData::new(
            block.header.blue_score,
            block.header.blue_work,
            ZERO_HASH,
            Vec::new(),
            Vec::new(),
            BlockHashMap::new(),
        );
        self.ghostdag_store.stage(&mut area, hash, &data)?;

        for tip in self.header_tips_store.tips(&area)? {
            self.header_tips_store.stage_remove(&mut area, tip);
        }
        self.header_tips_manager.add_header_tip(&mut area, hash)?;
        self.pruning_store.stage_pruning_point(&mut area, hash)?;
        self.virtual_processor.stage_virtual_over_imported_point(&mut area, hash)?;
        area.commit(&self.db)?;
        info!(
            "imported pruning point {} at blue score {}",
            hash, block.header.blue_score
        );
        Ok(())
    }
}
