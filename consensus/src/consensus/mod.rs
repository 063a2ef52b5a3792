//! The consensus facade.
//!
//! All state lives behind one service thread that owns the stores, the
//! managers and the processors. [`Consensus`] is a cheap handle: every
//! operation is a synchronous request/response over an mpsc channel, so no
//! two operations ever overlap and writes happen only at the service
//! thread's explicit commit points.

pub mod services;
pub mod storage;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info};

use consensus_core::acceptance_data::AcceptanceData;
use consensus_core::api::{BlockInfo, BlockRelationsInfo, ChainPath, SyncInfo, VirtualInfo};
use consensus_core::block::Block;
use consensus_core::config::params::Params;
use consensus_core::errors::RuleError;
use consensus_core::header::Header;
use consensus_core::status::BlockStatus;
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionOutpoint, UtxoEntry};
use consensus_core::utxo::UtxoDiff;
use consensus_core::{BlockHashSet, Hash, VIRTUAL_BLOCK_HASH};
use database::{Database, DbError, StagingArea};

use crate::errors::{ConsensusError, ConsensusResult};
use services::ConsensusServices;
use storage::ConsensusStorage;

type Reply<T> = Sender<ConsensusResult<T>>;

/// One request per facade operation, carrying its reply channel.
enum ConsensusRequest {
    ValidateAndInsertBlock { block: Box<Block>, is_header_only: bool, reply: Reply<BlockStatus> },
    BuildBlockTemplate { miner_script: ScriptPublicKey, txs: Vec<Transaction>, reply: Reply<Block> },
    GetBlock { hash: Hash, reply: Reply<Block> },
    GetBlockEvenIfHeaderOnly { hash: Hash, reply: Reply<Block> },
    GetBlockHeader { hash: Hash, reply: Reply<Header> },
    GetBlockInfo { hash: Hash, reply: Reply<BlockInfo> },
    GetBlockRelations { hash: Hash, reply: Reply<BlockRelationsInfo> },
    GetBlockAcceptanceData { hash: Hash, reply: Reply<AcceptanceData> },
    GetBlockStatus { hash: Hash, reply: Reply<BlockStatus> },
    Tips { reply: Reply<Vec<Hash>> },
    GetVirtualInfo { reply: Reply<VirtualInfo> },
    GetVirtualSelectedParent { reply: Reply<Hash> },
    GetVirtualSelectedParentBlueScore { reply: Reply<u64> },
    GetVirtualSelectedParentChainFromBlock { hash: Hash, reply: Reply<ChainPath> },
    IsInSelectedParentChainOf { queried: Hash, chain_block: Hash, reply: Reply<bool> },
    Anticone { hash: Hash, reply: Reply<Vec<Hash>> },
    GetHeadersSelectedTip { reply: Reply<Hash> },
    GetSyncInfo { reply: Reply<SyncInfo> },
    GetMissingBlockBodyHashes { high: Hash, reply: Reply<Vec<Hash>> },
    CreateBlockLocator { low: Hash, high: Hash, limit: usize, reply: Reply<Vec<Hash>> },
    PruningPoint { reply: Reply<Hash> },
    IsValidPruningPoint { hash: Hash, reply: Reply<bool> },
    ClearImportedPruningPointData { reply: Reply<()> },
    AppendImportedPruningPointUtxos {
        pairs: Vec<(TransactionOutpoint, UtxoEntry)>,
        reply: Reply<()>,
    },
    ValidateAndInsertImportedPruningPoint { block: Box<Block>, reply: Reply<()> },
    GetPruningPointUtxos {
        expected_pruning_point: Hash,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
        reply: Reply<Vec<(TransactionOutpoint, UtxoEntry)>>,
    },
    GetVirtualUtxos {
        expected_virtual_parents: Vec<Hash>,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
        reply: Reply<Vec<(TransactionOutpoint, UtxoEntry)>>,
    },
    Shutdown,
}

/// Handle to a running consensus instance.
///
/// Cloning is not provided; share the handle behind an `Arc` instead, so
/// shutdown has a single owner. Dropping the handle stops the service.
pub struct Consensus {
    request_tx: Sender<ConsensusRequest>,
    service_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Consensus {
    /// Opens a consensus instance over the given database. An empty
    /// database is bootstrapped with the network genesis before the service
    /// thread starts.
    pub fn new(db: Arc<Database>, params: Params) -> ConsensusResult<Self> {
        let storage = ConsensusStorage::new(db.clone());
        let services = ConsensusServices::new(db.clone(), &params, &storage);
        bootstrap_genesis(&db, &storage, &services, &params)?;

        let (request_tx, request_rx) = mpsc::channel();
        let service = ConsensusService { db, params, storage, services, request_rx };
        let handle = thread::spawn(move || service.run());
        Ok(Self { request_tx, service_handle: Mutex::new(Some(handle)) })
    }

    /// Stops the service thread and waits for it. Safe to call more than
    /// once; requests sent after this fail with [`ConsensusError::ServiceStopped`].
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(ConsensusRequest::Shutdown);
        if let Some(handle) = self.service_handle.lock().take() {
            let _ = handle.join();
        }
    }

    fn call<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> ConsensusRequest,
    ) -> ConsensusResult<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.request_tx
            .send(build(reply_tx))
            .map_err(|_| ConsensusError::ServiceStopped)?;
        reply_rx.recv().map_err(|_| ConsensusError::ServiceStopped)?
    }

    pub fn validate_and_insert_block(
        &self,
        block: Block,
        is_header_only: bool,
    ) -> ConsensusResult<BlockStatus> {
        self.call(|reply| ConsensusRequest::ValidateAndInsertBlock {
            block: Box::new(block),
            is_header_only,
            reply,
        })
    }

    pub fn build_block_template(
        &self,
        miner_script: ScriptPublicKey,
        txs: Vec<Transaction>,
    ) -> ConsensusResult<Block> {
        self.call(|reply| ConsensusRequest::BuildBlockTemplate { miner_script, txs, reply })
    }

    pub fn get_block(&self, hash: Hash) -> ConsensusResult<Block> {
        self.call(|reply| ConsensusRequest::GetBlock { hash, reply })
    }

    pub fn get_block_even_if_header_only(&self, hash: Hash) -> ConsensusResult<Block> {
        self.call(|reply| ConsensusRequest::GetBlockEvenIfHeaderOnly { hash, reply })
    }

    pub fn get_block_header(&self, hash: Hash) -> ConsensusResult<Header> {
        self.call(|reply| ConsensusRequest::GetBlockHeader { hash, reply })
    }

    pub fn get_block_info(&self, hash: Hash) -> ConsensusResult<BlockInfo> {
        self.call(|reply| ConsensusRequest::GetBlockInfo { hash, reply })
    }

    pub fn get_block_relations(&self, hash: Hash) -> ConsensusResult<BlockRelationsInfo> {
        self.call(|reply| ConsensusRequest::GetBlockRelations { hash, reply })
    }

    pub fn get_block_acceptance_data(&self, hash: Hash) -> ConsensusResult<AcceptanceData> {
        self.call(|reply| ConsensusRequest::GetBlockAcceptanceData { hash, reply })
    }

    pub fn get_block_status(&self, hash: Hash) -> ConsensusResult<BlockStatus> {
        self.call(|reply| ConsensusRequest::GetBlockStatus { hash, reply })
    }

    /// The virtual block's parents, which are the current DAG tips.
    pub fn tips(&self) -> ConsensusResult<Vec<Hash>> {
        self.call(|reply| ConsensusRequest::Tips { reply })
    }

    pub fn get_virtual_info(&self) -> ConsensusResult<VirtualInfo> {
        self.call(|reply| ConsensusRequest::GetVirtualInfo { reply })
    }

    pub fn get_virtual_selected_parent(&self) -> ConsensusResult<Hash> {
        self.call(|reply| ConsensusRequest::GetVirtualSelectedParent { reply })
    }

    pub fn get_virtual_selected_parent_blue_score(&self) -> ConsensusResult<u64> {
        self.call(|reply| ConsensusRequest::GetVirtualSelectedParentBlueScore { reply })
    }

    /// The selected-parent-chain delta from `hash` up to the virtual.
    pub fn get_virtual_selected_parent_chain_from_block(
        &self,
        hash: Hash,
    ) -> ConsensusResult<ChainPath> {
        self.call(|reply| ConsensusRequest::GetVirtualSelectedParentChainFromBlock { hash, reply })
    }

    /// Whether `queried` lies on the selected parent chain of `chain_block`.
    pub fn is_in_selected_parent_chain_of(
        &self,
        queried: Hash,
        chain_block: Hash,
    ) -> ConsensusResult<bool> {
        self.call(|reply| ConsensusRequest::IsInSelectedParentChainOf { queried, chain_block, reply })
    }

    /// DAG blocks neither in the past nor in the future of `hash`.
    pub fn anticone(&self, hash: Hash) -> ConsensusResult<Vec<Hash>> {
        self.call(|reply| ConsensusRequest::Anticone { hash, reply })
    }

    pub fn get_headers_selected_tip(&self) -> ConsensusResult<Hash> {
        self.call(|reply| ConsensusRequest::GetHeadersSelectedTip { reply })
    }

    pub fn get_sync_info(&self) -> ConsensusResult<SyncInfo> {
        self.call(|reply| ConsensusRequest::GetSyncInfo { reply })
    }

    /// Header-only blocks in `past(high) ∪ {high}`, parents before children.
    pub fn get_missing_block_body_hashes(&self, high: Hash) -> ConsensusResult<Vec<Hash>> {
        self.call(|reply| ConsensusRequest::GetMissingBlockBodyHashes { high, reply })
    }

    pub fn create_block_locator(
        &self,
        low: Hash,
        high: Hash,
        limit: usize,
    ) -> ConsensusResult<Vec<Hash>> {
        self.call(|reply| ConsensusRequest::CreateBlockLocator { low, high, limit, reply })
    }

    pub fn pruning_point(&self) -> ConsensusResult<Hash> {
        self.call(|reply| ConsensusRequest::PruningPoint { reply })
    }

    pub fn is_valid_pruning_point(&self, hash: Hash) -> ConsensusResult<bool> {
        self.call(|reply| ConsensusRequest::IsValidPruningPoint { hash, reply })
    }

    /// Drops every previously imported pruning point UTXO.
    pub fn clear_imported_pruning_point_data(&self) -> ConsensusResult<()> {
        self.call(|reply| ConsensusRequest::ClearImportedPruningPointData { reply })
    }

    /// Appends a chunk of the pruning point UTXO set being synced.
    pub fn append_imported_pruning_point_utxos(
        &self,
        pairs: Vec<(TransactionOutpoint, UtxoEntry)>,
    ) -> ConsensusResult<()> {
        self.call(|reply| ConsensusRequest::AppendImportedPruningPointUtxos { pairs, reply })
    }

    /// Validates the candidate pruning point against the imported UTXO set
    /// and installs it as the new DAG root.
    pub fn validate_and_insert_imported_pruning_point(&self, block: Block) -> ConsensusResult<()> {
        self.call(|reply| ConsensusRequest::ValidateAndInsertImportedPruningPoint {
            block: Box::new(block),
            reply,
        })
    }

    pub fn get_pruning_point_utxos(
        &self,
        expected_pruning_point: Hash,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
    ) -> ConsensusResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
        self.call(|reply| ConsensusRequest::GetPruningPointUtxos {
            expected_pruning_point,
            from_outpoint,
            limit,
            reply,
        })
    }

    pub fn get_virtual_utxos(
        &self,
        expected_virtual_parents: Vec<Hash>,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
    ) -> ConsensusResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
        self.call(|reply| ConsensusRequest::GetVirtualUtxos {
            expected_virtual_parents,
            from_outpoint,
            limit,
            reply,
        })
    }
}

impl Drop for Consensus {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The service side: owns all state, processes one request at a time.
struct ConsensusService {
    db: Arc<Database>,
    params: Params,
    storage: ConsensusStorage,
    services: ConsensusServices,
    request_rx: Receiver<ConsensusRequest>,
}

impl ConsensusService {
    fn run(self) {
        info!("consensus service started on network {}", self.params.network);
        while let Ok(request) = self.request_rx.recv() {
            if matches!(request, ConsensusRequest::Shutdown) {
                break;
            }
            self.handle_request(request);
        }
        info!("consensus service stopped");
    }

    fn handle_request(&self, request: ConsensusRequest) {
        match request {
            ConsensusRequest::ValidateAndInsertBlock { block, is_header_only, reply } => {
                let _ = reply.send(
                    self.services
                        .block_processor
                        .validate_and_insert_block(*block, is_header_only),
                );
            }
            ConsensusRequest::BuildBlockTemplate { miner_script, txs, reply } => {
                let _ = reply.send(
                    self.services.template_builder.build_block_template(miner_script, txs),
                );
            }
            ConsensusRequest::GetBlock { hash, reply } => {
                let _ = reply.send(self.get_block(hash));
            }
            ConsensusRequest::GetBlockEvenIfHeaderOnly { hash, reply } => {
                let _ = reply.send(self.get_block_even_if_header_only(hash));
            }
            ConsensusRequest::GetBlockHeader { hash, reply } => {
                let _ = reply.send(self.get_block_header(hash));
            }
            ConsensusRequest::GetBlockInfo { hash, reply } => {
                let _ = reply.send(self.get_block_info(hash));
            }
            ConsensusRequest::GetBlockRelations { hash, reply } => {
                let _ = reply.send(self.get_block_relations(hash));
            }
            ConsensusRequest::GetBlockAcceptanceData { hash, reply } => {
                let _ = reply.send(self.get_block_acceptance_data(hash));
            }
            ConsensusRequest::GetBlockStatus { hash, reply } => {
                let _ = reply.send(self.get_block_status(hash));
            }
            ConsensusRequest::Tips { reply } => {
                let area = StagingArea::new();
                let _ = reply.send(self.services.topology_manager.virtual_parents(&area));
            }
            ConsensusRequest::GetVirtualInfo { reply } => {
                let _ = reply.send(self.get_virtual_info());
            }
            ConsensusRequest::GetVirtualSelectedParent { reply } => {
                let _ = reply.send(self.get_virtual_selected_parent());
            }
            ConsensusRequest::GetVirtualSelectedParentBlueScore { reply } => {
                let _ = reply.send(self.get_virtual_selected_parent_blue_score());
            }
            ConsensusRequest::GetVirtualSelectedParentChainFromBlock { hash, reply } => {
                let _ = reply.send(self.virtual_chain_from_block(hash));
            }
            ConsensusRequest::IsInSelectedParentChainOf { queried, chain_block, reply } => {
                let _ = reply.send(self.is_in_selected_parent_chain_of(queried, chain_block));
            }
            ConsensusRequest::Anticone { hash, reply } => {
                let _ = reply.send(self.anticone(hash));
            }
            ConsensusRequest::GetHeadersSelectedTip { reply } => {
                let _ = reply.send(self.get_headers_selected_tip());
            }
            ConsensusRequest::GetSyncInfo { reply } => {
                let area = StagingArea::new();
                let _ = reply.send(self.services.sync_manager.get_sync_info(&area));
            }
            ConsensusRequest::GetMissingBlockBodyHashes { high, reply } => {
                let _ = reply.send(self.get_missing_block_body_hashes(high));
            }
            ConsensusRequest::CreateBlockLocator { low, high, limit, reply } => {
                let _ = reply.send(self.create_block_locator(low, high, limit));
            }
            ConsensusRequest::PruningPoint { reply } => {
                let _ = reply.send(self.pruning_point());
            }
            ConsensusRequest::IsValidPruningPoint { hash, reply } => {
                let _ = reply.send(self.is_valid_pruning_point(hash));
            }
            ConsensusRequest::ClearImportedPruningPointData { reply } => {
                let _ = reply.send(self.clear_imported_pruning_point_data());
            }
            ConsensusRequest::AppendImportedPruningPointUtxos { pairs, reply } => {
                let _ = reply.send(self.append_imported_pruning_point_utxos(pairs));
            }
            ConsensusRequest::ValidateAndInsertImportedPruningPoint { block, reply } => {
                let _ = reply.send(
                    self.services
                        .block_processor
                        .validate_and_insert_imported_pruning_point(*block),
                );
            }
            ConsensusRequest::GetPruningPointUtxos {
                expected_pruning_point,
                from_outpoint,
                limit,
                reply,
            } => {
                let _ = reply.send(self.get_pruning_point_utxos(
                    expected_pruning_point,
                    from_outpoint,
                    limit,
                ));
            }
            ConsensusRequest::GetVirtualUtxos {
                expected_virtual_parents,
                from_outpoint,
                limit,
                reply,
            } => {
                let _ = reply.send(self.get_virtual_utxos(
                    expected_virtual_parents,
                    from_outpoint,
                    limit,
                ));
            }
            ConsensusRequest::Shutdown => {}
        }
    }

    /// Operations parameterized by a block hash answer
    /// [`ConsensusError::BlockNotFound`] for hashes without a status row.
    /// `get_block_info` is the one exception and reports non-existence.
    fn require_known_block(&self, area: &StagingArea, hash: Hash) -> ConsensusResult<()> {
        if self.storage.statuses_store.has(area, hash)? {
            Ok(())
        } else {
            Err(ConsensusError::BlockNotFound(hash))
        }
    }

    fn get_block(&self, hash: Hash) -> ConsensusResult<Block> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        match self.storage.block_store.get_optional(&area, hash)? {
            Some(block) => Ok(block),
            None => Err(ConsensusError::HeaderOnlyBlock(hash)),
        }
    }

    fn get_block_even_if_header_only(&self, hash: Hash) -> ConsensusResult<Block> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        if let Some(block) = self.storage.block_store.get_optional(&area, hash)? {
            return Ok(block);
        }
        let header = self.storage.header_store.get(&area, hash)?;
        Ok(Block::from_header(header))
    }

    fn get_block_header(&self, hash: Hash) -> ConsensusResult<Header> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        Ok(self.storage.header_store.get(&area, hash)?)
    }

    fn get_block_info(&self, hash: Hash) -> ConsensusResult<BlockInfo> {
        let area = StagingArea::new();
        let status = match self.storage.statuses_store.get_optional(&area, hash)? {
            Some(status) => status,
            None => return Ok(BlockInfo::missing()),
        };
        let blue_score = self
            .storage
            .ghostdag_store
            .get_optional(&area, hash)?
            .map(|data| data.blue_score);
        Ok(BlockInfo { exists: true, status: Some(status), blue_score })
    }

    fn get_block_relations(&self, hash: Hash) -> ConsensusResult<BlockRelationsInfo> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        let parents = self.services.topology_manager.parents(&area, hash)?;
        let children = self.services.topology_manager.children(&area, hash)?;
        let selected_parent = self.storage.ghostdag_store.get(&area, hash)?.selected_parent;
        Ok(BlockRelationsInfo { parents, selected_parent, children })
    }

    fn get_block_acceptance_data(&self, hash: Hash) -> ConsensusResult<AcceptanceData> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        let data = self
            .storage
            .acceptance_data_store
            .get_optional(&area, hash)?
            .ok_or_else(|| DbError::NotFound(format!("acceptance data for block {}", hash)))?;
        Ok(data)
    }

    fn get_block_status(&self, hash: Hash) -> ConsensusResult<BlockStatus> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        Ok(self.storage.statuses_store.get(&area, hash)?)
    }

    fn get_virtual_info(&self) -> ConsensusResult<VirtualInfo> {
        let area = StagingArea::new();
        let parents = self.services.topology_manager.virtual_parents(&area)?;
        let virtual_data = self.storage.ghostdag_store.get(&area, VIRTUAL_BLOCK_HASH)?;
        let bits = self.services.difficulty_manager.required_bits(&area, &parents)?;
        let past_median_time = self
            .services
            .past_median_time_manager
            .past_median_time(&area, virtual_data.selected_parent)?;
        Ok(VirtualInfo {
            parents,
            bits,
            past_median_time,
            blue_score: virtual_data.blue_score,
            daa_score: virtual_data.blue_score,
        })
    }

    fn get_virtual_selected_parent(&self) -> ConsensusResult<Hash> {
        let area = StagingArea::new();
        Ok(self.storage.ghostdag_store.get(&area, VIRTUAL_BLOCK_HASH)?.selected_parent)
    }

    fn get_virtual_selected_parent_blue_score(&self) -> ConsensusResult<u64> {
        let area = StagingArea::new();
        let selected_parent = self.storage.ghostdag_store.get(&area, VIRTUAL_BLOCK_HASH)?.selected_parent;
        Ok(self.storage.ghostdag_store.get_blue_score(&area, selected_parent)?)
    }

    fn virtual_chain_from_block(&self, from: Hash) -> ConsensusResult<ChainPath> {
        let area = StagingArea::new();
        self.require_known_block(&area, from)?;
        let tip = self.storage.ghostdag_store.get(&area, VIRTUAL_BLOCK_HASH)?.selected_parent;

        // Walk down from the queried block until a block on the virtual
        // selected parent chain is met; that block is the split point.
        let mut removed = Vec::new();
        let mut split = from;
        while !self.services.reachability_service.is_chain_ancestor_of(&area, split, tip)? {
            removed.push(split);
            let data = self.storage.ghostdag_store.get(&area, split)?;
            if !data.has_selected_parent() {
                break;
            }
            split = data.selected_parent;
        }

        let mut added = Vec::new();
        let mut walker = tip;
        while walker != split {
            added.push(walker);
            let data = self.storage.ghostdag_store.get(&area, walker)?;
            if !data.has_selected_parent() {
                break;
            }
            walker = data.selected_parent;
        }
        added.reverse();
        Ok(ChainPath { added, removed })
    }

    fn is_in_selected_parent_chain_of(
        &self,
        queried: Hash,
        chain_block: Hash,
    ) -> ConsensusResult<bool> {
        let area = StagingArea::new();
        self.require_known_block(&area, queried)?;
        self.require_known_block(&area, chain_block)?;
        self.services.reachability_service.is_chain_ancestor_of(&area, queried, chain_block)
    }

    fn anticone(&self, hash: Hash) -> ConsensusResult<Vec<Hash>> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        self.services.topology_manager.anticone(&area, hash)
    }

    fn get_headers_selected_tip(&self) -> ConsensusResult<Hash> {
        let area = StagingArea::new();
        let tip = self
            .storage
            .headers_selected_tip_store
            .get(&area)?
            .ok_or_else(|| DbError::NotFound("headers selected tip".to_string()))?;
        Ok(tip)
    }

    fn get_missing_block_body_hashes(&self, high: Hash) -> ConsensusResult<Vec<Hash>> {
        let area = StagingArea::new();
        self.require_known_block(&area, high)?;
        self.services.sync_manager.get_missing_block_body_hashes(&area, high)
    }

    fn create_block_locator(
        &self,
        low: Hash,
        high: Hash,
        limit: usize,
    ) -> ConsensusResult<Vec<Hash>> {
        let area = StagingArea::new();
        self.require_known_block(&area, low)?;
        self.require_known_block(&area, high)?;
        self.services.sync_manager.create_block_locator(&area, low, high, limit)
    }

    fn pruning_point(&self) -> ConsensusResult<Hash> {
        let area = StagingArea::new();
        let point = self
            .storage
            .pruning_store
            .pruning_point(&area)?
            .ok_or_else(|| DbError::NotFound("the pruning point row".to_string()))?;
        Ok(point)
    }

    fn is_valid_pruning_point(&self, hash: Hash) -> ConsensusResult<bool> {
        let area = StagingArea::new();
        self.require_known_block(&area, hash)?;
        self.services.pruning_manager.is_valid_pruning_point(&area, hash)
    }

    fn clear_imported_pruning_point_data(&self) -> ConsensusResult<()> {
        let mut area = StagingArea::new();
        self.storage.pruning_store.stage_clear_imported_utxos(&mut area)?;
        area.commit(&self.db)?;
        debug!("cleared imported pruning point utxo data");
        Ok(())
    }

    fn append_imported_pruning_point_utxos(
        &self,
        pairs: Vec<(TransactionOutpoint, UtxoEntry)>,
    ) -> ConsensusResult<()> {
        let mut area = StagingArea::new();
        for (outpoint, entry) in pairs.iter() {
            self.storage.pruning_store.stage_imported_utxo(&mut area, outpoint, entry)?;
        }
        area.commit(&self.db)?;
        debug!("appended {} imported pruning point utxos", pairs.len());
        Ok(())
    }

    fn get_pruning_point_utxos(
        &self,
        expected_pruning_point: Hash,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
    ) -> ConsensusResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
        let current = self.pruning_point()?;
        if expected_pruning_point != current {
            return Err(RuleError::WrongPruningPointHash {
                expected: expected_pruning_point,
                current,
            }
            .into());
        }
        Ok(self.storage.pruning_store.imported_utxos_from(from_outpoint, limit)?)
    }

    fn get_virtual_utxos(
        &self,
        expected_virtual_parents: Vec<Hash>,
        from_outpoint: Option<TransactionOutpoint>,
        limit: usize,
    ) -> ConsensusResult<Vec<(TransactionOutpoint, UtxoEntry)>> {
        let area = StagingArea::new();
        let actual = self.services.topology_manager.virtual_parents(&area)?;
        let expected_set: BlockHashSet = expected_virtual_parents.iter().copied().collect();
        let actual_set: BlockHashSet = actual.iter().copied().collect();
        if expected_set != actual_set {
            return Err(RuleError::WrongVirtualParents {
                expected: expected_virtual_parents,
                actual,
            }
            .into());
        }
        Ok(self.storage.virtual_utxo_store.utxos_from(from_outpoint, limit)?)
    }
}

/// Stages and commits the genesis block when the database is empty: block,
/// header, valid status, root relations, GHOSTDAG data, tips, pruning point
/// and the virtual resting on genesis, all in one commit.
fn bootstrap_genesis(
    db: &Database,
    storage: &ConsensusStorage,
    services: &ConsensusServices,
    params: &Params,
) -> ConsensusResult<()> {
    if storage.header_store.count()? > 0 {
        return Ok(());
    }

    let genesis: Block = (&params.genesis).into();
    let genesis_hash = genesis.hash();
    let mut area = StagingArea::new();

    storage.block_store.stage(&mut area, &genesis)?;
    storage.header_store.stage(&mut area, &genesis.header)?;
    storage
        .statuses_store
        .stage(&mut area, genesis_hash, BlockStatus::StatusUTXOValid)?;
    services.topology_manager.set_parents(&mut area, genesis_hash, &[])?;
    storage
        .ghostdag_store
        .stage(&mut area, genesis_hash, &services.ghostdag_manager.genesis_ghostdag_data())?;
    storage.header_tips_store.stage_add(&mut area, genesis_hash);
    storage.headers_selected_tip_store.stage(&mut area, genesis_hash)?;
    storage.pruning_store.stage_pruning_point(&mut area, genesis_hash)?;

    services.topology_manager.stage_virtual_parents(&mut area, &[genesis_hash])?;
    let virtual_data = services.ghostdag_manager.ghostdag(&area, &[genesis_hash])?;
    storage.ghostdag_store.stage(&mut area, VIRTUAL_BLOCK_HASH, &virtual_data)?;

    storage.acceptance_data_store.stage(&mut area, genesis_hash, &Vec::new())?;
    storage.utxo_diff_store.stage(&mut area, genesis_hash, &UtxoDiff::new())?;

    area.commit(db)?;
    info!("bootstrapped empty database with genesis {}", genesis_hash);
    Ok(())
}
