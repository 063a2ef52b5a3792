//! End to end scenarios driven through the public [`Consensus`] handle:
//! template mining, fork resolution, header-first sync and pruning point
//! import, all over a real database.

use std::sync::Arc;

use primitive_types::U256;
use tempfile::TempDir;

use consensus_core::block::Block;
use consensus_core::config::constants::{BLOCK_VERSION, SOMPI_PER_COIN, TX_VERSION};
use consensus_core::config::params::Params;
use consensus_core::errors::RuleError;
use consensus_core::hashing::utxo::utxo_commitment;
use consensus_core::header::Header;
use consensus_core::status::BlockStatus;
use consensus_core::tx::{
    ScriptPublicKey, Transaction, TransactionInput, TransactionOutpoint, TransactionOutput,
    UtxoEntry,
};
use consensus_core::{Hash, ZERO_HASH};
use database::Database;

use crate::consensus::Consensus;
use crate::errors::ConsensusError;
use crate::processes::difficulty::bits_to_target;

fn open_consensus(tmp: &TempDir) -> Consensus {
    let db = Arc::new(Database::open(tmp.path()).unwrap());
    Consensus::new(db, Params::simnet()).unwrap()
}

fn miner_script(tag: u8) -> ScriptPublicKey {
    ScriptPublicKey::new(0, vec![tag; 4])
}

/// Grinds the nonce until the hash meets the difficulty the header claims.
/// Simnet targets let roughly a quarter of all nonces through.
fn mine(block: &mut Block) {
    let target = bits_to_target(block.header.bits);
    loop {
        block.header.finalize();
        if U256::from_little_endian(block.header.hash.as_bytes()) <= target {
            return;
        }
        block.header.nonce += 1;
    }
}

/// Builds a template over the current tips carrying `txs`, mines it and
/// inserts it, asserting the block lands with a verified UTXO state.
fn mine_block(consensus: &Consensus, txs: Vec<Transaction>) -> Block {
    let mut block = consensus.build_block_template(miner_script(7), txs).unwrap();
    mine(&mut block);
    let status = consensus.validate_and_insert_block(block.clone(), false).unwrap();
    assert_eq!(status, BlockStatus::StatusUTXOValid);
    block
}

fn spend(previous: TransactionOutpoint, value: u64, tag: u8) -> Transaction {
    Transaction::new(
        TX_VERSION,
        vec![TransactionInput::new(previous, vec![tag], 0)],
        vec![TransactionOutput::new(value, miner_script(tag))],
        0,
        Vec::new(),
    )
}

#[test]
fn test_mined_templates_advance_the_virtual_chain() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);
    let genesis = Params::simnet().genesis.hash();

    let a = mine_block(&consensus, Vec::new());
    let a_hash = a.hash();
    assert_eq!(consensus.tips().unwrap(), vec![a_hash]);
    assert_eq!(consensus.get_virtual_selected_parent().unwrap(), a_hash);
    assert_eq!(consensus.get_virtual_selected_parent_blue_score().unwrap(), 1);

    // the template carried the scores ghostdag assigns on insertion
    assert_eq!(a.header.blue_score, 1);
    assert_eq!(a.header.daa_score, 1);
    assert_eq!(a.header.pruning_point, genesis);

    let info = consensus.get_block_info(a_hash).unwrap();
    assert!(info.exists);
    assert_eq!(info.status, Some(BlockStatus::StatusUTXOValid));
    assert_eq!(info.blue_score, Some(1));

    let virtual_info = consensus.get_virtual_info().unwrap();
    assert_eq!(virtual_info.parents, vec![a_hash]);
    assert_eq!(virtual_info.blue_score, 2);
    assert_eq!(virtual_info.daa_score, 2);
    assert_eq!(virtual_info.bits, Params::simnet().genesis.bits);

    let relations = consensus.get_block_relations(a_hash).unwrap();
    assert_eq!(relations.parents, vec![genesis]);
    assert_eq!(relations.selected_parent, genesis);
    assert!(relations.children.is_empty());
    assert_eq!(consensus.get_block_relations(genesis).unwrap().children, vec![a_hash]);

    let acceptance = consensus.get_block_acceptance_data(a_hash).unwrap();
    assert_eq!(acceptance.len(), 1);
    assert_eq!(acceptance[0].block_hash, a_hash);
    assert_eq!(acceptance[0].accepted_transaction_ids, vec![a.transactions[0].id()]);

    // the genesis coinbase has no outputs, so the set holds exactly the
    // coinbase output just mined
    let utxos = consensus.get_virtual_utxos(vec![a_hash], None, 10).unwrap();
    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].0, TransactionOutpoint::new(a.transactions[0].id(), 0));
    assert_eq!(utxos[0].1.amount, 500 * SOMPI_PER_COIN);
    assert_eq!(utxos[0].1.block_daa_score, 1);
    assert!(utxos[0].1.is_coinbase);

    let b = mine_block(&consensus, Vec::new());
    let c = mine_block(&consensus, Vec::new());
    let c_hash = c.hash();
    assert_eq!(consensus.get_virtual_selected_parent_blue_score().unwrap(), 3);
    assert!(consensus.is_in_selected_parent_chain_of(a_hash, c_hash).unwrap());
    assert!(!consensus.is_in_selected_parent_chain_of(c_hash, a_hash).unwrap());

    let sync_info = consensus.get_sync_info().unwrap();
    assert_eq!(sync_info.headers_selected_tip, c_hash);
    assert_eq!(sync_info.header_count, 4);
    assert_eq!(sync_info.block_count, 4);

    // locator steps double while descending: scores 3, 2, 0
    let locator = consensus.create_block_locator(genesis, c_hash, 0).unwrap();
    assert_eq!(locator, vec![c_hash, b.hash(), genesis]);
    let truncated = consensus.create_block_locator(genesis, c_hash, 2).unwrap();
    assert_eq!(truncated, vec![c_hash, genesis]);
    assert!(matches!(
        consensus.create_block_locator(c_hash, genesis, 0),
        Err(ConsensusError::InvalidLocatorBounds { .. })
    ));
}

#[test]
fn test_resubmissions_and_invalid_blocks_are_remembered() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);

    let a = mine_block(&consensus, Vec::new());
    let a_hash = a.hash();

    let err = consensus.validate_and_insert_block(a.clone(), false).unwrap_err();
    assert_eq!(err.as_rule_error(), Some(&RuleError::DuplicateBlock(a_hash)));
    let err = consensus
        .validate_and_insert_block(Block::from_header(a.header.clone()), true)
        .unwrap_err();
    assert_eq!(err.as_rule_error(), Some(&RuleError::DuplicateBlock(a_hash)));

    // a body that does not match the header's merkle commitment
    let mut bad = consensus.build_block_template(miner_script(9), Vec::new()).unwrap();
    bad.transactions.push(spend(
        TransactionOutpoint::new(Hash::from_le_u64([77, 0, 0, 0]), 0),
        5,
        3,
    ));
    mine(&mut bad);
    let bad_hash = bad.hash();
    let err = consensus.validate_and_insert_block(bad.clone(), false).unwrap_err();
    assert!(matches!(err.as_rule_error(), Some(RuleError::BadMerkleRoot { .. })));

    // the verdict is recorded while the staged data was rolled back
    let info = consensus.get_block_info(bad_hash).unwrap();
    assert!(info.exists);
    assert_eq!(info.status, Some(BlockStatus::StatusInvalid));
    assert_eq!(info.blue_score, None);
    assert!(matches!(
        consensus.get_block(bad_hash),
        Err(ConsensusError::HeaderOnlyBlock(hash)) if hash == bad_hash
    ));
    assert!(matches!(consensus.get_block_header(bad_hash), Err(ConsensusError::Database(_))));
    assert_eq!(consensus.tips().unwrap(), vec![a_hash]);

    // resubmitting hits the recorded verdict instead of revalidating
    let err = consensus.validate_and_insert_block(bad, false).unwrap_err();
    assert_eq!(err.as_rule_error(), Some(&RuleError::KnownInvalid(bad_hash)));
}

#[test]
fn test_wrong_difficulty_is_rejected_without_a_trace() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);

    let mut block = consensus.build_block_template(miner_script(2), Vec::new()).unwrap();
    block.header.bits = 0x2000_ffff;
    block.header.finalize();
    let hash = block.hash();

    let err = consensus.validate_and_insert_block(block, false).unwrap_err();
    assert!(matches!(err.as_rule_error(), Some(RuleError::UnexpectedDifficulty { .. })));

    // cheap rejections must not grow the store
    assert!(!consensus.get_block_info(hash).unwrap().exists);
    assert!(matches!(consensus.get_block_status(hash), Err(ConsensusError::BlockNotFound(_))));
}

#[test]
fn test_header_first_sync_and_body_upgrade() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);

    let a = mine_block(&consensus, Vec::new());
    let a_hash = a.hash();
    let mut b = consensus.build_block_template(miner_script(5), Vec::new()).unwrap();
    mine(&mut b);
    let b_hash = b.hash();

    let status = consensus
        .validate_and_insert_block(Block::from_header(b.header.clone()), true)
        .unwrap();
    assert_eq!(status, BlockStatus::StatusHeaderOnly);

    // the header chain advanced while the virtual stayed on bodied blocks
    assert_eq!(consensus.get_headers_selected_tip().unwrap(), b_hash);
    assert_eq!(consensus.tips().unwrap(), vec![a_hash]);
    assert_eq!(consensus.get_virtual_selected_parent().unwrap(), a_hash);
    assert_eq!(consensus.get_block_info(b_hash).unwrap().blue_score, Some(2));
    assert_eq!(consensus.get_missing_block_body_hashes(b_hash).unwrap(), vec![b_hash]);
    assert!(matches!(
        consensus.get_block(b_hash),
        Err(ConsensusError::HeaderOnlyBlock(hash)) if hash == b_hash
    ));
    assert!(consensus.get_block_even_if_header_only(b_hash).unwrap().transactions.is_empty());

    // the body arrives later and upgrades the block in place
    let status = consensus.validate_and_insert_block(b.clone(), false).unwrap();
    assert_eq!(status, BlockStatus::StatusUTXOValid);
    assert_eq!(consensus.tips().unwrap(), vec![b_hash]);
    assert_eq!(consensus.get_virtual_selected_parent().unwrap(), b_hash);
    assert!(consensus.get_missing_block_body_hashes(b_hash).unwrap().is_empty());
    assert_eq!(consensus.get_block(b_hash).unwrap().transactions.len(), 1);

    let err = consensus.validate_and_insert_block(b, false).unwrap_err();
    assert_eq!(err.as_rule_error(), Some(&RuleError::DuplicateBlock(b_hash)));
}

#[test]
fn test_block_with_missing_inputs_stays_pending() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);

    let a = mine_block(&consensus, Vec::new());
    let bogus = TransactionOutpoint::new(Hash::from_le_u64([123, 0, 0, 0]), 7);
    let mut c = consensus
        .build_block_template(miner_script(1), vec![spend(bogus, 50, 1)])
        .unwrap();
    mine(&mut c);
    let c_hash = c.hash();

    let status = consensus.validate_and_insert_block(c.clone(), false).unwrap();
    assert_eq!(status, BlockStatus::StatusUTXOPendingVerification);
    assert_eq!(consensus.get_block_status(c_hash).unwrap(), BlockStatus::StatusUTXOPendingVerification);

    // the virtual still rides the block even though its state is unverified
    assert_eq!(consensus.tips().unwrap(), vec![c_hash]);
    assert_eq!(consensus.get_virtual_selected_parent().unwrap(), c_hash);

    // its UTXO writes were rolled back wholesale: the prior coinbase
    // survives and the pending block contributed nothing
    let utxos = consensus.get_virtual_utxos(vec![c_hash], None, 10).unwrap();
    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].0.transaction_id, a.transactions[0].id());
    assert!(matches!(consensus.get_block_acceptance_data(c_hash), Err(ConsensusError::Database(_))));

    let err = consensus.validate_and_insert_block(c, false).unwrap_err();
    assert_eq!(err.as_rule_error(), Some(&RuleError::DuplicateBlock(c_hash)));
}

#[test]
fn test_spending_a_coinbase_output_updates_the_utxo_set() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);

    let a = mine_block(&consensus, Vec::new());
    let coinbase_outpoint = TransactionOutpoint::new(a.transactions[0].id(), 0);
    let subsidy = a.transactions[0].outputs[0].value;

    let tx = spend(coinbase_outpoint, subsidy, 4);
    let tx_id = tx.id();
    let b = mine_block(&consensus, vec![tx]);

    let utxos = consensus.get_virtual_utxos(vec![b.hash()], None, 10).unwrap();
    let outpoints: Vec<TransactionOutpoint> = utxos.iter().map(|(outpoint, _)| *outpoint).collect();
    assert_eq!(utxos.len(), 2);
    assert!(!outpoints.contains(&coinbase_outpoint));
    assert!(outpoints.contains(&TransactionOutpoint::new(tx_id, 0)));
    assert!(outpoints.contains(&TransactionOutpoint::new(b.transactions[0].id(), 0)));

    let (_, entry) = utxos.iter().find(|(outpoint, _)| outpoint.transaction_id == tx_id).unwrap();
    assert_eq!(entry.amount, subsidy);
    assert_eq!(entry.block_daa_score, 2);
    assert!(!entry.is_coinbase);

    let acceptance = consensus.get_block_acceptance_data(b.hash()).unwrap();
    assert_eq!(acceptance[0].accepted_transaction_ids, vec![b.transactions[0].id(), tx_id]);
}

#[test]
fn test_sibling_tips_merge_and_resolve_by_work_then_hash() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);

    let a = mine_block(&consensus, Vec::new());
    let a_hash = a.hash();

    // two children of the same parent, built before either is inserted so
    // both templates point at `a`
    let mut b1 = consensus.build_block_template(miner_script(1), Vec::new()).unwrap();
    let mut b2 = consensus.build_block_template(miner_script(2), Vec::new()).unwrap();
    mine(&mut b1);
    mine(&mut b2);
    assert_eq!(b1.header.parents, vec![a_hash]);
    assert_eq!(b2.header.parents, vec![a_hash]);
    assert_eq!(b1.header.blue_work, b2.header.blue_work);

    assert_eq!(consensus.validate_and_insert_block(b1.clone(), false).unwrap(), BlockStatus::StatusUTXOValid);
    assert_eq!(consensus.validate_and_insert_block(b2.clone(), false).unwrap(), BlockStatus::StatusUTXOValid);

    let mut tips = consensus.tips().unwrap();
    tips.sort();
    let mut expected = vec![b1.hash(), b2.hash()];
    expected.sort();
    assert_eq!(tips, expected);

    // equal blue work, so the higher hash wins the tie
    let (winner, loser) = if b1.hash() > b2.hash() { (&b1, &b2) } else { (&b2, &b1) };
    assert_eq!(consensus.get_virtual_selected_parent().unwrap(), winner.hash());
    assert_eq!(consensus.anticone(loser.hash()).unwrap(), vec![winner.hash()]);
    assert!(consensus.is_in_selected_parent_chain_of(a_hash, winner.hash()).unwrap());
    assert!(!consensus.is_in_selected_parent_chain_of(loser.hash(), winner.hash()).unwrap());

    let path = consensus.get_virtual_selected_parent_chain_from_block(loser.hash()).unwrap();
    assert_eq!(path.removed, vec![loser.hash()]);
    assert_eq!(path.added, vec![winner.hash()]);

    assert!(matches!(
        consensus.create_block_locator(loser.hash(), winner.hash(), 0),
        Err(ConsensusError::InvalidLocatorBounds { .. })
    ));

    // the next template merges both tips and blues them all
    let merge = mine_block(&consensus, Vec::new());
    assert_eq!(merge.header.parents.len(), 2);
    assert_eq!(merge.header.blue_score, 4);
    assert_eq!(consensus.tips().unwrap(), vec![merge.hash()]);
    assert_eq!(consensus.get_virtual_selected_parent().unwrap(), merge.hash());
    let utxos = consensus.get_virtual_utxos(vec![merge.hash()], None, 10).unwrap();
    assert_eq!(utxos.len(), 4);
}

#[test]
fn test_pruning_point_import_reroots_the_dag() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);
    let genesis = Params::simnet().genesis.hash();

    // a stray chunk from an abandoned sync attempt is dropped entirely
    let stray = (
        TransactionOutpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0),
        UtxoEntry::new(1, miner_script(1), 0, false),
    );
    consensus.append_imported_pruning_point_utxos(vec![stray]).unwrap();
    consensus.clear_imported_pruning_point_data().unwrap();

    // the real set arrives in two chunks
    let utxo_a = (
        TransactionOutpoint::new(Hash::from_le_u64([2, 0, 0, 0]), 0),
        UtxoEntry::new(700, miner_script(2), 900, false),
    );
    let utxo_b = (
        TransactionOutpoint::new(Hash::from_le_u64([3, 0, 0, 0]), 1),
        UtxoEntry::new(300, miner_script(3), 950, true),
    );
    consensus.append_imported_pruning_point_utxos(vec![utxo_a.clone()]).unwrap();
    consensus.append_imported_pruning_point_utxos(vec![utxo_b.clone()]).unwrap();

    let commitment = utxo_commitment([(&utxo_a.0, &utxo_a.1), (&utxo_b.0, &utxo_b.1)]);
    let mut point = Block::from_header(Header::new_finalized(
        BLOCK_VERSION,
        vec![Hash::from_le_u64([0xbeef, 0, 0, 0])],
        ZERO_HASH,
        commitment,
        Params::simnet().genesis.timestamp + 1_000_000,
        Params::simnet().genesis.bits,
        0,
        1_000,
        1_000,
        5_000,
        ZERO_HASH,
    ));

    // a commitment mismatch rejects the candidate without touching state
    let mut wrong = point.clone();
    wrong.header.utxo_commitment = ZERO_HASH;
    mine(&mut wrong);
    let err = consensus.validate_and_insert_imported_pruning_point(wrong).unwrap_err();
    assert!(matches!(err.as_rule_error(), Some(RuleError::BadUtxoCommitment { .. })));
    assert_eq!(consensus.pruning_point().unwrap(), genesis);

    mine(&mut point);
    let point_hash = point.hash();
    consensus.validate_and_insert_imported_pruning_point(point.clone()).unwrap();

    // the imported point replaced genesis as chain root and lone tip
    assert_eq!(consensus.pruning_point().unwrap(), point_hash);
    assert_eq!(consensus.get_headers_selected_tip().unwrap(), point_hash);
    assert_eq!(consensus.tips().unwrap(), vec![point_hash]);
    assert_eq!(consensus.get_virtual_selected_parent().unwrap(), point_hash);
    assert_eq!(consensus.get_virtual_selected_parent_blue_score().unwrap(), 1_000);
    assert_eq!(consensus.get_block_status(point_hash).unwrap(), BlockStatus::StatusHeaderOnly);
    assert_eq!(consensus.get_block_info(point_hash).unwrap().blue_score, Some(1_000));
    assert_eq!(consensus.get_missing_block_body_hashes(point_hash).unwrap(), vec![point_hash]);
    assert!(consensus.is_valid_pruning_point(point_hash).unwrap());
    assert!(!consensus.is_valid_pruning_point(genesis).unwrap());

    // range queries serve the imported rows in outpoint order
    let served = consensus.get_pruning_point_utxos(point_hash, None, 10).unwrap();
    assert_eq!(served, vec![utxo_a.clone(), utxo_b.clone()]);
    let first = consensus.get_pruning_point_utxos(point_hash, None, 1).unwrap();
    assert_eq!(first, vec![utxo_a.clone()]);
    let rest = consensus.get_pruning_point_utxos(point_hash, Some(first[0].0), 10).unwrap();
    assert_eq!(rest, vec![utxo_b.clone()]);
    assert!(matches!(
        consensus.get_pruning_point_utxos(genesis, None, 10),
        Err(ConsensusError::Rule(RuleError::WrongPruningPointHash { .. }))
    ));

    // the virtual UTXO set was seeded from the same rows
    assert_eq!(consensus.get_virtual_utxos(vec![point_hash], None, 10).unwrap(), vec![utxo_a.clone(), utxo_b.clone()]);
    assert!(matches!(
        consensus.get_virtual_utxos(vec![genesis], None, 10),
        Err(ConsensusError::Rule(RuleError::WrongVirtualParents { .. }))
    ));

    // mining resumes over the imported point, spending an imported output
    let next = mine_block(&consensus, vec![spend(utxo_a.0, 700, 9)]);
    assert_eq!(next.header.parents, vec![point_hash]);
    assert_eq!(next.header.blue_score, 1_001);
    assert_eq!(next.header.pruning_point, point_hash);
    let utxos = consensus.get_virtual_utxos(vec![next.hash()], None, 10).unwrap();
    assert_eq!(utxos.len(), 3);
    assert!(utxos.iter().all(|(outpoint, _)| *outpoint != utxo_a.0));
}

#[test]
fn test_pruning_point_import_requires_a_fresh_dag() {
    let tmp = TempDir::new().unwrap();
    let consensus = open_consensus(&tmp);
    mine_block(&consensus, Vec::new());

    let mut point = Block::from_header(Header::new_finalized(
        BLOCK_VERSION,
        vec![Hash::from_le_u64([0xbeef, 0, 0, 0])],
        ZERO_HASH,
        ZERO_HASH,
        Params::simnet().genesis.timestamp + 1_000_000,
        Params::simnet().genesis.bits,
        0,
        1_000,
        1_000,
        5_000,
        ZERO_HASH,
    ));
    mine(&mut point);

    let err = consensus.validate_and_insert_imported_pruning_point(point).unwrap_err();
    assert_eq!(err.as_rule_error(), Some(&RuleError::PruningImportOnNonEmptyDag { headers: 2 }));
}
