//!
//! # Transaction
//!
//! This module implements the consensus [`Transaction`] structure and related types.
//!

mod script_public_key;

pub use script_public_key::{ScriptPublicKey, ScriptPublicKeyVersion};

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::hashing;
use crate::Hash;

/// COINBASE_TRANSACTION_INDEX is the index of the coinbase transaction in every block
pub const COINBASE_TRANSACTION_INDEX: usize = 0;

/// A 32-byte transaction identifier.
pub type TransactionId = Hash;

pub type TransactionIndexType = u32;

/// Holds details about an individual transaction output in a utxo set, such
/// as whether or not it was contained in a coinbase tx, the daa score of the
/// block that accepts the tx, its public key script, and how much it pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
    pub block_daa_score: u64,
    pub is_coinbase: bool,
}

impl UtxoEntry {
    pub fn new(amount: u64, script_public_key: ScriptPublicKey, block_daa_score: u64, is_coinbase: bool) -> Self {
        Self { amount, script_public_key, block_daa_score, is_coinbase }
    }
}

/// Represents a transaction outpoint: a reference to an output of a previous
/// transaction. Ordered by transaction id bytes, then index, which fixes the
/// canonical order of utxo range queries.
#[derive(Eq, Default, Hash, PartialEq, Debug, Copy, Clone, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TransactionOutpoint {
    pub transaction_id: TransactionId,
    pub index: TransactionIndexType,
}

impl TransactionOutpoint {
    pub fn new(transaction_id: TransactionId, index: u32) -> Self {
        Self { transaction_id, index }
    }
}

impl Display for TransactionOutpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.transaction_id, self.index)
    }
}

/// Represents a transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub previous_outpoint: TransactionOutpoint,
    pub signature_script: Vec<u8>,
    pub sequence: u64,
}

impl TransactionInput {
    pub fn new(previous_outpoint: TransactionOutpoint, signature_script: Vec<u8>, sequence: u64) -> Self {
        Self { previous_outpoint, signature_script, sequence }
    }
}

/// Represents a transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: u64,
    pub script_public_key: ScriptPublicKey,
}

impl TransactionOutput {
    pub fn new(value: u64, script_public_key: ScriptPublicKey) -> Self {
        Self { value, script_public_key }
    }
}

/// Represents a transaction.
///
/// Scripts are opaque byte strings at this layer; script execution and
/// signature verification happen outside the consensus engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u64,
    pub payload: Vec<u8>,
}

impl Transaction {
    pub fn new(
        version: u16,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        lock_time: u64,
        payload: Vec<u8>,
    ) -> Self {
        Self { version, inputs, outputs, lock_time, payload }
    }

    /// The transaction id, excluding signature scripts.
    pub fn id(&self) -> TransactionId {
        hashing::tx::calculate_transaction_id(self)
    }

    /// A coinbase mints new coins and spends no previous outputs.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Size of the fixed serialized layout, the basis for mass accounting.
    pub fn estimated_size(&self) -> u64 {
        let mut size = 2 + 8 + 8 + 8 + 8 + self.payload.len() as u64;
        for input in &self.inputs {
            size += 32 + 4 + 8 + 8 + input.signature_script.len() as u64;
        }
        for output in &self.outputs {
            size += 8 + 2 + 8 + output.script_public_key.script.len() as u64;
        }
        size
    }
}
