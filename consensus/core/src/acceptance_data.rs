use crate::tx::TransactionId;
use crate::Hash;
use serde::{Deserialize, Serialize};

/// AcceptanceData records, per merged block, which of its transactions the
/// accepting chain block admitted into the UTXO set.
pub type AcceptanceData = Vec<MergesetBlockAcceptanceData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergesetBlockAcceptanceData {
    pub block_hash: Hash,
    pub accepted_transaction_ids: Vec<TransactionId>,
}
