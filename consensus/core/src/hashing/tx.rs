use crate::tx::{Transaction, TransactionId};

/// Computes a transaction id.
///
/// Signature scripts are excluded so the id stays stable while inputs are
/// being signed; everything else is serialized in a fixed layout.
pub fn calculate_transaction_id(tx: &Transaction) -> TransactionId {
    let mut bytes = Vec::with_capacity(64 + tx.inputs.len() * 48 + tx.outputs.len() * 48);
    bytes.extend_from_slice(&tx.version.to_le_bytes());
    bytes.extend_from_slice(&(tx.inputs.len() as u64).to_le_bytes());
    for input in &tx.inputs {
        bytes.extend_from_slice(input.previous_outpoint.transaction_id.as_bytes());
        bytes.extend_from_slice(&input.previous_outpoint.index.to_le_bytes());
        bytes.extend_from_slice(&input.sequence.to_le_bytes());
    }
    bytes.extend_from_slice(&(tx.outputs.len() as u64).to_le_bytes());
    for output in &tx.outputs {
        bytes.extend_from_slice(&output.value.to_le_bytes());
        bytes.extend_from_slice(&output.script_public_key.version.to_le_bytes());
        bytes.extend_from_slice(&(output.script_public_key.script.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&output.script_public_key.script);
    }
    bytes.extend_from_slice(&tx.lock_time.to_le_bytes());
    bytes.extend_from_slice(&(tx.payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&tx.payload);

    super::double_sha256(&bytes)
}
