use crate::tx::{TransactionOutpoint, UtxoEntry};
use crate::{Hash, HASH_SIZE, ZERO_HASH};
use sha2::{Digest, Sha256};

/// Commitment over a UTXO set: double SHA-256 of every (outpoint, entry)
/// pair serialized in outpoint order. The empty set commits to [`ZERO_HASH`],
/// which is why the genesis header carries a zero utxo commitment.
///
/// Pairs must be fed in canonical outpoint order; the stores iterate that
/// way by construction.
pub fn utxo_commitment<'a, I>(pairs: I) -> Hash
where
    I: IntoIterator<Item = (&'a TransactionOutpoint, &'a UtxoEntry)>,
{
    let mut hasher = Sha256::new();
    let mut count: u64 = 0;
    for (outpoint, entry) in pairs {
        hasher.update(outpoint.transaction_id.as_bytes());
        hasher.update(outpoint.index.to_le_bytes());
        hasher.update(entry.amount.to_le_bytes());
        hasher.update(entry.script_public_key.version.to_le_bytes());
        hasher.update((entry.script_public_key.script.len() as u64).to_le_bytes());
        hasher.update(&entry.script_public_key.script);
        hasher.update(entry.block_daa_score.to_le_bytes());
        hasher.update([entry.is_coinbase as u8]);
        count += 1;
    }
    if count == 0 {
        return ZERO_HASH;
    }
    let first = hasher.finalize();
    let second = Sha256::digest(first);
    let mut bytes = [0u8; HASH_SIZE];
    bytes.copy_from_slice(&second);
    Hash::from_bytes(bytes)
}
