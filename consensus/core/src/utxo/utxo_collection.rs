use std::collections::BTreeMap;

use crate::tx::{TransactionOutpoint, UtxoEntry};

/// An in-memory UTXO set fragment keyed by outpoint.
///
/// A BTreeMap keeps entries in canonical outpoint order, matching the order
/// of the persisted virtual UTXO set.
pub type UtxoCollection = BTreeMap<TransactionOutpoint, UtxoEntry>;

/// Extension helpers over [`UtxoCollection`].
pub trait UtxoCollectionExtensions {
    /// Adds every entry of `other`, overwriting on collision.
    fn add_many(&mut self, other: &UtxoCollection);

    /// Removes every outpoint of `other`.
    fn remove_many(&mut self, other: &UtxoCollection);
}

impl UtxoCollectionExtensions for UtxoCollection {
    fn add_many(&mut self, other: &UtxoCollection) {
        for (outpoint, entry) in other.iter() {
            self.insert(*outpoint, entry.clone());
        }
    }

    fn remove_many(&mut self, other: &UtxoCollection) {
        for outpoint in other.keys() {
            self.remove(outpoint);
        }
    }
}
