use serde::{Deserialize, Serialize};

use crate::utxo::utxo_collection::{UtxoCollection, UtxoCollectionExtensions};

/// Represents the changes a block's transactions cause to the UTXO set.
/// `remove` holds the consumed entries (kept whole for undo), `add` the
/// created ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UtxoDiff {
    pub add: UtxoCollection,
    pub remove: UtxoCollection,
}

impl UtxoDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// Applies the diff to a collection: removals first, then additions.
    pub fn apply_to(&self, collection: &mut UtxoCollection) {
        collection.remove_many(&self.remove);
        collection.add_many(&self.add);
    }
}
