pub mod utxo_collection;
pub mod utxo_diff;

pub use utxo_collection::UtxoCollection;
pub use utxo_diff::UtxoDiff;
