use serde::{Deserialize, Serialize};

use crate::config::constants::SOMPI_PER_COIN;
use crate::config::genesis::GenesisBlock;
use crate::KType;

/// Consensus parameters of one network deployment.
///
/// Every tunable the engine consults lives here; code never hardcodes
/// network-specific values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// The name of the network (e.g. "mainnet", "devnet", "simnet")
    pub network: String,
    pub genesis: GenesisBlock,
    /// GHOSTDAG security parameter: maximum anticone size of a blue block
    pub ghostdag_k: KType,
    /// Maximum number of direct parents a block may list
    pub max_block_parents: usize,
    /// Maximum size of a block's mergeset
    pub mergeset_size_limit: u64,
    /// Maximum blue-score depth a red block may be merged from
    pub merge_depth: u64,
    /// Blue-score depth of the finality point below the virtual
    pub finality_depth: u64,
    /// Blue-score depth of the pruning point below the virtual
    pub pruning_depth: u64,
    /// Number of ancestors feeding the difficulty retarget window
    pub difficulty_window_size: usize,
    /// Target time between blocks in milliseconds
    pub target_time_per_block: u64,
    /// How far a timestamp may run ahead of local time, milliseconds
    pub timestamp_deviation_tolerance: u64,
    /// Window feeding past median time; must be odd
    pub past_median_time_window_size: usize,
    /// Maximum total mass of a block
    pub max_block_mass: u64,
    /// Mass charged per serialized transaction byte
    pub mass_per_tx_byte: u64,
    /// DAA score at which the base subsidy starts halving
    pub deflationary_phase_daa_score: u64,
    /// Block subsidy in sompi before the deflationary phase
    pub pre_deflationary_phase_base_subsidy: u64,
    /// DAA score distance between subsidy halvings once deflationary
    pub subsidy_halving_interval: u64,
    /// Blocks a coinbase output must mature before it is spendable
    pub coinbase_maturity: u64,
}

impl Params {
    pub fn mainnet() -> Self {
        Self {
            network: "mainnet".to_string(),
            genesis: GenesisBlock {
                timestamp: 1_715_000_000_000,
                bits: 0x1e7fffff,
                nonce: 0x5c4f4,
                coinbase_payload: b"mainnet genesis".to_vec(),
            },
            ghostdag_k: 18,
            max_block_parents: 10,
            mergeset_size_limit: 180,
            merge_depth: 3_600,
            finality_depth: 86_400,
            pruning_depth: 185_798,
            difficulty_window_size: 2_641,
            target_time_per_block: 1_000,
            timestamp_deviation_tolerance: 132_000,
            past_median_time_window_size: 265,
            max_block_mass: 500_000,
            mass_per_tx_byte: 1,
            deflationary_phase_daa_score: 15_778_800,
            pre_deflationary_phase_base_subsidy: 500 * SOMPI_PER_COIN,
            subsidy_halving_interval: 31_536_000,
            coinbase_maturity: 100,
        }
    }

    pub fn devnet() -> Self {
        Self {
            network: "devnet".to_string(),
            genesis: GenesisBlock {
                timestamp: 1_715_100_000_000,
                bits: 0x207fffff,
                nonce: 0,
                coinbase_payload: b"devnet genesis".to_vec(),
            },
            ..Self::mainnet()
        }
    }

    /// Simulation network: trivial difficulty and short windows so tests can
    /// mine blocks instantly and exercise depth rules with small DAGs.
    pub fn simnet() -> Self {
        Self {
            network: "simnet".to_string(),
            genesis: GenesisBlock {
                timestamp: 1_715_200_000_000,
                bits: 0x207fffff,
                nonce: 0,
                coinbase_payload: b"simnet genesis".to_vec(),
            },
            ghostdag_k: 10,
            max_block_parents: 10,
            mergeset_size_limit: 40,
            merge_depth: 100,
            finality_depth: 200,
            pruning_depth: 500,
            difficulty_window_size: 50,
            target_time_per_block: 1_000,
            timestamp_deviation_tolerance: 3_600_000,
            past_median_time_window_size: 11,
            max_block_mass: 500_000,
            mass_per_tx_byte: 1,
            deflationary_phase_daa_score: 1_000_000,
            pre_deflationary_phase_base_subsidy: 500 * SOMPI_PER_COIN,
            subsidy_halving_interval: 100_000,
            coinbase_maturity: 10,
        }
    }
}
