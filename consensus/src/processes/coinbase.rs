//! Coinbase construction and structural validation.

use consensus_core::block::Block;
use consensus_core::config::constants::TX_VERSION;
use consensus_core::errors::RuleError;
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionOutput};

use crate::errors::ConsensusResult;
use crate::model::services::CoinbaseManager;

/// Subsidy schedule with a fixed emission before the deflationary phase and
/// halvings at a fixed daa-score interval after it.
pub struct HalvingCoinbaseManager {
    deflationary_phase_daa_score: u64,
    pre_deflationary_phase_base_subsidy: u64,
    subsidy_halving_interval: u64,
}

impl HalvingCoinbaseManager {
    pub fn new(
        deflationary_phase_daa_score: u64,
        pre_deflationary_phase_base_subsidy: u64,
        subsidy_halving_interval: u64,
    ) -> Self {
        Self { deflationary_phase_daa_score, pre_deflationary_phase_base_subsidy, subsidy_halving_interval }
    }
}

impl CoinbaseManager for HalvingCoinbaseManager {
    fn block_subsidy(&self, daa_score: u64) -> u64 {
        if daa_score < self.deflationary_phase_daa_score {
            return self.pre_deflationary_phase_base_subsidy;
        }
        let halvings = (daa_score - self.deflationary_phase_daa_score) / self.subsidy_halving_interval;
        if halvings >= 63 {
            return 0;
        }
        self.pre_deflationary_phase_base_subsidy >> halvings
    }

    fn expected_coinbase(&self, daa_score: u64, miner_script: ScriptPublicKey) -> Transaction {
        let subsidy = self.block_subsidy(daa_score);
        // the payload pins the daa score and subsidy, making coinbases of
        // sibling blocks distinct transactions
        let mut payload = Vec::with_capacity(16);
        payload.extend_from_slice(&daa_score.to_le_bytes());
        payload.extend_from_slice(&subsidy.to_le_bytes());
        Transaction::new(TX_VERSION, Vec::new(), vec![TransactionOutput::new(subsidy, miner_script)], 0, payload)
    }

    fn validate_coinbase(&self, block: &Block) -> ConsensusResult<()> {
        let first = block.transactions.first().ok_or(RuleError::FirstTxNotCoinbase)?;
        if !first.is_coinbase() {
            return Err(RuleError::FirstTxNotCoinbase.into());
        }
        for (position, tx) in block.transactions.iter().enumerate().skip(1) {
            if tx.is_coinbase() {
                return Err(RuleError::MultipleCoinbases(tx.id(), position).into());
            }
        }
        Ok(())
    }
}
