//! Difficulty targets, compact bits and retargeting.

use std::sync::Arc;

use primitive_types::{U256, U512};

use consensus_core::Hash;
use database::stores::{GhostdagStore, HeaderStore};
use database::StagingArea;

use crate::errors::ConsensusResult;
use crate::model::services::{DifficultyManager, GhostdagManager};

/// Expands compact difficulty bits into a 256-bit target.
///
/// The compact form packs a byte size in the top octet and a 23-bit mantissa
/// below a sign bit. A set sign bit encodes a negative target and yields
/// zero; a size putting the mantissa beyond 256 bits saturates.
pub fn bits_to_target(bits: u32) -> U256 {
    if bits & 0x0080_0000 != 0 {
        return U256::zero();
    }
    let size = bits >> 24;
    let word = bits & 0x007f_ffff;
    if size <= 3 {
        U256::from(word >> (8 * (3 - size)))
    } else if size <= 32 {
        U256::from(word) << (8 * (size - 3)) as usize
    } else {
        U256::MAX
    }
}

/// Packs a target back into compact bits, normalizing away the sign bit.
pub fn target_to_bits(target: U256) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        target.low_u32() << (8 * (3 - size))
    } else {
        (target >> (8 * (size - 3))).low_u32()
    };
    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }
    compact | ((size as u32) << 24)
}

/// Expected number of hash attempts to find a block at the given bits,
/// `floor(2^256 / (target + 1))`, truncated to the blue work domain.
pub fn calc_block_work(bits: u32) -> u128 {
    let target = bits_to_target(bits);
    if target.is_zero() {
        return 0;
    }
    let (denominator, overflow) = target.overflowing_add(U256::one());
    if overflow {
        return 1;
    }
    ((!target) / denominator + U256::one()).low_u128()
}

/// Retargets over a window of ancestors along the selected parent lineage.
pub struct DbDifficultyManager {
    genesis_bits: u32,
    difficulty_window_size: usize,
    target_time_per_block: u64,
    ghostdag_manager: Arc<dyn GhostdagManager>,
    ghostdag_store: Arc<GhostdagStore>,
    header_store: Arc<HeaderStore>,
}

impl DbDifficultyManager {
    pub fn new(
        genesis_bits: u32,
        difficulty_window_size: usize,
        target_time_per_block: u64,
        ghostdag_manager: Arc<dyn GhostdagManager>,
        ghostdag_store: Arc<GhostdagStore>,
        header_store: Arc<HeaderStore>,
    ) -> Self {
        Self {
            genesis_bits,
            difficulty_window_size,
            target_time_per_block,
            ghostdag_manager,
            ghostdag_store,
            header_store,
        }
    }
}

impl DifficultyManager for DbDifficultyManager {
    fn required_bits(&self, area: &StagingArea, parents: &[Hash]) -> ConsensusResult<u32> {
        if self.difficulty_window_size < 2 {
            return Ok(self.genesis_bits);
        }
        let mut window = Vec::with_capacity(self.difficulty_window_size);
        let mut current = self.ghostdag_manager.find_selected_parent(area, parents)?;
        loop {
            let header = self.header_store.get(area, current)?;
            window.push((header.timestamp, header.bits));
            if window.len() == self.difficulty_window_size {
                break;
            }
            let data = self.ghostdag_store.get(area, current)?;
            if !data.has_selected_parent() {
                // underfull window: the chain is younger than one window
                return Ok(self.genesis_bits);
            }
            current = data.selected_parent;
        }

        let n = window.len() as u64;
        // per-element division keeps the running sum within 256 bits
        let mut average_target = U256::zero();
        for &(_, bits) in &window {
            average_target += bits_to_target(bits) / U256::from(n);
        }
        let min_timestamp = window.iter().map(|&(timestamp, _)| timestamp).min().unwrap_or_default();
        let max_timestamp = window.iter().map(|&(timestamp, _)| timestamp).max().unwrap_or_default();
        let expected_span = self.target_time_per_block * (n - 1);
        let actual_span = (max_timestamp - min_timestamp).clamp(expected_span / 4, expected_span * 4);

        let scaled = average_target.full_mul(U256::from(actual_span)) / U512::from(expected_span);
        let new_target = if scaled.bits() > 256 {
            U256::MAX
        } else {
            let mut buf = [0u8; 64];
            scaled.to_big_endian(&mut buf);
            U256::from_big_endian(&buf[32..])
        };
        Ok(target_to_bits(new_target))
    }
}
