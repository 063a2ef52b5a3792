use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation state persisted per block.
///
/// The only admissible transitions are absent to any state, header-only to a
/// body-carrying state, and pending-verification to UTXO-valid. Invalid is
/// terminal and body-carrying states never regress to header-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockStatus {
    /// The block violated a consensus rule.
    StatusInvalid,
    /// The block's body was applied to the virtual UTXO set.
    StatusUTXOValid,
    /// The block has a body whose UTXO application has not succeeded yet.
    StatusUTXOPendingVerification,
    /// Only the header was submitted.
    StatusHeaderOnly,
}

impl BlockStatus {
    pub fn has_block_body(self) -> bool {
        matches!(self, Self::StatusUTXOValid | Self::StatusUTXOPendingVerification)
    }

    pub fn is_utxo_valid(self) -> bool {
        self == Self::StatusUTXOValid
    }

    pub fn is_invalid(self) -> bool {
        self == Self::StatusInvalid
    }

    pub fn is_header_only(self) -> bool {
        self == Self::StatusHeaderOnly
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StatusInvalid => "invalid",
            Self::StatusUTXOValid => "utxo-valid",
            Self::StatusUTXOPendingVerification => "utxo-pending-verification",
            Self::StatusHeaderOnly => "header-only",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_presence() {
        assert!(BlockStatus::StatusUTXOValid.has_block_body());
        assert!(BlockStatus::StatusUTXOPendingVerification.has_block_body());
        assert!(!BlockStatus::StatusHeaderOnly.has_block_body());
        assert!(!BlockStatus::StatusInvalid.has_block_body());
    }
}
