use consensus_core::errors::RuleError;
use consensus_core::Hash;
use database::DbError;
use thiserror::Error;

/// Top-level error of every consensus operation.
///
/// The three classes matter to callers: a [`RuleError`] is a deterministic
/// verdict about submitted data, a [`DbError`] is an infrastructure fault
/// that aborts the operation without judging the block, and the not-found
/// variants answer queries about hashes the DAG does not know.
#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("block {0} does not exist")]
    BlockNotFound(Hash),

    #[error("block {0} exists as a header only and carries no body")]
    HeaderOnlyBlock(Hash),

    #[error("block locator low hash {low} is not in the selected parent chain of {high}")]
    InvalidLocatorBounds { low: Hash, high: Hash },

    #[error("the consensus service has stopped")]
    ServiceStopped,
}

impl ConsensusError {
    /// True when the error is a rule verdict rather than a fault.
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, ConsensusError::Rule(_))
    }

    pub fn as_rule_error(&self) -> Option<&RuleError> {
        match self {
            ConsensusError::Rule(err) => Some(err),
            _ => None,
        }
    }
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes_are_distinguishable() {
        let rule: ConsensusError = RuleError::NoParents.into();
        assert!(rule.is_rule_violation());
        assert_eq!(rule.as_rule_error(), Some(&RuleError::NoParents));

        let db: ConsensusError = DbError::DatabaseClosed.into();
        assert!(!db.is_rule_violation());
        assert!(db.as_rule_error().is_none());
    }
}
