use crate::tx::TransactionId;
use crate::Hash;
use thiserror::Error;

/// A consensus rule violation.
///
/// Rule violations are deterministic verdicts about a block's content. They
/// are the only error class that may mark a block invalid; infrastructure
/// faults never do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("block {0} was already submitted and processed")]
    DuplicateBlock(Hash),

    #[error("block {0} is known to be invalid")]
    KnownInvalid(Hash),

    #[error("block {0} was submitted as header-only but carries {1} transactions")]
    HeaderOnlyHasBody(Hash, usize),

    #[error("wrong block version: got {got}, expected {expected}")]
    WrongBlockVersion { got: u16, expected: u16 },

    #[error("block has no parents")]
    NoParents,

    #[error("block has {got} parents, above the limit of {max}")]
    TooManyParents { got: usize, max: usize },

    #[error("block lists parent {0} more than once")]
    DuplicateParents(Hash),

    #[error("block timestamp {timestamp} is more than {tolerance}ms ahead of the current time {now}")]
    TimeTooFarIntoFuture { timestamp: u64, now: u64, tolerance: u64 },

    #[error("block parents {0:?} are unknown to the dag")]
    MissingParents(Vec<Hash>),

    #[error("block difficulty bits {got:#010x} differ from the expected {expected:#010x}")]
    UnexpectedDifficulty { got: u32, expected: u32 },

    #[error("block hash {0} does not satisfy its difficulty target")]
    InvalidProofOfWork(Hash),

    #[error("merkle root mismatch: header commits to {expected}, transactions hash to {got}")]
    BadMerkleRoot { expected: Hash, got: Hash },

    #[error("first transaction of a block body must be a coinbase")]
    FirstTxNotCoinbase,

    #[error("transaction {0} at position {1} is an extra coinbase")]
    MultipleCoinbases(TransactionId, usize),

    #[error("transaction {0} appears in the block more than once")]
    DuplicateTransactions(TransactionId),

    #[error("non-coinbase transaction {0} has no inputs")]
    NoTxInputs(TransactionId),

    #[error("block mass {got} exceeds the limit of {max}")]
    ExceedsMassLimit { got: u64, max: u64 },

    #[error("mergeset of size {got} exceeds the limit of {max}")]
    MergesetTooBig { got: u64, max: u64 },

    #[error("header blue score {got} differs from the computed {expected}")]
    UnexpectedHeaderBlueScore { got: u64, expected: u64 },

    #[error("header blue work {got} differs from the computed {expected}")]
    UnexpectedHeaderBlueWork { got: u128, expected: u128 },

    #[error("header daa score {got} differs from the computed {expected}")]
    UnexpectedHeaderDaaScore { got: u64, expected: u64 },

    #[error("block timestamp {timestamp} is not later than the past median time {past_median_time}")]
    TimeTooOld { timestamp: u64, past_median_time: u64 },

    #[error("red block {red} of block {block} is not in the future of its merge depth root")]
    ViolatingBoundedMergeDepth { block: Hash, red: Hash },

    #[error("block {block} does not descend from the finality point {finality_point}")]
    ViolatingFinality { block: Hash, finality_point: Hash },

    #[error("parent {0} is in the past of the pruning point")]
    ViolatingPruningPoint(Hash),

    #[error("header pruning point {got} differs from the expected {expected}")]
    WrongHeaderPruningPoint { got: Hash, expected: Hash },

    #[error("expected pruning point {expected} but the current one is {current}")]
    WrongPruningPointHash { expected: Hash, current: Hash },

    #[error("expected virtual parents {expected:?} but the actual ones are {actual:?}")]
    WrongVirtualParents { expected: Vec<Hash>, actual: Vec<Hash> },

    #[error("header utxo commitment {expected} does not match the imported utxo set hash {got}")]
    BadUtxoCommitment { expected: Hash, got: Hash },

    #[error("pruning point import requires a dag with no blocks beyond genesis, found {headers} headers")]
    PruningImportOnNonEmptyDag { headers: u64 },
}

pub type RuleResult<T> = Result<T, RuleError>;
