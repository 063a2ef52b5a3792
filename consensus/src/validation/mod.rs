//! Block validation stages used by the insertion pipeline.

mod block_validator;

pub use block_validator::DbBlockValidator;
