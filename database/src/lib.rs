pub mod db;
pub mod errors;
pub mod staging;
pub mod stores;

pub use db::Database;
pub use errors::{DbError, DbResult, DbResultExtensions};
pub use staging::{StagedWrite, StagingArea, StoreId};
