use serde::{Deserialize, Serialize};

use crate::header::Header;
use crate::tx::Transaction;
use crate::Hash;

/// Complete block structure: header plus transactions.
///
/// A block whose transaction list is empty is a header-only block; the body
/// may be submitted later to upgrade it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self { header, transactions }
    }

    /// Wraps a bare header as a header-only block.
    pub fn from_header(header: Header) -> Self {
        Self { header, transactions: Vec::new() }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash
    }

    pub fn is_header_only(&self) -> bool {
        self.transactions.is_empty()
    }
}
