//! Crate-wide error taxonomy.
//!
//! One variant per failure category the page store, lock manager, and
//! operator pipeline need to distinguish: "retry the next page", "abort
//! the transaction", and "this is a bug" are not the same outcome.

use std::fmt;

/// One variant per Error Kind this core can raise.
#[derive(Debug)]
pub enum DbError {
    /// A tuple's `TupleDesc` does not match the page/file it was inserted into.
    SchemaMismatch(String),
    /// `HeapPage::insert_tuple` was called on a page with no free slot.
    PageFull,
    /// A read or delete targeted a page number at or beyond `num_pages()`.
    PageNotFound { table_id: u64, page_number: usize },
    /// Every cached page is dirty; eviction cannot make room.
    EvictionImpossible,
    /// A lock acquisition timed out, or the failure cascaded from one that did.
    TransactionAborted(String),
    /// An operator was used before `open` or after `close`, or an aggregate
    /// op was requested that its field type does not support.
    UsageError(String),
    /// Underlying file I/O failed.
    Io(std::io::Error),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            DbError::PageFull => write!(f, "page is full"),
            DbError::PageNotFound {
                table_id,
                page_number,
            } => write!(
                f,
                "page {} of table {} does not exist",
                page_number, table_id
            ),
            DbError::EvictionImpossible => {
                write!(f, "no page evictable: every cached page is dirty")
            }
            DbError::TransactionAborted(msg) => write!(f, "transaction aborted: {}", msg),
            DbError::UsageError(msg) => write!(f, "usage error: {}", msg),
            DbError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        DbError::Io(e)
    }
}
