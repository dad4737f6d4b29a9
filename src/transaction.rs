//! Opaque, unique transaction identity.
//!
//! A transaction begins implicitly on its first lock acquisition (there is
//! no `begin()` call to make here — the lock manager grants on demand) and
//! ends when [`TransactionId::commit`] or [`TransactionId::abort`] releases
//! every lock it holds.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::database::Database;
use crate::types::VoidResult;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Eq, Hash, PartialEq, Clone, Copy)]
pub struct TransactionId {
    id: u64,
}

impl TransactionId {
    pub fn new() -> Self {
        TransactionId {
            id: NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Constructs a transaction id with a specific numeric value. Exposed
    /// for tests that need reproducible ids; production callers should use
    /// [`TransactionId::new`].
    pub fn with_id(id: u64) -> Self {
        TransactionId { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn commit(&self) -> VoidResult {
        Database::global().buffer_pool().transaction_complete(*self, true)
    }

    pub fn abort(&self) -> VoidResult {
        Database::global().buffer_pool().transaction_complete(*self, false)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx{}", self.id)
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = TransactionId::new();
        let b = TransactionId::new();
        assert_ne!(a, b);
    }
}
