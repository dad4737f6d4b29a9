//! The pull-based operator protocol every query operator implements.

use std::sync::Arc;

use crate::error::DbError;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;
use crate::types::DbResult;

/// Uniform open/next/rewind/close lifecycle. `next` is provided: it
/// enforces that the operator has been opened (and not closed) before
/// deferring to the operator-specific `fetch_next` hook, the template
/// method this crate's operators all plug into.
pub trait OpIterator {
    fn open(&mut self) -> DbResult<()>;
    fn close(&mut self);
    fn rewind(&mut self) -> DbResult<()>;
    fn get_tuple_desc(&self) -> Arc<TupleDesc>;
    fn is_open(&self) -> bool;

    /// Operator-specific hook: produce the next tuple, or `None` at
    /// exhaustion. Never called while closed.
    fn fetch_next(&mut self) -> DbResult<Option<Tuple>>;

    fn next(&mut self) -> DbResult<Option<Tuple>> {
        if !self.is_open() {
            return Err(DbError::UsageError(
                "operator used before open or after close".to_string(),
            ));
        }
        self.fetch_next()
    }
}
