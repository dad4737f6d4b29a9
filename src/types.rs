use std::sync::{Arc, RwLock};

use crate::error::DbError;

/// Shared, interior-mutable handle; the common shape for anything owned
/// jointly by the buffer pool and the operator currently touching it.
pub type Pod<T> = Arc<RwLock<T>>;

pub type DbResult<T> = Result<T, DbError>;
pub type VoidResult = Result<(), DbError>;

/// Stable per-table identifier; see [`crate::heap_file::HeapFile::table_id`].
pub type TableId = u64;

pub const PAGE_SIZE: usize = 4096;
pub const DEFAULT_BUFFER_POOL_PAGES: usize = 50;
