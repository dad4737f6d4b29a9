mod aggregate;
mod aggregator;
mod buffer_pool;
mod catalog;
mod database;
mod delete;
mod error;
mod field;
mod heap_file;
mod heap_page;
mod histogram;
mod insert;
mod lock_manager;
mod log;
mod op_iterator;
mod page_id;
mod seq_scan;
mod table_stats;
mod transaction;
mod tuple;
mod tuple_desc;
mod types;
mod util;

pub use aggregate::Aggregate;
pub use aggregator::{AggregateOp, IntegerAggregator, StringAggregator, NO_GROUPING};
pub use buffer_pool::BufferPool;
pub use catalog::Catalog;
pub use database::Database;
pub use delete::Delete;
pub use error::DbError;
pub use field::{Field, Op, Type};
pub use heap_file::{DbFile, HeapFile, HeapFileIterator};
pub use heap_page::HeapPage;
pub use histogram::{IntHistogram, StringHistogram};
pub use insert::Insert;
pub use lock_manager::{LockManager, LockMode, Permission};
pub use log::init_log;
pub use op_iterator::OpIterator;
pub use page_id::PageId;
pub use seq_scan::SeqScan;
pub use table_stats::{compute_statistics, get_table_stats, set_table_stats, TableStats};
pub use transaction::TransactionId;
pub use tuple::{RecordId, Tuple};
pub use tuple_desc::{FieldDesc, TupleDesc};
pub use types::{DbResult, TableId, VoidResult, DEFAULT_BUFFER_POOL_PAGES, PAGE_SIZE};
pub use util::HandyRwLock;
