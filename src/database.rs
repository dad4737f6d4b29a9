//! Process-wide singleton wiring the catalog and buffer pool together.
//!
//! Built on `once_cell::sync::OnceCell` rather than a hand-rolled
//! raw-pointer singleton.

use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;

use crate::buffer_pool::BufferPool;
use crate::catalog::Catalog;
use crate::heap_file::DbFile;

static DB: OnceCell<Database> = OnceCell::new();

pub struct Database {
    catalog: Arc<RwLock<Catalog>>,
    buffer_pool: BufferPool,
}

impl Database {
    fn new() -> Database {
        let catalog = Arc::new(RwLock::new(Catalog::new()));
        let buffer_pool = BufferPool::new(catalog.clone());
        Database { catalog, buffer_pool }
    }

    pub fn global() -> &'static Database {
        DB.get_or_init(Database::new)
    }

    pub fn catalog(&self) -> &Arc<RwLock<Catalog>> {
        &self.catalog
    }

    pub fn buffer_pool(&self) -> &BufferPool {
        &self.buffer_pool
    }

    pub fn add_table(&self, name: impl Into<String>, file: Arc<dyn DbFile>) {
        self.catalog.write().unwrap().add_table(name, file);
    }
}
