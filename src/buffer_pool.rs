//! In-memory page cache. Every page access funnels through here: it
//! acquires the right lock, serves cached pages, and evicts clean ones
//! under the FIFO-over-clean policy (NO STEAL: a dirty page is never
//! evicted ahead of its transaction's commit).

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, warn};

use crate::catalog::Catalog;
use crate::error::DbError;
use crate::heap_file::DbFile;
use crate::heap_page::HeapPage;
use crate::lock_manager::{LockManager, Permission};
use crate::page_id::PageId;
use crate::transaction::TransactionId;
use crate::tuple::Tuple;
use crate::types::{DbResult, TableId, VoidResult, DEFAULT_BUFFER_POOL_PAGES};
use crate::util::HandyRwLock;

#[derive(Default)]
struct Inner {
    order: VecDeque<PageId>,
    map: HashMap<PageId, Arc<RwLock<HeapPage>>>,
}

pub struct BufferPool {
    capacity: usize,
    lock_manager: LockManager,
    catalog: Arc<RwLock<Catalog>>,
    pages: Mutex<Inner>,
}

impl BufferPool {
    pub fn new(catalog: Arc<RwLock<Catalog>>) -> Self {
        BufferPool::with_capacity(catalog, DEFAULT_BUFFER_POOL_PAGES)
    }

    pub fn with_capacity(catalog: Arc<RwLock<Catalog>>, capacity: usize) -> Self {
        BufferPool {
            capacity,
            lock_manager: LockManager::new(),
            catalog,
            pages: Mutex::new(Inner::default()),
        }
    }

    pub fn lock_manager(&self) -> &LockManager {
        &self.lock_manager
    }

    pub fn get_database_file(&self, table_id: TableId) -> DbResult<Arc<dyn DbFile>> {
        self.catalog
            .rl()
            .get_database_file(table_id)
            .ok_or_else(|| DbError::UsageError(format!("table {} is not registered", table_id)))
    }

    /// Acquires the lock appropriate to `perm`, then returns the cached
    /// page, faulting it in from disk (after evicting if at capacity) if
    /// it is not already resident.
    pub fn get_page(&self, tid: TransactionId, pid: PageId, perm: Permission) -> DbResult<Arc<RwLock<HeapPage>>> {
        self.lock_manager.acquire(tid, pid, perm)?;

        let mut inner = self.pages.lock().unwrap();
        if let Some(page) = inner.map.get(&pid) {
            return Ok(page.clone());
        }
        self.ensure_capacity(&mut inner)?;
        let file = self.get_database_file(pid.table_id)?;
        let page = file.read_page(pid)?;
        let page = Arc::new(RwLock::new(page));
        inner.map.insert(pid, page.clone());
        inner.order.push_back(pid);
        Ok(page)
    }

    /// Releases `pid` for `tid` without going through transaction end.
    /// Breaks two-phase locking; documented escape hatch only.
    pub fn unsafe_release_page(&self, tid: TransactionId, pid: PageId) {
        self.lock_manager.release(tid, pid);
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.lock_manager.holds_lock(tid, pid)
    }

    pub fn insert_tuple(&self, tid: TransactionId, table_id: TableId, t: Tuple) -> VoidResult {
        let file = self.get_database_file(table_id)?;
        let dirtied = file.insert_tuple(self, tid, t)?;
        let mut inner = self.pages.lock().unwrap();
        for page in dirtied {
            let pid = page.read().unwrap().page_id();
            if !inner.map.contains_key(&pid) {
                self.ensure_capacity(&mut inner)?;
                inner.map.insert(pid, page);
                inner.order.push_back(pid);
            }
        }
        Ok(())
    }

    pub fn delete_tuple(&self, tid: TransactionId, t: Tuple) -> VoidResult {
        let table_id = t
            .record_id()
            .ok_or_else(|| DbError::UsageError("tuple has no record id to delete".to_string()))?
            .page_id
            .table_id;
        let file = self.get_database_file(table_id)?;
        file.delete_tuple(self, tid, t)?;
        Ok(())
    }

    /// Flushes dirty pages of `tid` on commit, or discards them on abort,
    /// then releases every lock `tid` holds.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> VoidResult {
        let held = self.lock_manager.pages_held_by(tid);
        let mut inner = self.pages.lock().unwrap();
        for pid in &held {
            let Some(page) = inner.map.get(pid).cloned() else {
                continue;
            };
            let dirty_by_tid = page.read().unwrap().is_dirty() == Some(tid);
            if !dirty_by_tid {
                continue;
            }
            if commit {
                let file = self.get_database_file(pid.table_id)?;
                {
                    let mut guard = page.write().unwrap();
                    file.write_page(&guard)?;
                    guard.mark_dirty(false, tid);
                }
                debug!("{} committed {}", tid, pid);
            } else {
                inner.map.remove(pid);
                inner.order.retain(|p| p != pid);
                debug!("{} aborted, discarded {}", tid, pid);
            }
        }
        drop(inner);
        self.lock_manager.release_all(tid);
        Ok(())
    }

    pub fn flush_all_pages(&self) -> VoidResult {
        let inner = self.pages.lock().unwrap();
        for (pid, page) in inner.map.iter() {
            let file = self.get_database_file(pid.table_id)?;
            let mut guard = page.write().unwrap();
            file.write_page(&guard)?;
            guard.mark_dirty(false, TransactionId::with_id(0));
        }
        Ok(())
    }

    pub fn flush_pages(&self, tid: TransactionId) -> VoidResult {
        let held = self.lock_manager.pages_held_by(tid);
        let inner = self.pages.lock().unwrap();
        for pid in held {
            if let Some(page) = inner.map.get(&pid) {
                if page.read().unwrap().is_dirty() == Some(tid) {
                    let file = self.get_database_file(pid.table_id)?;
                    let mut guard = page.write().unwrap();
                    file.write_page(&guard)?;
                    guard.mark_dirty(false, tid);
                }
            }
        }
        Ok(())
    }

    pub fn flush_page(&self, pid: PageId) -> VoidResult {
        let inner = self.pages.lock().unwrap();
        if let Some(page) = inner.map.get(&pid) {
            let file = self.get_database_file(pid.table_id)?;
            let mut guard = page.write().unwrap();
            file.write_page(&guard)?;
            guard.mark_dirty(false, TransactionId::with_id(0));
        }
        Ok(())
    }

    pub fn remove_page(&self, pid: PageId) {
        let mut inner = self.pages.lock().unwrap();
        inner.map.remove(&pid);
        inner.order.retain(|p| p != &pid);
    }

    /// Evicts the first clean page in insertion order if at capacity.
    /// Fails if every cached page is dirty (NO STEAL leaves no candidate).
    fn ensure_capacity(&self, inner: &mut Inner) -> VoidResult {
        if inner.map.len() < self.capacity {
            return Ok(());
        }
        let evict_at = inner.order.iter().position(|pid| {
            inner
                .map
                .get(pid)
                .map(|p| p.read().unwrap().is_dirty().is_none())
                .unwrap_or(false)
        });
        match evict_at {
            Some(i) => {
                let pid = inner.order.remove(i).unwrap();
                inner.map.remove(&pid);
                Ok(())
            }
            None => {
                warn!("buffer pool full and every cached page is dirty");
                Err(DbError::EvictionImpossible)
            }
        }
    }
}
