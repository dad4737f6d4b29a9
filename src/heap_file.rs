//! A table backed by one OS file: a flat sequence of [`HeapPage`]s.

use std::collections::hash_map::DefaultHasher;
use std::fs::{File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use log::debug;

use crate::buffer_pool::BufferPool;
use crate::error::DbError;
use crate::heap_page::HeapPage;
use crate::lock_manager::Permission;
use crate::page_id::PageId;
use crate::transaction::TransactionId;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;
use crate::types::{DbResult, TableId, PAGE_SIZE};

/// The contract the buffer pool and catalog program against; `HeapFile` is
/// the only implementation this core ships, but operators and the buffer
/// pool never depend on it directly.
pub trait DbFile: Send + Sync {
    fn read_page(&self, pid: PageId) -> DbResult<HeapPage>;
    fn write_page(&self, page: &HeapPage) -> DbResult<()>;
    fn insert_tuple(
        &self,
        buffer_pool: &BufferPool,
        tid: TransactionId,
        t: Tuple,
    ) -> DbResult<Vec<Arc<RwLock<HeapPage>>>>;
    fn delete_tuple(&self, buffer_pool: &BufferPool, tid: TransactionId, t: Tuple) -> DbResult<PageId>;
    fn iterator(&self, tid: TransactionId) -> HeapFileIterator;
    fn get_id(&self) -> TableId;
    fn get_tuple_desc(&self) -> Arc<TupleDesc>;
    fn num_pages(&self) -> DbResult<usize>;
}

pub struct HeapFile {
    file: Mutex<File>,
    table_id: TableId,
    tuple_desc: Arc<TupleDesc>,
}

impl HeapFile {
    pub fn new(path: impl AsRef<Path>, tuple_desc: Arc<TupleDesc>) -> DbResult<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        let canonical = std::fs::canonicalize(&path).unwrap_or(path);
        let mut hasher = DefaultHasher::new();
        canonical.to_string_lossy().hash(&mut hasher);
        let table_id = hasher.finish();
        Ok(HeapFile {
            file: Mutex::new(file),
            table_id,
            tuple_desc,
        })
    }
}

impl DbFile for HeapFile {
    fn read_page(&self, pid: PageId) -> DbResult<HeapPage> {
        let num_pages = self.num_pages()?;
        if pid.page_number >= num_pages {
            return Err(DbError::PageNotFound {
                table_id: self.table_id,
                page_number: pid.page_number,
            });
        }
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start((pid.page_number * PAGE_SIZE) as u64))?;
        let mut buf = vec![0u8; PAGE_SIZE];
        file.read_exact(&mut buf)?;
        debug!("read {} from {:?}", pid, self.table_id);
        HeapPage::construct(pid, self.tuple_desc.clone(), &buf)
    }

    fn write_page(&self, page: &HeapPage) -> DbResult<()> {
        let mut file = self.file.lock().unwrap();
        let offset = (page.page_id().page_number * PAGE_SIZE) as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&page.get_page_data(PAGE_SIZE))?;
        file.sync_data()?;
        debug!("wrote {} to {:?}", page.page_id(), self.table_id);
        Ok(())
    }

    fn insert_tuple(
        &self,
        buffer_pool: &BufferPool,
        tid: TransactionId,
        mut t: Tuple,
    ) -> DbResult<Vec<Arc<RwLock<HeapPage>>>> {
        let num_pages = self.num_pages()?;
        for page_number in (0..num_pages).rev() {
            let pid = PageId::new(self.table_id, page_number);
            let already_held = buffer_pool.lock_manager().holds_lock(tid, pid);
            let page = buffer_pool.get_page(tid, pid, Permission::ReadOnly)?;
            let has_room = page.read().unwrap().get_num_unused_slots() > 0;
            if has_room {
                let page = buffer_pool.get_page(tid, pid, Permission::ReadWrite)?;
                {
                    let mut guard = page.write().unwrap();
                    guard.insert_tuple(&mut t)?;
                    guard.mark_dirty(true, tid);
                }
                return Ok(vec![page]);
            } else if !already_held {
                buffer_pool.lock_manager().release(tid, pid);
            }
        }

        let pid = PageId::new(self.table_id, num_pages);
        buffer_pool.lock_manager().acquire_exclusive(tid, pid)?;
        let empty = HeapPage::create_empty_page_data(PAGE_SIZE, &self.tuple_desc);
        let mut page = HeapPage::construct(pid, self.tuple_desc.clone(), &empty)?;
        page.insert_tuple(&mut t)?;
        page.mark_dirty(true, tid);
        Ok(vec![Arc::new(RwLock::new(page))])
    }

    fn delete_tuple(&self, buffer_pool: &BufferPool, tid: TransactionId, t: Tuple) -> DbResult<PageId> {
        let rid = t
            .record_id()
            .ok_or_else(|| DbError::SchemaMismatch("tuple has no record id".to_string()))?;
        let page = buffer_pool.get_page(tid, rid.page_id, Permission::ReadWrite)?;
        {
            let mut guard = page.write().unwrap();
            guard.delete_tuple(&t)?;
            guard.mark_dirty(true, tid);
        }
        Ok(rid.page_id)
    }

    fn iterator(&self, tid: TransactionId) -> HeapFileIterator {
        HeapFileIterator {
            table_id: self.table_id,
            tid,
            page_number: 0,
            num_pages: 0,
            buffer: Vec::new(),
            buf_idx: 0,
            opened: false,
        }
    }

    fn get_id(&self) -> TableId {
        self.table_id
    }

    fn get_tuple_desc(&self) -> Arc<TupleDesc> {
        self.tuple_desc.clone()
    }

    fn num_pages(&self) -> DbResult<usize> {
        let file = self.file.lock().unwrap();
        let len = file.metadata()?.len() as usize;
        Ok((len + PAGE_SIZE - 1) / PAGE_SIZE)
    }
}

/// Pull iterator over every tuple of a [`HeapFile`], page 0 through the
/// last. Must be driven through the buffer pool so reads observe locking.
pub struct HeapFileIterator {
    table_id: TableId,
    tid: TransactionId,
    page_number: usize,
    num_pages: usize,
    buffer: Vec<Tuple>,
    buf_idx: usize,
    opened: bool,
}

impl HeapFileIterator {
    pub fn open(&mut self, buffer_pool: &BufferPool) -> DbResult<()> {
        self.num_pages = buffer_pool.get_database_file(self.table_id)?.num_pages()?;
        self.page_number = 0;
        self.buffer.clear();
        self.buf_idx = 0;
        self.opened = true;
        self.fill_buffer(buffer_pool)?;
        Ok(())
    }

    pub fn rewind(&mut self, buffer_pool: &BufferPool) -> DbResult<()> {
        self.open(buffer_pool)
    }

    pub fn close(&mut self) {
        self.opened = false;
        self.buffer.clear();
    }

    pub fn next(&mut self, buffer_pool: &BufferPool) -> DbResult<Option<Tuple>> {
        if !self.opened {
            return Err(DbError::UsageError("HeapFileIterator used before open".to_string()));
        }
        if self.buf_idx >= self.buffer.len() {
            self.fill_buffer(buffer_pool)?;
            if self.buf_idx >= self.buffer.len() {
                return Ok(None);
            }
        }
        let t = self.buffer[self.buf_idx].clone();
        self.buf_idx += 1;
        Ok(Some(t))
    }

    /// Advances page by page, skipping empty ones, until the next
    /// non-empty page is buffered or pages are exhausted.
    fn fill_buffer(&mut self, buffer_pool: &BufferPool) -> DbResult<()> {
        while self.page_number < self.num_pages {
            let pid = PageId::new(self.table_id, self.page_number);
            self.page_number += 1;
            let page = buffer_pool.get_page(self.tid, pid, Permission::ReadOnly)?;
            let tuples: Vec<Tuple> = page.read().unwrap().iterator().collect();
            if !tuples.is_empty() {
                self.buffer = tuples;
                self.buf_idx = 0;
                return Ok(());
            }
        }
        self.buffer.clear();
        self.buf_idx = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, Type};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "heap_file_test_{}_{:?}",
            name,
            std::thread::current().id()
        ))
    }

    #[test]
    fn new_file_has_zero_pages() {
        let path = temp_path("zero_pages");
        let _ = std::fs::remove_file(&path);
        let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32]));
        let hf = HeapFile::new(&path, desc).unwrap();
        assert_eq!(hf.num_pages().unwrap(), 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn table_id_is_stable_across_reopen() {
        let path = temp_path("stable_id");
        let _ = std::fs::remove_file(&path);
        let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32]));
        let id1 = HeapFile::new(&path, desc.clone()).unwrap().get_id();
        let id2 = HeapFile::new(&path, desc).unwrap().get_id();
        assert_eq!(id1, id2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn write_then_read_page_round_trips() {
        let path = temp_path("write_read");
        let _ = std::fs::remove_file(&path);
        let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32, Type::Int32]));
        let hf = HeapFile::new(&path, desc.clone()).unwrap();
        let pid = PageId::new(hf.get_id(), 0);
        let empty = HeapPage::create_empty_page_data(PAGE_SIZE, &desc);
        let mut page = HeapPage::construct(pid, desc.clone(), &empty).unwrap();
        let mut t = Tuple::new(desc, vec![Field::Int(9), Field::Int(9)]);
        page.insert_tuple(&mut t).unwrap();
        hf.write_page(&page).unwrap();

        assert_eq!(hf.num_pages().unwrap(), 1);
        let back = hf.read_page(pid).unwrap();
        let tuples: Vec<Tuple> = back.iterator().collect();
        assert_eq!(tuples.len(), 1);
        assert_eq!(*tuples[0].field(0), Field::Int(9));
        let _ = std::fs::remove_file(&path);
    }
}
