//! Full scan of one table's [`HeapFile`] through the buffer pool.

use std::sync::Arc;

use crate::database::Database;
use crate::error::DbError;
use crate::heap_file::HeapFileIterator;
use crate::op_iterator::OpIterator;
use crate::transaction::TransactionId;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;
use crate::types::{DbResult, TableId};

pub struct SeqScan {
    tid: TransactionId,
    table_id: TableId,
    tuple_desc: Arc<TupleDesc>,
    iter: Option<HeapFileIterator>,
    opened: bool,
}

impl SeqScan {
    pub fn new(tid: TransactionId, table_id: TableId) -> DbResult<Self> {
        let tuple_desc = Database::global()
            .buffer_pool()
            .get_database_file(table_id)?
            .get_tuple_desc();
        Ok(SeqScan {
            tid,
            table_id,
            tuple_desc,
            iter: None,
            opened: false,
        })
    }
}

impl OpIterator for SeqScan {
    fn open(&mut self) -> DbResult<()> {
        let bp = Database::global().buffer_pool();
        let file = bp.get_database_file(self.table_id)?;
        let mut iter = file.iterator(self.tid);
        iter.open(bp)?;
        self.iter = Some(iter);
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(iter) = self.iter.as_mut() {
            iter.close();
        }
        self.iter = None;
        self.opened = false;
    }

    fn rewind(&mut self) -> DbResult<()> {
        let bp = Database::global().buffer_pool();
        match self.iter.as_mut() {
            Some(iter) => iter.rewind(bp),
            None => self.open(),
        }
    }

    fn get_tuple_desc(&self) -> Arc<TupleDesc> {
        self.tuple_desc.clone()
    }

    fn is_open(&self) -> bool {
        self.opened
    }

    fn fetch_next(&mut self) -> DbResult<Option<Tuple>> {
        let bp = Database::global().buffer_pool();
        match self.iter.as_mut() {
            Some(iter) => iter.next(bp),
            None => Err(DbError::UsageError("SeqScan used before open".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, Type};
    use crate::heap_file::HeapFile;
    use crate::tuple_desc::TupleDesc;
    use std::sync::Arc;

    #[test]
    fn scans_every_inserted_tuple() {
        let path = std::env::temp_dir().join(format!(
            "seq_scan_test_{:?}",
            std::thread::current().id()
        ));
        let _ = std::fs::remove_file(&path);
        let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32, Type::String { max_len: 8 }]));
        let file: Arc<dyn crate::heap_file::DbFile> =
            Arc::new(HeapFile::new(&path, desc.clone()).unwrap());
        let table_id = file.get_id();
        Database::global().add_table("seq_scan_test_table", file);

        let tid = TransactionId::new();
        let bp = Database::global().buffer_pool();
        bp.insert_tuple(tid, table_id, Tuple::new(desc.clone(), vec![Field::Int(1), Field::Str("a".into())]))
            .unwrap();
        bp.insert_tuple(tid, table_id, Tuple::new(desc, vec![Field::Int(2), Field::Str("bb".into())]))
            .unwrap();
        tid.commit().unwrap();

        let mut scan = SeqScan::new(TransactionId::new(), table_id).unwrap();
        scan.open().unwrap();
        let mut count = 0;
        while scan.next().unwrap().is_some() {
            count += 1;
        }
        scan.close();
        assert_eq!(count, 2);

        let _ = std::fs::remove_file(&path);
    }
}
