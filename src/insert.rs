//! One-shot operator: drains its child into a table, then yields a single
//! tuple holding the number of rows inserted.

use std::sync::Arc;

use crate::database::Database;
use crate::field::{Field, Type};
use crate::op_iterator::OpIterator;
use crate::transaction::TransactionId;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;
use crate::types::{DbResult, TableId};

pub struct Insert {
    tid: TransactionId,
    child: Box<dyn OpIterator>,
    table_id: TableId,
    tuple_desc: Arc<TupleDesc>,
    done: bool,
    opened: bool,
}

impl Insert {
    pub fn new(tid: TransactionId, child: Box<dyn OpIterator>, table_id: TableId) -> Self {
        Insert {
            tid,
            child,
            table_id,
            tuple_desc: Arc::new(TupleDesc::unnamed(vec![Type::Int32])),
            done: false,
            opened: false,
        }
    }
}

impl OpIterator for Insert {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;
        self.done = false;
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
        self.opened = false;
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()?;
        self.done = false;
        Ok(())
    }

    fn get_tuple_desc(&self) -> Arc<TupleDesc> {
        self.tuple_desc.clone()
    }

    fn is_open(&self) -> bool {
        self.opened
    }

    fn fetch_next(&mut self) -> DbResult<Option<Tuple>> {
        if self.done {
            return Ok(None);
        }
        let bp = Database::global().buffer_pool();
        let mut count = 0i32;
        while let Some(t) = self.child.next()? {
            bp.insert_tuple(self.tid, self.table_id, t)?;
            count += 1;
        }
        self.done = true;
        Ok(Some(Tuple::new(self.tuple_desc.clone(), vec![Field::Int(count)])))
    }
}
