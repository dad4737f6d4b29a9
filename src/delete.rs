//! One-shot operator: drains its child, deleting each tuple, then yields a
//! single tuple holding the number of rows deleted.

use std::sync::Arc;

use crate::database::Database;
use crate::field::{Field, Type};
use crate::op_iterator::OpIterator;
use crate::transaction::TransactionId;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;
use crate::types::DbResult;

pub struct Delete {
    tid: TransactionId,
    child: Box<dyn OpIterator>,
    tuple_desc: Arc<TupleDesc>,
    done: bool,
    opened: bool,
}

impl Delete {
    pub fn new(tid: TransactionId, child: Box<dyn OpIterator>) -> Self {
        Delete {
            tid,
            child,
            tuple_desc: Arc::new(TupleDesc::unnamed(vec![Type::Int32])),
            done: false,
            opened: false,
        }
    }
}

impl OpIterator for Delete {
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
            bp.delete_tuple(self.tid, t)?;
            count += 1;
        }
        self.done = true;
        Ok(Some(Tuple::new(self.tuple_desc.clone(), vec![Field::Int(count)])))
    }
}
