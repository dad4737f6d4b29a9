//! The `Aggregate` operator: drains its child into an [`IntegerAggregator`]
//! or [`StringAggregator`] at open, then replays the computed groups.

use std::sync::Arc;

use crate::aggregator::{AggregateOp, IntegerAggregator, StringAggregator};
use crate::error::DbError;
use crate::field::{Field, Type};
use crate::op_iterator::OpIterator;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;
use crate::types::DbResult;

pub struct Aggregate {
    child: Box<dyn OpIterator>,
    a_field: usize,
    g_field: Option<usize>,
    op: AggregateOp,
    tuple_desc: Arc<TupleDesc>,
    results: Vec<Tuple>,
    idx: usize,
    opened: bool,
}

impl Aggregate {
    pub fn new(
        child: Box<dyn OpIterator>,
        a_field: usize,
        g_field: Option<usize>,
        op: AggregateOp,
    ) -> DbResult<Self> {
        let child_desc = child.get_tuple_desc();
        let a_type = child_desc.field_type(a_field);
        if matches!(a_type, Type::String { .. }) && op != AggregateOp::Count {
            return Err(DbError::UsageError(format!(
                "cannot apply {} to a STRING field",
                op
            )));
        }
        if matches!(a_type, Type::Double) {
            return Err(DbError::UsageError(format!(
                "cannot apply {} to a DOUBLE field",
                op
            )));
        }

        let agg_name = child_desc.field_name(a_field).unwrap_or("").to_string();
        let col_name = format!("{}({})", op, agg_name);
        let tuple_desc = match g_field {
            Some(gi) => TupleDesc::new(vec![
                (child_desc.field_type(gi), child_desc.field_name(gi).map(str::to_string)),
                (Type::Int32, Some(col_name)),
            ]),
            None => TupleDesc::new(vec![(Type::Int32, Some(col_name))]),
        };

        Ok(Aggregate {
            child,
            a_field,
            g_field,
            op,
            tuple_desc: Arc::new(tuple_desc),
            results: Vec::new(),
            idx: 0,
            opened: false,
        })
    }

    fn build_tuple(&self, key: Field, value: i32) -> Tuple {
        let fields = match self.g_field {
            Some(_) => vec![key, Field::Int(value)],
            None => vec![Field::Int(value)],
        };
        Tuple::new(self.tuple_desc.clone(), fields)
    }
}

impl OpIterator for Aggregate {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;
        let a_type = self.child.get_tuple_desc().field_type(self.a_field);

        let mut results = Vec::new();
        if matches!(a_type, Type::String { .. }) {
            let mut agg = StringAggregator::new(self.g_field, self.a_field, self.op)?;
            while let Some(t) = self.child.next()? {
                agg.merge_tuple(&t);
            }
            for (key, value) in agg.results() {
                results.push(self.build_tuple(key, value));
            }
        } else {
            let mut agg = IntegerAggregator::new(self.g_field, self.a_field, self.op);
            while let Some(t) = self.child.next()? {
                agg.merge_tuple(&t);
            }
            for (key, value) in agg.results() {
                results.push(self.build_tuple(key, value));
            }
        }

        self.results = results;
        self.idx = 0;
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
        self.opened = false;
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.idx = 0;
        Ok(())
    }

    fn get_tuple_desc(&self) -> Arc<TupleDesc> {
        self.tuple_desc.clone()
    }

    fn is_open(&self) -> bool {
        self.opened
    }

    fn fetch_next(&mut self) -> DbResult<Option<Tuple>> {
        if self.idx >= self.results.len() {
            return Ok(None);
        }
        let t = self.results[self.idx].clone();
        self.idx += 1;
        Ok(Some(t))
    }
}
