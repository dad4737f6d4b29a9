//! Group-by computation feeding the [`crate::aggregate::Aggregate`] operator.

use std::collections::HashMap;
use std::fmt;

use crate::error::DbError;
use crate::field::Field;
use crate::tuple::Tuple;
use crate::types::DbResult;

/// Sentinel group key used when there is no GROUP BY field.
pub const NO_GROUPING: i32 = -1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AggregateOp::Min => "MIN",
            AggregateOp::Max => "MAX",
            AggregateOp::Sum => "SUM",
            AggregateOp::Avg => "AVG",
            AggregateOp::Count => "COUNT",
        };
        write!(f, "{}", s)
    }
}

/// Computes MIN/MAX/SUM/AVG/COUNT over an INT field, grouped by an
/// arbitrary field (or ungrouped, under [`NO_GROUPING`]).
pub struct IntegerAggregator {
    gb_field: Option<usize>,
    a_field: usize,
    op: AggregateOp,
    groups: HashMap<Field, Vec<i32>>,
}

impl IntegerAggregator {
    pub fn new(gb_field: Option<usize>, a_field: usize, op: AggregateOp) -> Self {
        IntegerAggregator {
            gb_field,
            a_field,
            op,
            groups: HashMap::new(),
        }
    }

    pub fn merge_tuple(&mut self, tup: &Tuple) {
        let key = self.group_key(tup);
        let value = match tup.field(self.a_field) {
            Field::Int(v) => *v,
            other => panic!("IntegerAggregator expects an INT field, got {:?}", other),
        };
        self.groups.entry(key).or_default().push(value);
    }

    fn group_key(&self, tup: &Tuple) -> Field {
        match self.gb_field {
            Some(i) => tup.field(i).clone(),
            None => Field::Int(NO_GROUPING),
        }
    }

    /// `(group key, aggregate value)` per group. AVG uses integer division;
    /// no floating point is involved anywhere in this path.
    pub fn results(&self) -> Vec<(Field, i32)> {
        self.groups
            .iter()
            .map(|(key, values)| {
                let result = match self.op {
                    AggregateOp::Min => *values.iter().min().unwrap(),
                    AggregateOp::Max => *values.iter().max().unwrap(),
                    AggregateOp::Sum => values.iter().sum(),
                    AggregateOp::Avg => values.iter().sum::<i32>() / values.len() as i32,
                    AggregateOp::Count => values.len() as i32,
                };
                (key.clone(), result)
            })
            .collect()
    }
}

/// Computes COUNT over a STRING field; any other op is rejected at
/// construction.
pub struct StringAggregator {
    gb_field: Option<usize>,
    a_field: usize,
    groups: HashMap<Field, i32>,
}

impl StringAggregator {
    pub fn new(gb_field: Option<usize>, a_field: usize, op: AggregateOp) -> DbResult<Self> {
        if op != AggregateOp::Count {
            return Err(DbError::UsageError(format!(
                "StringAggregator only supports COUNT, got {}",
                op
            )));
        }
        Ok(StringAggregator {
            gb_field,
            a_field,
            groups: HashMap::new(),
        })
    }

    pub fn merge_tuple(&mut self, tup: &Tuple) {
        let key = match self.gb_field {
            Some(i) => tup.field(i).clone(),
            None => Field::Int(NO_GROUPING),
        };
        match tup.field(self.a_field) {
            Field::Str(_) => {}
            other => panic!("StringAggregator expects a STRING field, got {:?}", other),
        }
        *self.groups.entry(key).or_insert(0) += 1;
    }

    pub fn results(&self) -> Vec<(Field, i32)> {
        self.groups.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}
