//! Per-table selectivity statistics, plus the process-wide registry keyed
//! by table name.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::OnceCell;

use crate::database::Database;
use crate::field::{Field, Op, Type};
use crate::histogram::{IntHistogram, StringHistogram};
use crate::transaction::TransactionId;
use crate::types::{DbResult, TableId};

const NUM_HIST_BINS: usize = 10;
const DEFAULT_IO_COST_PER_PAGE: f64 = 1000.0;

#[derive(Clone)]
enum FieldHistogram {
    Int(IntHistogram),
    Str(StringHistogram),
    None,
}

/// Scan cost, cardinality, and per-field selectivity estimates for one table.
#[derive(Clone)]
pub struct TableStats {
    io_cost_per_page: f64,
    num_pages: usize,
    num_tuples: usize,
    histograms: Vec<FieldHistogram>,
}

impl TableStats {
    /// Scans `table_id` once, under a fresh anonymous transaction, to
    /// populate one `IntHistogram(10, 0, 32)` per INT field or
    /// `StringHistogram(10)` per STRING field.
    pub fn new(table_id: TableId, io_cost_per_page: f64) -> DbResult<Self> {
        let bp = Database::global().buffer_pool();
        let file = bp.get_database_file(table_id)?;
        let desc = file.get_tuple_desc();
        let num_fields = desc.num_fields();

        let mut histograms: Vec<FieldHistogram> = (0..num_fields)
            .map(|i| match desc.field_type(i) {
                Type::Int32 => FieldHistogram::Int(IntHistogram::new(NUM_HIST_BINS, 0, 32)),
                Type::String { .. } => FieldHistogram::Str(StringHistogram::new(NUM_HIST_BINS)),
                Type::Double => FieldHistogram::None,
            })
            .collect();

        let tid = TransactionId::new();
        let mut iter = file.iterator(tid);
        iter.open(bp)?;
        let mut num_tuples = 0usize;
        while let Some(t) = iter.next(bp)? {
            num_tuples += 1;
            for (i, hist) in histograms.iter_mut().enumerate() {
                match (hist, t.field(i)) {
                    (FieldHistogram::Int(h), Field::Int(v)) => h.add_value(*v),
                    (FieldHistogram::Str(h), Field::Str(s)) => h.add_value(s),
                    _ => {}
                }
            }
        }
        iter.close();
        tid.commit()?;

        Ok(TableStats {
            io_cost_per_page,
            num_pages: file.num_pages()?,
            num_tuples,
            histograms,
        })
    }

    /// Pages are the atomic unit of I/O, so scan cost scales with page count.
    pub fn estimate_scan_cost(&self) -> f64 {
        self.io_cost_per_page * self.num_pages as f64
    }

    pub fn estimate_table_cardinality(&self, selectivity: f64) -> usize {
        (self.num_tuples as f64 * selectivity).max(0.0).round() as usize
    }

    /// No histogram (e.g. a DOUBLE field) estimates as fully unselective.
    pub fn estimate_selectivity(&self, field: usize, op: Op, constant: &Field) -> f64 {
        match (&self.histograms[field], constant) {
            (FieldHistogram::Int(h), Field::Int(v)) => h.estimate_selectivity(op, *v),
            (FieldHistogram::Str(h), Field::Str(s)) => h.estimate_selectivity(op, s),
            _ => 1.0,
        }
    }
}

static STATS_REGISTRY: OnceCell<Mutex<HashMap<String, TableStats>>> = OnceCell::new();

fn registry() -> &'static Mutex<HashMap<String, TableStats>> {
    STATS_REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

pub fn get_table_stats(table_name: &str) -> Option<TableStats> {
    registry().lock().unwrap().get(table_name).cloned()
}

pub fn set_table_stats(table_name: impl Into<String>, stats: TableStats) {
    registry().lock().unwrap().insert(table_name.into(), stats);
}

/// Rebuilds statistics for every table currently in the catalog.
pub fn compute_statistics() -> DbResult<()> {
    let ids: Vec<TableId> = Database::global().catalog().read().unwrap().table_id_iterator().collect();
    for id in ids {
        let name = Database::global()
            .catalog()
            .read()
            .unwrap()
            .get_table_name(id)
            .unwrap_or_default();
        let stats = TableStats::new(id, DEFAULT_IO_COST_PER_PAGE)?;
        set_table_stats(name, stats);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap_file::{DbFile, HeapFile};
    use crate::tuple::Tuple;
    use crate::tuple_desc::TupleDesc;
    use std::sync::Arc;

    #[test]
    fn scan_cost_scales_with_page_count() {
        let path = std::env::temp_dir().join(format!("table_stats_test_{:?}", std::thread::current().id()));
        let _ = std::fs::remove_file(&path);
        let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32]));
        let file: Arc<dyn DbFile> = Arc::new(HeapFile::new(&path, desc.clone()).unwrap());
        let table_id = file.get_id();
        Database::global().add_table("table_stats_test_table", file);

        let tid = TransactionId::new();
        let bp = Database::global().buffer_pool();
        for v in 0..5 {
            bp.insert_tuple(tid, table_id, Tuple::new(desc.clone(), vec![Field::Int(v)])).unwrap();
        }
        tid.commit().unwrap();

        let stats = TableStats::new(table_id, 1000.0).unwrap();
        assert_eq!(stats.estimate_scan_cost(), 1000.0 * stats.num_pages as f64);
        assert_eq!(stats.estimate_table_cardinality(1.0), 5);

        let _ = std::fs::remove_file(&path);
    }
}
