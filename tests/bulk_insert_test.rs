use std::sync::Arc;

use rand::Rng;

use heap_core::{DbFile, Database, Field, HeapFile, OpIterator, SeqScan, TransactionId, Tuple, TupleDesc, Type};

#[test]
fn random_bulk_insert_spans_multiple_pages_and_scans_back_intact() {
    let path = std::env::temp_dir().join(format!(
        "bulk_insert_test_{:?}",
        std::thread::current().id()
    ));
    let _ = std::fs::remove_file(&path);
    let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32]));
    let file: Arc<dyn DbFile> = Arc::new(HeapFile::new(&path, desc.clone()).unwrap());
    let table_id = file.get_id();
    Database::global().add_table("bulk_insert_table", file);

    let mut rng = rand::thread_rng();
    let values: Vec<i32> = (0..400).map(|_| rng.gen_range(0, 1_000_000)).collect();

    let tid = TransactionId::new();
    let bp = Database::global().buffer_pool();
    for v in &values {
        bp.insert_tuple(tid, table_id, Tuple::new(desc.clone(), vec![Field::Int(*v)]))
            .unwrap();
    }
    tid.commit().unwrap();

    let file = Database::global().buffer_pool().get_database_file(table_id).unwrap();
    assert!(file.num_pages().unwrap() > 1, "400 ints should not fit on a single page");

    let mut scan = SeqScan::new(TransactionId::new(), table_id).unwrap();
    scan.open().unwrap();
    let mut seen = Vec::new();
    while let Some(t) = scan.next().unwrap() {
        match t.field(0) {
            Field::Int(v) => seen.push(*v),
            other => panic!("expected INT, got {:?}", other),
        }
    }
    scan.close();
    seen.sort();

    let mut expected = values;
    expected.sort();
    assert_eq!(seen, expected);

    let _ = std::fs::remove_file(&path);
}
