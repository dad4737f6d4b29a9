use std::sync::Arc;

use heap_core::{DbFile, Database, Field, HeapFile, TransactionId, Tuple, TupleDesc, Type};

#[test]
fn committed_tuple_survives_a_simulated_restart() {
    let path = std::env::temp_dir().join(format!(
        "commit_durability_test_{:?}",
        std::thread::current().id()
    ));
    let _ = std::fs::remove_file(&path);
    let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32]));
    let file: Arc<dyn DbFile> = Arc::new(HeapFile::new(&path, desc.clone()).unwrap());
    let table_id = file.get_id();
    Database::global().add_table("durability_table", file);

    let tid = TransactionId::new();
    Database::global()
        .buffer_pool()
        .insert_tuple(tid, table_id, Tuple::new(desc.clone(), vec![Field::Int(42)]))
        .unwrap();
    tid.commit().unwrap();

    // "shut down and reopen": a brand new BufferPool/Catalog/HeapFile graph
    // over the same on-disk file, so nothing survives in memory.
    let reopened: Arc<dyn DbFile> = Arc::new(HeapFile::new(&path, desc).unwrap());
    assert_eq!(reopened.get_id(), table_id);
    let mut catalog = heap_core::Catalog::new();
    catalog.add_table("durability_table", reopened);
    let catalog = Arc::new(std::sync::RwLock::new(catalog));
    let bp = heap_core::BufferPool::new(catalog);

    let file = bp.get_database_file(table_id).unwrap();
    let mut iter = file.iterator(TransactionId::new());
    iter.open(&bp).unwrap();
    let t = iter.next(&bp).unwrap().expect("committed tuple should still be there");
    assert_eq!(*t.field(0), Field::Int(42));
    assert!(iter.next(&bp).unwrap().is_none());
    iter.close();

    let _ = std::fs::remove_file(&path);
}
