use std::sync::Arc;

use heap_core::{BufferPool, Catalog, DbError, DbFile, Field, HeapFile, TransactionId, Tuple, TupleDesc, Type};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "eviction_test_{}_{:?}",
        name,
        std::thread::current().id()
    ))
}

#[test]
fn third_table_insert_fails_when_both_cached_pages_are_dirty() {
    let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32]));
    let mut catalog = Catalog::new();
    let mut table_ids = Vec::new();
    for i in 0..3 {
        let path = temp_path(&format!("t{}", i));
        let _ = std::fs::remove_file(&path);
        let file: Arc<dyn DbFile> = Arc::new(HeapFile::new(&path, desc.clone()).unwrap());
        table_ids.push(file.get_id());
        catalog.add_table(format!("evict_table_{}", i), file);
    }
    let catalog = Arc::new(std::sync::RwLock::new(catalog));
    let bp = BufferPool::with_capacity(catalog, 2);
    let t1 = TransactionId::new();

    bp.insert_tuple(t1, table_ids[0], Tuple::new(desc.clone(), vec![Field::Int(1)]))
        .unwrap();
    bp.insert_tuple(t1, table_ids[1], Tuple::new(desc.clone(), vec![Field::Int(2)]))
        .unwrap();

    let result = bp.insert_tuple(t1, table_ids[2], Tuple::new(desc, vec![Field::Int(3)]));
    assert!(matches!(result, Err(DbError::EvictionImpossible)));
}
