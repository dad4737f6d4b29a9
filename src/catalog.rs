//! Minimal in-process table registry: `tableId -> DbFile` plus
//! `tableId -> name`. A real schema loader living outside this core would
//! populate this at startup; here it is a plain collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use crate::heap_file::DbFile;
use crate::types::TableId;

#[derive(Default)]
pub struct Catalog {
    files: HashMap<TableId, Arc<dyn DbFile>>,
    names: HashMap<TableId, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn add_table(&mut self, name: impl Into<String>, file: Arc<dyn DbFile>) {
        let id = file.get_id();
        self.names.insert(id, name.into());
        self.files.insert(id, file);
    }

    pub fn get_database_file(&self, table_id: TableId) -> Option<Arc<dyn DbFile>> {
        self.files.get(&table_id).cloned()
    }

    pub fn get_table_name(&self, table_id: TableId) -> Option<String> {
        self.names.get(&table_id).cloned()
    }

    pub fn table_id_iterator(&self) -> impl Iterator<Item = TableId> + '_ {
        self.files.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Type;
    use crate::heap_file::HeapFile;
    use crate::tuple_desc::TupleDesc;
    use std::sync::Arc;

    #[test]
    fn add_and_look_up_table() {
        let dir = std::env::temp_dir().join(format!("catalog_test_{:?}", std::thread::current().id()));
        let desc = Arc::new(TupleDesc::unnamed(vec![Type::Int32]));
        let file: Arc<dyn DbFile> = Arc::new(HeapFile::new(&dir, desc).unwrap());
        let id = file.get_id();

        let mut catalog = Catalog::new();
        catalog.add_table("widgets", file);

        assert_eq!(catalog.get_table_name(id).as_deref(), Some("widgets"));
        assert!(catalog.get_database_file(id).is_some());
        assert!(catalog.table_id_iterator().any(|t| t == id));

        let _ = std::fs::remove_file(&dir);
    }
}
