//! The Catalog (Database): a case-insensitive, case-preserving registry of
//! tables, each backed by its own primary-key-ordered B+ tree (§3, §4.3).

pub mod table;

use std::collections::HashMap;

use crate::btree::BPlusTree;
use crate::error::{SqlError, SqlResult};

pub use table::{Column, Row, Table};

/// A table's metadata plus its ordered row store.
pub struct TableEntry {
    pub table: Table,
    pub store: BPlusTree<Row>,
}

pub struct Catalog {
    tables: HashMap<String, TableEntry>,
    btree_order: usize,
}

impl Catalog {
    pub fn new(btree_order: usize) -> Self {
        Catalog {
            tables: HashMap::new(),
            btree_order,
        }
    }

    pub fn btree_order(&self) -> usize {
        self.btree_order
    }

    /// Registers a new table, failing with `TableExists` if a table with the
    /// same name (case-insensitively) already exists.
    pub fn create_table(&mut self, table: Table) -> SqlResult<()> {
        let key = table.name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(SqlError::table_exists(table.name.clone()));
        }
        let store = BPlusTree::new(self.btree_order)?;
        self.tables.insert(key, TableEntry { table, store });
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> SqlResult<()> {
        let key = name.to_lowercase();
        if self.tables.remove(&key).is_none() {
            return Err(SqlError::table_not_found(name));
        }
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> SqlResult<&Table> {
        self.tables
            .get(&name.to_lowercase())
            .map(|entry| &entry.table)
            .ok_or_else(|| SqlError::table_not_found(name))
    }

    pub fn get_entry(&self, name: &str) -> SqlResult<&TableEntry> {
        self.tables
            .get(&name.to_lowercase())
            .ok_or_else(|| SqlError::table_not_found(name))
    }

    pub fn get_entry_mut(&mut self, name: &str) -> SqlResult<&mut TableEntry> {
        self.tables
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| SqlError::table_not_found(name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    /// Table names in original casing, for persistence and display. Order is
    /// not significant beyond being stable for a given catalog snapshot.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.values().map(|e| e.table.name.clone()).collect()
    }

    /// Used by the codec to rebuild a catalog from scratch, in file order.
    pub fn insert_table_entry(&mut self, table: Table, store: BPlusTree<Row>) {
        let key = table.name.to_lowercase();
        self.tables.insert(key, TableEntry { table, store });
    }
}
