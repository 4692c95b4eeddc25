//! Persistent key-value storage behind the translation cache

use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// Storage holding one table of source → translation per language pair
pub trait PersistentStore: Send + Sync {
    /// Read a whole table; a missing table or file is empty
    fn load(&self, table: &str) -> Result<HashMap<String, String>>;

    /// Insert or overwrite entries of a table
    fn save(&self, table: &str, entries: &HashMap<String, String>) -> Result<()>;
}

/// redb database file; keys and values are stored JSON-encoded
#[derive(Debug, Clone)]
pub struct RedbStore {
    path: PathBuf,
}

impl RedbStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_table(&self, table: &str) -> std::result::Result<Vec<(String, String)>, redb::Error> {
        let db = Database::open(&self.path)?;
        let txn = db.begin_read()?;
        let definition: TableDefinition<&str, &str> = TableDefinition::new(table);
        let table = match txn.open_table(definition) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        for row in table.iter()? {
            let (key, value) = row?;
            rows.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(rows)
    }

    fn write_table(&self, table: &str, rows: &[(String, String)]) -> std::result::Result<(), redb::Error> {
        let db = Database::create(&self.path)?;
        let txn = db.begin_write()?;
        {
            let definition: TableDefinition<&str, &str> = TableDefinition::new(table);
            let mut table = txn.open_table(definition)?;
            for (key, value) in rows {
                table.insert(key.as_str(), value.as_str())?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}

impl PersistentStore for RedbStore {
    fn load(&self, table: &str) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            debug!("{} does not exist, table {} is empty", self.path.display(), table);
            return Ok(HashMap::new());
        }

        let mut entries = HashMap::new();
        for (key, value) in self.read_table(table)? {
            let key: String = serde_json::from_str(&key)?;
            let value: String = serde_json::from_str(&value)?;
            entries.insert(key, value);
        }
        Ok(entries)
    }

    fn save(&self, table: &str, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let rows = entries
            .iter()
            .map(|(k, v)| Ok((serde_json::to_string(k)?, serde_json::to_string(v)?)))
            .collect::<std::result::Result<Vec<_>, serde_json::Error>>()?;

        self.write_table(table, &rows).map_err(TranslationError::from)
    }
}

/// Store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with one table
    pub fn with_table<I, K, V>(table: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if let Ok(mut tables) = store.tables.lock() {
            tables.insert(table.to_string(), entries);
        }
        store
    }
}

impl PersistentStore for MemoryStore {
    fn load(&self, table: &str) -> Result<HashMap<String, String>> {
        let tables = self.tables.lock().map_err(|e| TranslationError::LockPoisoned {
            message: e.to_string(),
        })?;
        Ok(tables.get(table).cloned().unwrap_or_default())
    }

    fn save(&self, table: &str, entries: &HashMap<String, String>) -> Result<()> {
        let mut tables = self.tables.lock().map_err(|e| TranslationError::LockPoisoned {
            message: e.to_string(),
        })?;
        tables
            .entry(table.to_string())
            .or_default()
            .extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }
}
