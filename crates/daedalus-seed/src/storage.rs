//! Storage backends fixtures are seeded into.
//!
//! The [`Storage`] trait is the only thing the seeder needs from a
//! database: insert a resolved record and hand back its identifier.
//! [`MemoryStorage`] is an in-process backend with per-table
//! auto-increment keys, used by tests and local tooling.

use crate::value::Record;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Identifier a backend assigns to an inserted record.
///
/// Usually an integer primary key, but any JSON value is accepted so
/// string and UUID keys work too.
pub type RecordId = Value;

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused the record.
    #[error("insert into `{table}` rejected: {message}")]
    Rejected {
        /// Target table.
        table: String,
        /// Backend message.
        message: String,
    },

    /// Backend-specific failure.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StorageError {
    /// Create a rejection error.
    pub fn rejected(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// A destination for seeded records.
pub trait Storage {
    /// Inserts `record` into `table` and returns its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend rejects the record.
    fn insert(&mut self, table: &str, record: &Record) -> Result<RecordId, StorageError>;

    /// Removes every row from `table`.
    ///
    /// Called before seeding when truncation is enabled. The default does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot clear the table.
    fn clear(&mut self, _table: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn insert(&mut self, table: &str, record: &Record) -> Result<RecordId, StorageError> {
        (**self).insert(table, record)
    }

    fn clear(&mut self, table: &str) -> Result<(), StorageError> {
        (**self).clear(table)
    }
}

/// A row held by [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Auto-increment identifier.
    pub id: i64,
    /// Stored fields.
    pub record: Record,
}

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    next_id: i64,
    rows: Vec<StoredRow>,
}

/// In-memory storage with per-table auto-increment identifiers starting at 1.
///
/// # Example
///
/// ```
/// use daedalus_seed::{MemoryStorage, Record, Storage};
///
/// let mut storage = MemoryStorage::new();
/// let id = storage.insert("category", &Record::new()).unwrap();
///
/// assert_eq!(id, 1);
/// assert_eq!(storage.rows("category").len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tables: IndexMap<String, MemoryTable>,
}

impl MemoryStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rows of `table` in insertion order.
    #[must_use]
    pub fn rows(&self, table: &str) -> &[StoredRow] {
        self.tables
            .get(table)
            .map_or(&[][..], |t| t.rows.as_slice())
    }

    /// Looks up a row by identifier.
    #[must_use]
    pub fn get(&self, table: &str, id: i64) -> Option<&Record> {
        self.rows(table)
            .iter()
            .find(|row| row.id == id)
            .map(|row| &row.record)
    }

    /// Returns the names of tables that have been written, in first-write order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Total number of stored rows across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.values().map(|t| t.rows.len()).sum()
    }

    /// Whether no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn insert(&mut self, table: &str, record: &Record) -> Result<RecordId, StorageError> {
        if table.is_empty() {
            return Err(StorageError::rejected(table, "table name is empty"));
        }

        let entry = self.tables.entry(table.to_string()).or_default();
        entry.next_id += 1;
        let id = entry.next_id;
        entry.rows.push(StoredRow {
            id,
            record: record.clone(),
        });

        Ok(Value::from(id))
    }

    fn clear(&mut self, table: &str) -> Result<(), StorageError> {
        if let Some(entry) = self.tables.get_mut(table) {
            *entry = MemoryTable::default();
        }
        Ok(())
    }
}
