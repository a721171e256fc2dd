//! The seeding run.
//!
//! A [`Seeder`] inserts fixtures in order, resolving references through a
//! [`SymbolTable`] that grows as records are persisted.

use crate::error::{SeedError, SeedResult};
use crate::fixture::{FixtureSet, SeedFixture};
use crate::resolver::{resolve_record, SymbolTable};
use crate::storage::Storage;
use daedalus_telemetry::metrics::record_seed_insert;
use tracing::{debug, info, warn};

/// Options controlling a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    /// Clear every target table before inserting.
    pub truncate: bool,
    /// Dry-run reference resolution before touching storage.
    pub verify: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            truncate: false,
            verify: true,
        }
    }
}

/// Outcome of seeding one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Target table.
    pub table: String,
    /// Fixture order.
    pub order: i64,
    /// Records inserted.
    pub inserted: usize,
}

/// Outcome of a completed seeding run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    /// Per-fixture results in seeding order.
    pub tables: Vec<TableReport>,
    /// Identifiers assigned to every symbolic key.
    pub symbols: SymbolTable,
}

impl SeedReport {
    /// Total records inserted.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}

/// Inserts fixtures into a [`Storage`] backend.
///
/// # Example
///
/// ```
/// use daedalus_seed::{FieldValue, FixtureLoader, MemoryStorage, SeedFixture, Seeder};
///
/// let fixtures = FixtureLoader::new()
///     .with_fixture(
///         SeedFixture::new("post", 2).with_record(
///             "post-1",
///             [("cat_id", FieldValue::reference("category-1"))],
///         ),
///     )
///     .with_fixture(
///         SeedFixture::new("category", 1)
///             .with_record("category-1", [("name", FieldValue::literal("News"))]),
///     )
///     .load()
///     .unwrap();
///
/// let mut storage = MemoryStorage::new();
/// let report = Seeder::new(&mut storage).run(&fixtures).unwrap();
///
/// assert_eq!(report.total_records(), 2);
/// assert_eq!(storage.get("post", 1).unwrap()["cat_id"], 1);
/// ```
#[derive(Debug)]
pub struct Seeder<S> {
    storage: S,
    symbols: SymbolTable,
    options: SeedOptions,
}

impl<S: Storage> Seeder<S> {
    /// Creates a seeder with default options.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            symbols: SymbolTable::new(),
            options: SeedOptions::default(),
        }
    }

    /// Sets the run options.
    #[must_use]
    pub fn with_options(mut self, options: SeedOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables truncation before seeding.
    #[must_use]
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.options.truncate = truncate;
        self
    }

    /// Returns the symbol table built so far.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns the storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Inserts every record of `fixture` in declaration order.
    ///
    /// Each record is resolved against the current symbol table, persisted,
    /// and its new identifier bound to its symbolic key.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::UnresolvedReference`] when a reference targets a
    /// record not inserted yet, or [`SeedError::Storage`] when the backend
    /// fails. Records already inserted are left in place.
    pub fn insert_fixture(&mut self, fixture: &SeedFixture) -> SeedResult<usize> {
        let table = fixture.table();

        for (key, raw) in fixture.records() {
            let record = resolve_record(raw, &self.symbols).map_err(|source| {
                SeedError::UnresolvedReference {
                    table: table.to_string(),
                    record: key.clone(),
                    source,
                }
            })?;

            let id = self
                .storage
                .insert(table, &record)
                .map_err(|source| SeedError::Storage {
                    table: table.to_string(),
                    source,
                })?;

            debug!(table, symbol = %key, id = %id, "Inserted fixture record");
            record_seed_insert(table);
            self.symbols.insert(key.clone(), id);
        }

        Ok(fixture.len())
    }

    /// Seeds the whole set and returns a report.
    ///
    /// With [`SeedOptions::verify`] the set is checked first so that a bad
    /// reference fails before anything is written. With
    /// [`SeedOptions::truncate`] target tables are cleared in reverse seeding
    /// order, so dependent tables are emptied before the tables they
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns the first [`SeedError`]; the run stops there without rollback.
    pub fn run(mut self, fixtures: &FixtureSet) -> SeedResult<SeedReport> {
        info!(
            fixtures = fixtures.len(),
            records = fixtures.record_count(),
            truncate = self.options.truncate,
            "Seeding started"
        );

        if self.options.verify {
            fixtures.check().map_err(|e| {
                warn!(error = %e, "Fixture check failed");
                e
            })?;
        }

        if self.options.truncate {
            self.clear_tables(fixtures)?;
        }

        let mut tables = Vec::with_capacity(fixtures.len());
        for fixture in fixtures {
            let inserted = self.insert_fixture(fixture).map_err(|e| {
                warn!(table = fixture.table(), error = %e, "Seeding aborted");
                e
            })?;

            info!(
                table = fixture.table(),
                order = fixture.order(),
                inserted,
                "Seeded table"
            );
            tables.push(TableReport {
                table: fixture.table().to_string(),
                order: fixture.order(),
                inserted,
            });
        }

        let report = SeedReport {
            tables,
            symbols: self.symbols,
        };
        info!(records = report.total_records(), "Seeding completed");

        Ok(report)
    }

    fn clear_tables(&mut self, fixtures: &FixtureSet) -> SeedResult<()> {
        let mut cleared: Vec<&str> = Vec::new();

        for fixture in fixtures.iter().rev() {
            let table = fixture.table();
            if cleared.contains(&table) {
                continue;
            }

            self.storage
                .clear(table)
                .map_err(|source| SeedError::Storage {
                    table: table.to_string(),
                    source,
                })?;
            debug!(table, "Cleared table");
            cleared.push(table);
        }

        Ok(())
    }
}
