//! # Daedalus Seed
//!
//! Declarative database seeding with symbolic cross-record references.
//!
//! Each fixture file describes the records of one table and carries an
//! integer `order`. Records are keyed by a symbolic name, and a field can
//! point at another record with `{ "$ref": "<key>" }` instead of hard-coding
//! its database id:
//!
//! ```toml
//! # db/seed/category.toml
//! order = 1
//!
//! [category-1]
//! name = "News"
//! ```
//!
//! ```toml
//! # db/seed/post.toml
//! order = 2
//!
//! [post-1]
//! title = "Hello"
//! cat_id = { "$ref" = "category-1" }
//! ```
//!
//! The [`Seeder`] inserts fixtures in ascending `order`. Every inserted
//! record's identifier is bound to its key in a [`SymbolTable`], and later
//! references are replaced with that identifier before insertion.
//!
//! ## Ordering
//!
//! Fixtures are never reordered automatically. A reference to a record in a
//! later fixture is reported as [`SeedError::UnresolvedReference`];
//! [`FixtureSet::check`] detects such problems without touching storage.
//!
//! ```no_run
//! use daedalus_seed::{FixtureLoader, MemoryStorage, Seeder};
//!
//! # fn main() -> Result<(), daedalus_seed::SeedError> {
//! let fixtures = FixtureLoader::new().with_dir("db/seed")?.load()?;
//! fixtures.check()?;
//!
//! let mut storage = MemoryStorage::new();
//! let report = Seeder::new(&mut storage).run(&fixtures)?;
//! println!("seeded {} records", report.total_records());
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-seed/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fixture;
pub mod loader;
pub mod resolver;
pub mod seeder;
pub mod storage;
pub mod value;

pub use error::{SeedError, SeedResult, UnresolvedReference};
pub use fixture::{FixtureFormat, FixtureSet, SeedFixture, ORDER_KEY};
pub use loader::FixtureLoader;
pub use resolver::{resolve_record, SymbolTable};
pub use seeder::{SeedOptions, SeedReport, Seeder, TableReport};
pub use storage::{MemoryStorage, RecordId, Storage, StorageError, StoredRow};
pub use value::{FieldValue, RawRecord, Record, Reference, REFERENCE_KEY};
