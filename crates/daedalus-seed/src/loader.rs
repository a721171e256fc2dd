//! Fixture discovery.
//!
//! [`FixtureLoader`] collects fixtures from directories, individual files,
//! strings and in-code definitions, then hands them over as an ordered
//! [`FixtureSet`]. A file's stem names its table: `db/seed/post.toml` seeds
//! `post`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SeedError, SeedResult};
use crate::fixture::{FixtureFormat, FixtureSet, SeedFixture};

/// Builder that gathers fixtures from several sources.
///
/// Sources are kept in the order they are added; that order breaks ties
/// between fixtures with the same `order`.
///
/// # Example
///
/// ```no_run
/// use daedalus_seed::FixtureLoader;
///
/// # fn main() -> Result<(), daedalus_seed::SeedError> {
/// let fixtures = FixtureLoader::new()
///     .with_dir("db/seed")?
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FixtureLoader {
    fixtures: Vec<SeedFixture>,
}

impl FixtureLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.toml` and `.json` file directly inside `dir`.
    ///
    /// Files are read in file-name order. Other files and subdirectories are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the directory does not exist, cannot be listed,
    /// or any fixture in it fails to load.
    pub fn with_dir<P: AsRef<Path>>(mut self, dir: P) -> SeedResult<Self> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(SeedError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let read_err = |source: std::io::Error| SeedError::Read {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(read_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(read_err)?;
        paths.retain(|path| path.is_file() && FixtureFormat::from_path(path).is_some());
        paths.sort();

        debug!(dir = %dir.display(), files = paths.len(), "Discovered fixture files");

        for path in paths {
            self = self.with_file(path)?;
        }

        Ok(self)
    }

    /// Like [`with_dir`](Self::with_dir), but a missing directory is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the directory exists but a fixture fails to load.
    pub fn with_optional_dir<P: AsRef<Path>>(self, dir: P) -> SeedResult<Self> {
        if dir.as_ref().exists() {
            self.with_dir(dir)
        } else {
            Ok(self)
        }
    }

    /// Load a single fixture file.
    ///
    /// The format comes from the extension and the table name from the stem.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the file is missing, unreadable, has an unknown
    /// extension or is not a valid fixture.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> SeedResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SeedError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let format =
            FixtureFormat::from_path(path).ok_or_else(|| SeedError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?;
        let table = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                SeedError::invalid(path.display().to_string(), "file name is not valid UTF-8")
            })?;

        let content = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let fixture = SeedFixture::parse(table, &content, format)?;
        debug!(
            path = %path.display(),
            table = fixture.table(),
            order = fixture.order(),
            records = fixture.len(),
            "Loaded fixture"
        );
        self.fixtures.push(fixture);

        Ok(self)
    }

    /// Load a fixture for `table` from a string.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if `content` is not a valid fixture.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_seed::{FixtureFormat, FixtureLoader};
    ///
    /// let fixtures = FixtureLoader::new()
    ///     .with_str("category", "order = 1\n[category-1]\nname = \"News\"\n", FixtureFormat::Toml)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(fixtures.record_count(), 1);
    /// ```
    pub fn with_str(
        mut self,
        table: impl Into<String>,
        content: &str,
        format: FixtureFormat,
    ) -> SeedResult<Self> {
        self.fixtures.push(SeedFixture::parse(table, content, format)?);
        Ok(self)
    }

    /// Add a fixture built in code.
    #[must_use]
    pub fn with_fixture(mut self, fixture: SeedFixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Number of fixtures gathered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Whether no fixtures have been gathered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Validate and order the gathered fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::DuplicateKey`] if a symbolic key is declared twice.
    pub fn load(self) -> SeedResult<FixtureSet> {
        FixtureSet::new(self.fixtures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_with_dir_reads_in_file_name_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tag.toml", "order = 1\n[tag-1]\nname = \"rust\"\n");
        write(
            dir.path(),
            "category.json",
            r#"{ "order": 1, "category-1": { "name": "News" } }"#,
        );
        write(dir.path(), "notes.txt", "not a fixture");

        let set = FixtureLoader::new()
            .with_dir(dir.path())
            .unwrap()
            .load()
            .unwrap();

        let tables: Vec<_> = set.iter().map(SeedFixture::table).collect();
        assert_eq!(tables, ["category", "tag"]);
    }

    #[test]
    fn test_missing_dir_is_not_found() {
        let err = FixtureLoader::new()
            .with_dir("/nonexistent/seed")
            .unwrap_err();
        assert!(matches!(err, SeedError::NotFound { .. }));
    }

    #[test]
    fn test_optional_dir_may_be_missing() {
        let loader = FixtureLoader::new()
            .with_optional_dir("/nonexistent/seed")
            .unwrap();
        assert!(loader.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "post.yaml", "order: 1");

        let err = FixtureLoader::new()
            .with_file(dir.path().join("post.yaml"))
            .unwrap_err();
        assert!(matches!(err, SeedError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_table_name_from_file_stem() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "post_tag.toml", "order = 3\n");

        let loader = FixtureLoader::new()
            .with_file(dir.path().join("post_tag.toml"))
            .unwrap();
        let set = loader.load().unwrap();

        assert_eq!(set.fixtures()[0].table(), "post_tag");
        assert_eq!(set.fixtures()[0].order(), 3);
        assert!(set.fixtures()[0].is_empty());
    }

    #[test]
    fn test_sources_combine() {
        let loader = FixtureLoader::new()
            .with_fixture(SeedFixture::new("user", 0))
            .with_str("post", r#"{ "order": 2 }"#, FixtureFormat::Json)
            .unwrap();

        assert_eq!(loader.len(), 2);
    }
}
