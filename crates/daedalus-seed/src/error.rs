//! Seeding error types.

use crate::storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for seeding operations.
pub type SeedResult<T> = Result<T, SeedError>;

/// A reference whose target has not been inserted yet.
///
/// Returned by [`resolve_record`](crate::resolve_record) when the symbol
/// table has no identifier for a referenced key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` references `{target}`, which has not been inserted yet")]
pub struct UnresolvedReference {
    /// Field holding the reference.
    pub field: String,
    /// Symbolic key that could not be resolved.
    pub target: String,
}

/// Errors that can occur while loading or seeding fixtures.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A fixture file or directory does not exist.
    #[error("fixture source not found: {path}")]
    NotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// A fixture source could not be read.
    #[error("failed to read fixture source {path}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not a known fixture format.
    #[error("unsupported fixture format: {path} (expected .toml or .json)")]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
    },

    /// TOML fixture syntax error.
    #[error("failed to parse TOML fixture `{table}`")]
    Toml {
        /// Table the fixture describes.
        table: String,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// JSON fixture syntax error.
    #[error("failed to parse JSON fixture `{table}`")]
    Json {
        /// Table the fixture describes.
        table: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The fixture parsed but does not have the expected shape.
    #[error("invalid fixture `{table}`: {message}")]
    Invalid {
        /// Table the fixture describes.
        table: String,
        /// What is wrong.
        message: String,
    },

    /// The same symbolic key is declared twice in one fixture set.
    #[error("symbolic key `{key}` is declared in both `{first_table}` and `{second_table}`")]
    DuplicateKey {
        /// Duplicated key.
        key: String,
        /// Table of the first declaration.
        first_table: String,
        /// Table of the second declaration.
        second_table: String,
    },

    /// A reference names a key no fixture declares.
    #[error("record `{record}` in `{table}` references unknown key `{target}` (field `{field}`)")]
    UnknownReference {
        /// Table of the referencing record.
        table: String,
        /// Symbolic key of the referencing record.
        record: String,
        /// Field holding the reference.
        field: String,
        /// Unknown symbolic key.
        target: String,
    },

    /// A reference names a record that is inserted later (or never).
    #[error("record `{record}` in `{table}` cannot be resolved")]
    UnresolvedReference {
        /// Table of the referencing record.
        table: String,
        /// Symbolic key of the referencing record.
        record: String,
        /// The reference that failed.
        #[source]
        source: UnresolvedReference,
    },

    /// The storage backend rejected an operation.
    #[error("storage failed while seeding `{table}`")]
    Storage {
        /// Table being written.
        table: String,
        /// Backend error.
        #[source]
        source: StorageError,
    },
}

impl SeedError {
    /// Create an invalid-fixture error.
    pub fn invalid(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Returns the unresolved symbolic key for reference errors.
    #[must_use]
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            Self::UnknownReference { target, .. } => Some(target),
            Self::UnresolvedReference { source, .. } => Some(&source.target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_reference_display() {
        let err = SeedError::UnresolvedReference {
            table: "post".to_string(),
            record: "post-1".to_string(),
            source: UnresolvedReference {
                field: "cat_id".to_string(),
                target: "category-9".to_string(),
            },
        };
        assert_eq!(err.to_string(), "record `post-1` in `post` cannot be resolved");
        assert_eq!(err.reference_target(), Some("category-9"));

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("category-9"));
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = SeedError::DuplicateKey {
            key: "user-1".to_string(),
            first_table: "user".to_string(),
            second_table: "admin".to_string(),
        };
        assert!(err.to_string().contains("`user-1`"));
        assert_eq!(err.reference_target(), None);
    }
}
