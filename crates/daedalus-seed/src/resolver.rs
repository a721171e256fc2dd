//! Reference resolution.
//!
//! The [`SymbolTable`] maps symbolic keys to the identifiers storage
//! assigned on insert. [`resolve_record`] uses it to turn a declared
//! [`RawRecord`] into a storable [`Record`].

use crate::error::UnresolvedReference;
use crate::storage::RecordId;
use crate::value::{FieldValue, RawRecord, Record};
use indexmap::IndexMap;

/// Symbolic key to persisted identifier, filled in as records are inserted.
///
/// Lives for one seeding run only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    ids: IndexMap<String, RecordId>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identifier of `key`, returning the previous one if the key
    /// was already bound.
    pub fn insert(&mut self, key: impl Into<String>, id: RecordId) -> Option<RecordId> {
        self.ids.insert(key.into(), id)
    }

    /// Returns the identifier bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RecordId> {
        self.ids.get(key)
    }

    /// Whether `key` has been bound.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.ids.contains_key(key)
    }

    /// Number of bound keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no keys are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordId)> {
        self.ids.iter().map(|(key, id)| (key.as_str(), id))
    }
}

/// Replaces every reference in `record` with the identifier bound in
/// `symbols`.
///
/// Literal fields are copied unchanged and field order is preserved.
///
/// # Errors
///
/// Returns [`UnresolvedReference`] for the first reference whose target is
/// not in `symbols`.
///
/// # Example
///
/// ```
/// use daedalus_seed::{resolve_record, FieldValue, RawRecord, SymbolTable};
/// use serde_json::json;
///
/// let mut symbols = SymbolTable::new();
/// symbols.insert("category-1", json!(7));
///
/// let mut post = RawRecord::new();
/// post.insert("title".into(), FieldValue::literal("Hello"));
/// post.insert("cat_id".into(), FieldValue::reference("category-1"));
///
/// let resolved = resolve_record(&post, &symbols).unwrap();
/// assert_eq!(resolved["cat_id"], json!(7));
/// ```
pub fn resolve_record(
    record: &RawRecord,
    symbols: &SymbolTable,
) -> Result<Record, UnresolvedReference> {
    let mut resolved = Record::with_capacity(record.len());

    for (field, value) in record {
        let value = match value {
            FieldValue::Literal(literal) => literal.clone(),
            FieldValue::Reference(reference) => symbols
                .get(reference.target())
                .cloned()
                .ok_or_else(|| UnresolvedReference {
                    field: field.clone(),
                    target: reference.target().to_string(),
                })?,
        };
        resolved.insert(field.clone(), value);
    }

    Ok(resolved)
}
