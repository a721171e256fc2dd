//! Fixture field values.
//!
//! A field is either a literal JSON value or a [`Reference`] to another
//! fixture record. On disk a reference is the single-key object
//! `{ "$ref": "<symbolic key>" }`:
//!
//! ```toml
//! order = 2
//!
//! [post-1]
//! title = "Hello"
//! cat_id = { "$ref" = "category-1" }
//! ```

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key under which references are written in fixture files.
pub const REFERENCE_KEY: &str = "$ref";

/// A record field as declared in a fixture, before resolution.
pub type RawRecord = IndexMap<String, FieldValue>;

/// A record with every reference replaced by a real identifier, ready for
/// storage.
pub type Record = IndexMap<String, Value>;

/// Placeholder for "the persisted identifier of another fixture record".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    target: String,
}

impl Reference {
    /// Creates a reference to the record with symbolic key `target`.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Returns the symbolic key this reference points at.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.target)
    }
}

/// A declared fixture field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A value stored as-is.
    Literal(Value),
    /// A value substituted with another record's identifier during seeding.
    Reference(Reference),
}

impl FieldValue {
    /// Creates a literal field value.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a reference field value.
    #[must_use]
    pub fn reference(target: impl Into<String>) -> Self {
        Self::Reference(Reference::new(target))
    }

    /// Returns the reference, if this field is one.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(reference) => Some(reference),
            Self::Literal(_) => None,
        }
    }

    /// Interprets a decoded JSON/TOML value.
    ///
    /// An object whose only key is `$ref` is a reference; everything else is
    /// a literal.
    ///
    /// # Errors
    ///
    /// Returns a message if a `$ref` object does not hold a string.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) if map.len() == 1 && map.contains_key(REFERENCE_KEY) => {
                match map.get(REFERENCE_KEY) {
                    Some(Value::String(target)) => Ok(Self::reference(target.clone())),
                    _ => Err(format!("`{REFERENCE_KEY}` must name a record key")),
                }
            }
            other => Ok(Self::Literal(other)),
        }
    }
}

impl From<Reference> for FieldValue {
    fn from(reference: Reference) -> Self {
        Self::Reference(reference)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(value) => value.serialize(serializer),
            Self::Reference(reference) => {
                let mut map = Map::new();
                map.insert(
                    REFERENCE_KEY.to_string(),
                    Value::String(reference.target.clone()),
                );
                map.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}
