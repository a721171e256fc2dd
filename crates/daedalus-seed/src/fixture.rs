//! Fixture definitions and ordered fixture sets.
//!
//! A fixture targets one table. Its document holds a required integer
//! `order` plus one entry per record, keyed by the record's symbolic key:
//!
//! ```json
//! {
//!   "order": 2,
//!   "post-1": { "title": "Hello", "cat_id": { "$ref": "category-1" } }
//! }
//! ```
//!
//! Fixtures are seeded in ascending `order`; ties keep discovery order.

use crate::error::{SeedError, SeedResult, UnresolvedReference};
use crate::value::{FieldValue, RawRecord};
use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// Document key holding the fixture's seeding order.
pub const ORDER_KEY: &str = "order";

/// Serialization format of a fixture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl FixtureFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Some(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// The records to seed into one table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedFixture {
    table: String,
    order: i64,
    records: IndexMap<String, RawRecord>,
}

impl SeedFixture {
    /// Creates an empty fixture for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>, order: i64) -> Self {
        Self {
            table: table.into(),
            order,
            records: IndexMap::new(),
        }
    }

    /// Adds a record under `key`.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_seed::{FieldValue, SeedFixture};
    ///
    /// let posts = SeedFixture::new("post", 2).with_record(
    ///     "post-1",
    ///     [
    ///         ("title", FieldValue::literal("Hello")),
    ///         ("cat_id", FieldValue::reference("category-1")),
    ///     ],
    /// );
    /// assert_eq!(posts.len(), 1);
    /// ```
    #[must_use]
    pub fn with_record<I, K>(mut self, key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let record = fields
            .into_iter()
            .map(|(field, value)| (field.into(), value))
            .collect();
        self.records.insert(key.into(), record);
        self
    }

    /// Parses a fixture document.
    ///
    /// TOML date-times are stored as their RFC 3339 strings.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Toml`] or [`SeedError::Json`] on syntax errors,
    /// [`SeedError::DuplicateKey`] if the document declares a symbolic key
    /// twice, and [`SeedError::Invalid`] if `order` is missing or not an
    /// integer, or a record is not a table/object.
    pub fn parse(
        table: impl Into<String>,
        content: &str,
        format: FixtureFormat,
    ) -> SeedResult<Self> {
        let table = table.into();

        let mut entries = match format {
            FixtureFormat::Toml => {
                let document: toml::Table =
                    toml::from_str(content).map_err(|source| SeedError::Toml {
                        table: table.clone(),
                        source,
                    })?;
                let mut entries = IndexMap::with_capacity(document.len());
                for (key, value) in document {
                    let value = toml_to_json(value).map_err(|message| {
                        SeedError::invalid(&table, format!("{key}: {message}"))
                    })?;
                    entries.insert(key, value);
                }
                entries
            }
            FixtureFormat::Json => {
                let document: JsonDocument =
                    serde_json::from_str(content).map_err(|source| SeedError::Json {
                        table: table.clone(),
                        source,
                    })?;
                if let Some(key) = document.duplicate {
                    return Err(SeedError::DuplicateKey {
                        key,
                        first_table: table.clone(),
                        second_table: table,
                    });
                }
                document.entries
            }
        };

        let order = match entries.shift_remove(ORDER_KEY) {
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                SeedError::invalid(&table, format!("`{ORDER_KEY}` must be an integer"))
            })?,
            Some(_) => {
                return Err(SeedError::invalid(
                    table,
                    format!("`{ORDER_KEY}` must be an integer"),
                ))
            }
            None => {
                return Err(SeedError::invalid(
                    table,
                    format!("missing required `{ORDER_KEY}`"),
                ))
            }
        };

        let mut fixture = Self::new(table, order);
        for (key, value) in entries {
            let record = fixture.parse_record(&key, value)?;
            fixture.records.insert(key, record);
        }

        Ok(fixture)
    }

    fn parse_record(&self, key: &str, value: Value) -> SeedResult<RawRecord> {
        let Value::Object(fields) = value else {
            return Err(SeedError::invalid(
                &self.table,
                format!("record `{key}` must be a table of fields"),
            ));
        };

        fields
            .into_iter()
            .map(|(field, value)| {
                FieldValue::from_value(value)
                    .map(|value| (field.clone(), value))
                    .map_err(|message| {
                        SeedError::invalid(&self.table, format!("{key}.{field}: {message}"))
                    })
            })
            .collect()
    }

    /// Target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Seeding order; lower runs first.
    #[must_use]
    pub const fn order(&self) -> i64 {
        self.order
    }

    /// Records keyed by symbolic key, in declaration order.
    #[must_use]
    pub const fn records(&self) -> &IndexMap<String, RawRecord> {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the fixture has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Top-level entries of a JSON fixture, remembering the first key that was
/// declared more than once.
struct JsonDocument {
    entries: IndexMap<String, Value>,
    duplicate: Option<String>,
}

impl<'de> Deserialize<'de> for JsonDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = JsonDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of records")
            }

            fn visit_map<A>(self, mut map: A) -> Result<JsonDocument, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = IndexMap::new();
                let mut duplicate = None;
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    if entries.contains_key(&key) {
                        if duplicate.is_none() {
                            duplicate = Some(key);
                        }
                    } else {
                        entries.insert(key, value);
                    }
                }
                Ok(JsonDocument { entries, duplicate })
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

fn toml_to_json(value: toml::Value) -> Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("float `{f}` cannot be stored"))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        toml::Value::Table(table) => {
            let mut object = Map::with_capacity(table.len());
            for (key, value) in table {
                object.insert(key, toml_to_json(value)?);
            }
            Value::Object(object)
        }
    })
}

/// Fixtures in seeding order.
///
/// Construction validates that symbolic keys are unique across the set and
/// stable-sorts fixtures by `order`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSet {
    fixtures: Vec<SeedFixture>,
}

impl FixtureSet {
    /// Orders `fixtures` for seeding.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::DuplicateKey`] if two records share a symbolic key.
    pub fn new(mut fixtures: Vec<SeedFixture>) -> SeedResult<Self> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for fixture in &fixtures {
            for key in fixture.records.keys() {
                if let Some(first_table) = owners.insert(key.as_str(), fixture.table.as_str()) {
                    return Err(SeedError::DuplicateKey {
                        key: key.clone(),
                        first_table: first_table.to_string(),
                        second_table: fixture.table.clone(),
                    });
                }
            }
        }

        fixtures.sort_by_key(SeedFixture::order);
        Ok(Self { fixtures })
    }

    /// Fixtures in seeding order.
    #[must_use]
    pub fn fixtures(&self) -> &[SeedFixture] {
        &self.fixtures
    }

    /// Iterates fixtures in seeding order.
    pub fn iter(&self) -> std::slice::Iter<'_, SeedFixture> {
        self.fixtures.iter()
    }

    /// Number of fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Total number of records across all fixtures.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.fixtures.iter().map(SeedFixture::len).sum()
    }

    /// Dry-runs reference resolution without touching storage.
    ///
    /// Walks records in seeding order and reports the first reference that
    /// names an undeclared key, or a key that is only inserted later
    /// (including self-references and cycles).
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::UnknownReference`] or
    /// [`SeedError::UnresolvedReference`].
    pub fn check(&self) -> SeedResult<()> {
        let declared: HashSet<&str> = self
            .fixtures
            .iter()
            .flat_map(|f| f.records.keys().map(String::as_str))
            .collect();
        let mut inserted: HashSet<&str> = HashSet::with_capacity(declared.len());

        for fixture in &self.fixtures {
            for (key, record) in &fixture.records {
                for (field, value) in record {
                    let Some(reference) = value.as_reference() else {
                        continue;
                    };
                    let target = reference.target();

                    if !declared.contains(target) {
                        return Err(SeedError::UnknownReference {
                            table: fixture.table.clone(),
                            record: key.clone(),
                            field: field.clone(),
                            target: target.to_string(),
                        });
                    }
                    if !inserted.contains(target) {
                        return Err(SeedError::UnresolvedReference {
                            table: fixture.table.clone(),
                            record: key.clone(),
                            source: UnresolvedReference {
                                field: field.clone(),
                                target: target.to_string(),
                            },
                        });
                    }
                }
                inserted.insert(key.as_str());
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a FixtureSet {
    type Item = &'a SeedFixture;
    type IntoIter = std::slice::Iter<'a, SeedFixture>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixtures.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category() -> SeedFixture {
        SeedFixture::new("category", 1)
            .with_record("category-1", [("name", FieldValue::literal("News"))])
    }

    fn post() -> SeedFixture {
        SeedFixture::new("post", 2).with_record(
            "post-1",
            [
                ("title", FieldValue::literal("Hello")),
                ("cat_id", FieldValue::reference("category-1")),
            ],
        )
    }

    #[test]
    fn test_parse_toml_fixture() {
        let fixture = SeedFixture::parse(
            "post",
            r#"
            order = 2

            [post-1]
            title = "Hello"
            cat_id = { "$ref" = "category-1" }

            [post-2]
            title = "World"
            "#,
            FixtureFormat::Toml,
        )
        .unwrap();

        let expected =
            post().with_record("post-2", [("title", FieldValue::literal("World"))]);
        assert_eq!(fixture, expected);
    }

    #[test]
    fn test_parse_json_fixture() {
        let fixture = SeedFixture::parse(
            "category",
            r#"{ "order": 1, "category-1": { "name": "News" } }"#,
            FixtureFormat::Json,
        )
        .unwrap();

        assert_eq!(fixture, category());
    }

    #[test]
    fn test_json_duplicate_key_in_one_file_is_rejected() {
        let err = SeedFixture::parse(
            "category",
            r#"{"order":1,"category-1":{"name":"News"},"category-1":{"name":"Sport"}}"#,
            FixtureFormat::Json,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SeedError::DuplicateKey { ref key, ref first_table, ref second_table }
                if key == "category-1" && first_table == "category" && second_table == "category"
        ));
    }

    #[test]
    fn test_toml_duplicate_key_is_a_syntax_error() {
        let err = SeedFixture::parse(
            "category",
            "order = 1\n[category-1]\nname = \"News\"\n[category-1]\nname = \"Sport\"\n",
            FixtureFormat::Toml,
        )
        .unwrap_err();
        assert!(matches!(err, SeedError::Toml { .. }));
    }

    #[test]
    fn test_toml_datetimes_become_strings() {
        let fixture = SeedFixture::parse(
            "post",
            "order = 1\n[post-1]\ncreated = 2024-01-02T03:04:05Z\npublished_on = 2024-01-02\n",
            FixtureFormat::Toml,
        )
        .unwrap();

        let record = &fixture.records()["post-1"];
        assert_eq!(record["created"], FieldValue::literal("2024-01-02T03:04:05Z"));
        assert_eq!(record["published_on"], FieldValue::literal("2024-01-02"));
    }

    #[test]
    fn test_toml_nested_literals_are_converted() {
        let fixture = SeedFixture::parse(
            "post",
            r#"
            order = 1

            [post-1]
            tags = ["a", "b"]
            meta = { score = 1.5, draft = true, at = 1979-05-27T07:32:00 }
            "#,
            FixtureFormat::Toml,
        )
        .unwrap();

        let record = &fixture.records()["post-1"];
        assert_eq!(record["tags"], FieldValue::literal(json!(["a", "b"])));
        assert_eq!(
            record["meta"],
            FieldValue::literal(json!({
                "score": 1.5,
                "draft": true,
                "at": "1979-05-27T07:32:00",
            }))
        );
    }

    #[test]
    fn test_toml_nan_is_invalid() {
        let err = SeedFixture::parse(
            "post",
            "order = 1\n[post-1]\nscore = nan\n",
            FixtureFormat::Toml,
        )
        .unwrap_err();
        assert!(matches!(err, SeedError::Invalid { .. }));
    }

    #[test]
    fn test_missing_order_is_invalid() {
        let err = SeedFixture::parse("post", r#"{ "post-1": {} }"#, FixtureFormat::Json)
            .unwrap_err();
        assert!(matches!(err, SeedError::Invalid { .. }));

        let err = SeedFixture::parse("post", r#"{ "order": "2" }"#, FixtureFormat::Json)
            .unwrap_err();
        assert!(matches!(err, SeedError::Invalid { .. }));
    }

    #[test]
    fn test_non_table_record_is_invalid() {
        let err = SeedFixture::parse("post", "order = 1\npost-1 = 5\n", FixtureFormat::Toml)
            .unwrap_err();
        assert!(err.to_string().contains("post-1"));
    }

    #[test]
    fn test_syntax_errors_are_reported_per_format() {
        assert!(matches!(
            SeedFixture::parse("post", "order = ", FixtureFormat::Toml),
            Err(SeedError::Toml { .. })
        ));
        assert!(matches!(
            SeedFixture::parse("post", "{", FixtureFormat::Json),
            Err(SeedError::Json { .. })
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FixtureFormat::from_path(Path::new("db/seed/post.toml")),
            Some(FixtureFormat::Toml)
        );
        assert_eq!(
            FixtureFormat::from_path(Path::new("post.JSON")),
            Some(FixtureFormat::Json)
        );
        assert_eq!(FixtureFormat::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn test_set_sorts_by_order() {
        let set = FixtureSet::new(vec![post(), category()]).unwrap();
        let tables: Vec<_> = set.iter().map(SeedFixture::table).collect();
        assert_eq!(tables, ["category", "post"]);
        assert_eq!(set.record_count(), 2);
    }

    #[test]
    fn test_set_keeps_discovery_order_on_ties() {
        let set = FixtureSet::new(vec![
            SeedFixture::new("tag", 1),
            SeedFixture::new("category", 1),
            SeedFixture::new("user", 0),
        ])
        .unwrap();

        let tables: Vec<_> = set.iter().map(SeedFixture::table).collect();
        assert_eq!(tables, ["user", "tag", "category"]);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let dup = SeedFixture::new("archive", 3)
            .with_record("post-1", [("title", FieldValue::literal("again"))]);

        let err = FixtureSet::new(vec![post(), dup]).unwrap_err();
        assert!(matches!(
            err,
            SeedError::DuplicateKey { ref key, ref first_table, ref second_table }
                if key == "post-1" && first_table == "post" && second_table == "archive"
        ));
    }

    #[test]
    fn test_check_accepts_valid_order() {
        let set = FixtureSet::new(vec![post(), category()]).unwrap();
        assert!(set.check().is_ok());
    }

    #[test]
    fn test_check_reports_reference_to_later_fixture() {
        let early_post = SeedFixture::new("post", 0).with_record(
            "post-1",
            [("cat_id", FieldValue::reference("category-1"))],
        );
        let set = FixtureSet::new(vec![early_post, category()]).unwrap();

        let err = set.check().unwrap_err();
        assert!(matches!(err, SeedError::UnresolvedReference { .. }));
        assert_eq!(err.reference_target(), Some("category-1"));
    }

    #[test]
    fn test_check_reports_unknown_key() {
        let orphan = SeedFixture::new("post", 2)
            .with_record("post-1", [("cat_id", FieldValue::reference("category-9"))]);
        let set = FixtureSet::new(vec![category(), orphan]).unwrap();

        assert!(matches!(
            set.check(),
            Err(SeedError::UnknownReference { ref target, .. }) if target == "category-9"
        ));
    }

    #[test]
    fn test_check_reports_self_reference() {
        let node = SeedFixture::new("node", 1)
            .with_record("node-1", [("parent_id", FieldValue::reference("node-1"))]);
        let set = FixtureSet::new(vec![node]).unwrap();

        assert!(matches!(set.check(), Err(SeedError::UnresolvedReference { .. })));
    }
}
