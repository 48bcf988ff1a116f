//! Flat input records and the store that holds them.
//!
//! Records arrive already parsed from an external loader (a JSON document,
//! a database row set). The store is an immutable snapshot: it is checked
//! once at ingestion and never mutated afterwards.

use crate::error::{ArborError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;

/// Opaque record identifier.
///
/// Integer and textual ids are distinct keys: `1` and `"1"` never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        RecordId::Int(n.into())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

/// A single flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier
    pub id: RecordId,

    /// Parent identifier (None for roots)
    #[serde(default)]
    pub parent_id: Option<RecordId>,

    /// Display label
    #[serde(default, deserialize_with = "label_or_empty")]
    pub name: String,

    /// Fields the engine does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a record with the given parent.
    pub fn new(
        id: impl Into<RecordId>,
        parent_id: Option<RecordId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id,
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// Create a root record.
    pub fn root(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self::new(id, None, name)
    }

    /// Create a record under `parent_id`.
    pub fn child(
        id: impl Into<RecordId>,
        parent_id: impl Into<RecordId>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(id, Some(parent_id.into()), name)
    }

    /// Attach an opaque payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Check if this record has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Scalar labels are accepted as-is, null becomes empty.
fn label_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "name must be a scalar, found {}",
            json_kind(&other)
        ))),
    }
}

/// Ordered, immutable snapshot of records for one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Wrap already-typed records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Ingest a JSON document holding an array of records.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Ingest JSON from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    /// Ingest a decoded JSON value.
    ///
    /// Every element is checked in order and the first malformed one aborts
    /// ingestion with its zero-based position.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(ArborError::NotAnArray {
                found: json_kind(&value).to_string(),
            });
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| decode_record(position, item))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// First record carrying `id`.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// All distinct ids, for repeated membership checks.
    pub fn id_set(&self) -> HashSet<&RecordId> {
        self.records.iter().map(|r| &r.id).collect()
    }

    /// Ids that occur more than once, with their counts, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<(RecordId, usize)> {
        let mut counts: IndexMap<&RecordId, usize> = IndexMap::new();
        for record in &self.records {
            *counts.entry(&record.id).or_default() += 1;
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, count)| (id.clone(), count))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn decode_record(position: usize, item: Value) -> Result<Record> {
    let Value::Object(fields) = &item else {
        return Err(ArborError::NotAnObject { position });
    };

    match fields.get("id") {
        None | Some(Value::Null) => return Err(ArborError::MissingId { position }),
        Some(value) if !is_key(value) => {
            return Err(ArborError::InvalidId {
                position,
                found: value.to_string(),
            })
        }
        Some(_) => {}
    }

    if let Some(value) = fields.get("parent_id") {
        if !value.is_null() && !is_key(value) {
            return Err(ArborError::InvalidParentId {
                position,
                found: value.to_string(),
            });
        }
    }

    serde_json::from_value(item).map_err(|e| ArborError::InvalidRecord {
        position,
        message: e.to_string(),
    })
}

fn is_key(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Number(n) => n.is_i64(),
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
