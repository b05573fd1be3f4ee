//! Records: an id plus named scalar fields, and JSON loading with id checks.

#![forbid(unsafe_code)]

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::{TableError, TableResult, Value};

/// Caller-supplied unique record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

static NULL: Value = Value::Null;

/// One immutable input row: an id plus named scalar fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    id: RecordId,
    fields: FxHashMap<String, Value>,
}

impl Record {
    pub fn new(id: u64) -> Self {
        Self { id: RecordId(id), fields: FxHashMap::default() }
    }

    /// Builder-style field insert, mostly for tests and embedded data.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> RecordId { self.id }

    /// Field lookup; a missing field resolves to `Value::Null`.
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }

    pub fn contains(&self, key: &str) -> bool { self.fields.contains_key(key) }

    /// Build a record from a JSON object. `position` is only used for error reporting.
    pub fn from_json(obj: &serde_json::Value, id_field: &str, position: usize) -> TableResult<Self> {
        let missing = || TableError::MissingRecordId { position, id_field: id_field.to_string() };
        let map = obj.as_object().ok_or_else(missing)?;
        let id = map.get(id_field).and_then(|v| v.as_u64()).ok_or_else(missing)?;
        let mut fields = FxHashMap::default();
        fields.reserve(map.len());
        for (k, v) in map.iter() {
            let value = Value::from_json(v).ok_or_else(|| TableError::NonScalarField { id, field: k.clone() })?;
            fields.insert(k.clone(), value);
        }
        Ok(Self { id: RecordId(id), fields })
    }
}

/// Parse a JSON array of objects into records, rejecting duplicate ids.
pub fn records_from_json(text: &str, id_field: &str) -> TableResult<Vec<Record>> {
    let raw: serde_json::Value = serde_json::from_str(text).map_err(|e| TableError::InvalidRecords(e.to_string()))?;
    let items = raw
        .as_array()
        .ok_or_else(|| TableError::InvalidRecords("expected a JSON array of objects".to_string()))?;
    let mut seen: FxHashSet<RecordId> = FxHashSet::default();
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let rec = Record::from_json(item, id_field, i)?;
        if !seen.insert(rec.id()) { return Err(TableError::DuplicateRecordId(rec.id().0)); }
        out.push(rec);
    }
    Ok(out)
}
