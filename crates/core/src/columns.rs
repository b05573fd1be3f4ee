//! Column definitions and the ordered column registry.
//!
//! This module provides:
//! - `ColumnDef`: key, label, declared sort type and optional filter/sort/format hooks
//! - `ColumnConfig`: the closed, serializable form of a column (unknown fields rejected)
//! - `ColumnRegistry`: an ordered, immutable set of columns with unique keys

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Record, TableError, TableResult, Value};

/// Custom filter predicate: `(record, filter input) -> passes`.
pub type FilterFn = dyn Fn(&Record, &str) -> anyhow::Result<bool> + Send + Sync;
/// Custom sort comparator in ascending order.
pub type CompareFn = dyn Fn(&Record, &Record) -> Ordering + Send + Sync;
/// Custom cell formatter.
pub type FormatFn = dyn Fn(&Record) -> Value + Send + Sync;

/// Declared comparison semantics for the default comparator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    /// Compare by the runtime value type: bools, then numbers, then text.
    #[default]
    Auto,
    Numeric,
    Text,
    DateTime,
}

/// Built-in formatters selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    #[default]
    Raw,
    /// Uppercase the first character of text values ("pending" -> "Pending").
    Capitalize,
    /// Render timestamps as `YYYY-MM-DD`; unparseable values pass through.
    Date,
}

impl CellFormat {
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            CellFormat::Raw => value.clone(),
            CellFormat::Capitalize => match value {
                Value::Text(s) => {
                    let mut chars = s.chars();
                    match chars.next() {
                        Some(first) => Value::Text(first.to_uppercase().chain(chars).collect()),
                        None => Value::Text(String::new()),
                    }
                }
                other => other.clone(),
            },
            CellFormat::Date => match value.as_instant() {
                Some(ts) => Value::Text(ts.format("%Y-%m-%d").to_string()),
                None => value.clone(),
            },
        }
    }
}

fn default_true() -> bool { true }

/// Closed configuration for one column, e.g. loaded from a JSON column file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sort_type: SortType,
    #[serde(default)]
    pub format: CellFormat,
    #[serde(default = "default_true")]
    pub filterable: bool,
}

/// Schema entry describing how one field is filtered, sorted and displayed.
#[derive(Clone)]
pub struct ColumnDef {
    key: String,
    label: String,
    sort_type: SortType,
    format: CellFormat,
    filterable: bool,
    predicate: Option<Arc<FilterFn>>,
    comparator: Option<Arc<CompareFn>>,
    formatter: Option<Arc<FormatFn>>,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sort_type: SortType::Auto,
            format: CellFormat::Raw,
            filterable: true,
            predicate: None,
            comparator: None,
            formatter: None,
        }
    }

    pub fn from_config(cfg: ColumnConfig) -> Self {
        let mut col = Self::new(cfg.key, cfg.label).sort_type(cfg.sort_type).format(cfg.format);
        col.filterable = cfg.filterable;
        col
    }

    pub fn sort_type(mut self, ty: SortType) -> Self { self.sort_type = ty; self }
    pub fn format(mut self, fmt: CellFormat) -> Self { self.format = fmt; self }
    pub fn not_filterable(mut self) -> Self { self.filterable = false; self }

    pub fn filter_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &str) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(f));
        self
    }

    pub fn sort_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &Record) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(f));
        self
    }

    pub fn format_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn key(&self) -> &str { &self.key }
    pub fn label(&self) -> &str { &self.label }
    pub fn declared_sort_type(&self) -> SortType { self.sort_type }
    pub fn is_filterable(&self) -> bool { self.filterable }
    pub fn predicate(&self) -> Option<&FilterFn> { self.predicate.as_deref() }
    pub fn comparator(&self) -> Option<&CompareFn> { self.comparator.as_deref() }

    /// Raw field value this column projects.
    pub fn raw<'r>(&self, record: &'r Record) -> &'r Value { record.get(&self.key) }

    /// Renderable cell: the custom formatter if set, else the built-in format of the raw value.
    pub fn cell(&self, record: &Record) -> Value {
        match &self.formatter {
            Some(f) => f(record),
            None => self.format.apply(record.get(&self.key)),
        }
    }

    pub fn summary(&self) -> ColumnSummary {
        ColumnSummary {
            key: self.key.clone(),
            label: self.label.clone(),
            sort_type: self.sort_type,
            format: self.format,
            filterable: self.filterable,
            custom_filter: self.predicate.is_some(),
            custom_sort: self.comparator.is_some(),
            custom_format: self.formatter.is_some(),
        }
    }
}

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sort_type", &self.sort_type)
            .field("format", &self.format)
            .field("filterable", &self.filterable)
            .field("custom_filter", &self.predicate.is_some())
            .field("custom_sort", &self.comparator.is_some())
            .field("custom_format", &self.formatter.is_some())
            .finish()
    }
}

/// Serializable description of a registered column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub key: String,
    pub label: String,
    pub sort_type: SortType,
    pub format: CellFormat,
    pub filterable: bool,
    pub custom_filter: bool,
    pub custom_sort: bool,
    pub custom_format: bool,
}

/// Ordered, immutable column set. Keys are unique and non-empty.
#[derive(Clone, Debug)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDef>,
    by_key: FxHashMap<String, usize>,
}

impl ColumnRegistry {
    pub fn register(columns: Vec<ColumnDef>) -> TableResult<Self> {
        let mut by_key: FxHashMap<String, usize> = FxHashMap::default();
        for (i, c) in columns.iter().enumerate() {
            if c.key.is_empty() { return Err(TableError::EmptyColumnKey(i)); }
            if by_key.insert(c.key.clone(), i).is_some() {
                return Err(TableError::DuplicateColumn(c.key.clone()));
            }
        }
        Ok(Self { columns, by_key })
    }

    pub fn from_configs(configs: Vec<ColumnConfig>) -> TableResult<Self> {
        Self::register(configs.into_iter().map(ColumnDef::from_config).collect())
    }

    /// Parse a JSON array of `ColumnConfig` and register it.
    pub fn from_json(text: &str) -> TableResult<Self> {
        let configs: Vec<ColumnConfig> =
            serde_json::from_str(text).map_err(|e| TableError::InvalidColumnConfig(e.to_string()))?;
        Self::from_configs(configs)
    }

    pub fn column_at(&self, idx: usize) -> Option<&ColumnDef> { self.columns.get(idx) }

    /// Columns in left-to-right order.
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDef> { self.columns.iter() }

    pub fn get(&self, key: &str) -> Option<&ColumnDef> {
        self.by_key.get(key).map(|&i| &self.columns[i])
    }

    pub fn position(&self, key: &str) -> Option<usize> { self.by_key.get(key).copied() }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.columns.iter().map(|c| c.key.as_str()) }

    pub fn len(&self) -> usize { self.columns.len() }
    pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}
