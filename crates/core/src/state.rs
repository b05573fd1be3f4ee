//! Filter and sort state owned by a view.
//!
//! Both are plain values: events mutate them, stages read them.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Active filter inputs keyed by column key, plus an optional global quick filter.
/// Empty input is the same as no input: it never creates an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    columns: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    global: Option<String>,
}

impl FilterState {
    pub fn new() -> Self { Self::default() }

    /// Builder used by tests and callers assembling a state in one go.
    pub fn with(mut self, key: impl Into<String>, value: &str) -> Self {
        self.set(key, Some(value));
        self
    }

    /// Set or clear the input for `key`. Returns whether the state changed.
    pub fn set(&mut self, key: impl Into<String>, value: Option<&str>) -> bool {
        let key = key.into();
        match value.filter(|v| !v.is_empty()) {
            Some(v) => {
                if self.columns.get(&key).map(|cur| cur == v).unwrap_or(false) { return false; }
                self.columns.insert(key, v.to_string());
                true
            }
            None => self.columns.remove(&key).is_some(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> { self.columns.get(key).map(|s| s.as_str()) }

    /// Active `(column key, input)` pairs in key order.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_global(&mut self, value: Option<&str>) -> bool {
        let next = value.filter(|v| !v.is_empty()).map(|v| v.to_string());
        if next == self.global { return false; }
        self.global = next;
        true
    }

    pub fn global(&self) -> Option<&str> { self.global.as_deref() }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() && self.global.is_none() }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.global = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Header affordance for one column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortIndicator {
    #[default]
    None,
    Ascending,
    Descending,
}

/// At most one active sort.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortState {
    #[default]
    None,
    By { key: String, direction: SortDirection },
}

impl SortState {
    pub fn ascending(key: impl Into<String>) -> Self {
        SortState::By { key: key.into(), direction: SortDirection::Ascending }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        SortState::By { key: key.into(), direction: SortDirection::Descending }
    }

    pub fn key(&self) -> Option<&str> {
        match self { SortState::By { key, .. } => Some(key.as_str()), SortState::None => None }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self { SortState::By { direction, .. } => Some(*direction), SortState::None => None }
    }

    pub fn is_none(&self) -> bool { matches!(self, SortState::None) }

    /// Header click: ascending -> descending -> none on the same column,
    /// ascending when a different column is clicked.
    pub fn toggle(&mut self, key: &str) {
        *self = match std::mem::take(self) {
            SortState::By { key: cur, direction: SortDirection::Ascending } if cur == key => SortState::descending(cur),
            SortState::By { key: cur, direction: SortDirection::Descending } if cur == key => SortState::None,
            _ => SortState::ascending(key),
        };
    }

    pub fn indicator(&self, key: &str) -> SortIndicator {
        match self {
            SortState::By { key: cur, direction } if cur == key => match direction {
                SortDirection::Ascending => SortIndicator::Ascending,
                SortDirection::Descending => SortIndicator::Descending,
            },
            _ => SortIndicator::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_clears_filter() {
        let mut f = FilterState::new();
        assert!(f.set("department", Some("Eng")));
        assert!(!f.set("department", Some("Eng")));
        assert_eq!(f.get("department"), Some("Eng"));
        assert!(f.set("department", Some("")));
        assert!(f.is_empty());
        assert!(!f.set("department", None));
    }

    #[test]
    fn global_input_counts_towards_emptiness() {
        let mut f = FilterState::new();
        assert!(f.set_global(Some("jo")));
        assert!(!f.is_empty());
        assert!(!f.set_global(Some("jo")));
        assert!(f.set_global(Some("")));
        assert!(f.is_empty());
    }

    #[test]
    fn toggle_cycles_asc_desc_none() {
        let mut s = SortState::None;
        s.toggle("name");
        assert_eq!(s, SortState::ascending("name"));
        s.toggle("name");
        assert_eq!(s.key(), Some("name"));
        assert_eq!(s.direction(), Some(SortDirection::Descending));
        s.toggle("name");
        assert!(s.is_none());
        assert_eq!(s.direction(), None);
    }

    #[test]
    fn toggle_on_other_column_restarts_ascending() {
        let mut s = SortState::descending("name");
        s.toggle("email");
        assert_eq!(s, SortState::ascending("email"));
        assert_eq!(s.indicator("email"), SortIndicator::Ascending);
        assert_eq!(s.indicator("name"), SortIndicator::None);
    }
}
