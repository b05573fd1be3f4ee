//! Tabula sort stage: stable, single-column ordering.
//!
//! Default comparison follows the column's declared `SortType`. Values that
//! cannot be turned into a comparable key (missing, unparseable timestamps,
//! non-numeric text under `Numeric`, ...) go to the end in input order,
//! whatever the direction.

#![forbid(unsafe_code)]

use std::borrow::{Borrow, Cow};
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tabula_core::{ColumnDef, ColumnRegistry, Record, SortDirection, SortState, SortType, Value};
use tracing::debug;

/// Comparable key derived from a field value under a declared sort type.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'r> {
    Bool(bool),
    Number(f64),
    Text(Cow<'r, str>),
    Instant(DateTime<Utc>),
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Instant(_) => 3,
        }
    }
}

impl Eq for SortKey<'_> {}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            // NaN never becomes a key; -0.0 and 0.0 compare equal.
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Instant(a), SortKey::Instant(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Key for `value` under `ty`, or `None` when the value is not comparable.
pub fn sort_key(value: &Value, ty: SortType) -> Option<SortKey<'_>> {
    match ty {
        SortType::Auto => match value {
            Value::Null => None,
            Value::Bool(b) => Some(SortKey::Bool(*b)),
            Value::Int(_) | Value::Float(_) => value.as_number().map(SortKey::Number),
            Value::Text(s) => Some(SortKey::Text(Cow::Borrowed(s.as_str()))),
        },
        SortType::Numeric => value.as_number().map(SortKey::Number),
        SortType::Text => match value {
            Value::Null => None,
            Value::Text(s) => Some(SortKey::Text(Cow::Borrowed(s.as_str()))),
            other => Some(SortKey::Text(Cow::Owned(other.to_string()))),
        },
        SortType::DateTime => value.as_instant().map(SortKey::Instant),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SortDebugInfo {
    pub total: usize,
    /// Column actually used, `None` for passthrough.
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
    /// Records placed at the end because their value could not be compared.
    pub uncomparable: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SortOutcome {
    /// Permutation of input positions.
    pub positions: Vec<usize>,
    pub debug: SortDebugInfo,
}

fn directed(o: Ordering, dir: SortDirection) -> Ordering {
    match dir {
        SortDirection::Ascending => o,
        SortDirection::Descending => o.reverse(),
    }
}

fn order_by_column<R: Borrow<Record>>(items: &[R], column: &ColumnDef, dir: SortDirection) -> (Vec<usize>, usize) {
    if let Some(cmp) = column.comparator() {
        let mut positions: Vec<usize> = (0..items.len()).collect();
        positions.sort_by(|&a, &b| directed(cmp(items[a].borrow(), items[b].borrow()), dir));
        return (positions, 0);
    }
    let ty = column.declared_sort_type();
    let mut keyed: Vec<(usize, SortKey<'_>)> = Vec::with_capacity(items.len());
    let mut tail: Vec<usize> = Vec::new();
    for (pos, item) in items.iter().enumerate() {
        match sort_key(column.raw(item.borrow()), ty) {
            Some(k) => keyed.push((pos, k)),
            None => tail.push(pos),
        }
    }
    // Stable sort with a reversed comparator keeps ties in input order for both directions.
    keyed.sort_by(|a, b| directed(a.1.cmp(&b.1), dir));
    let uncomparable = tail.len();
    let mut positions: Vec<usize> = keyed.into_iter().map(|(pos, _)| pos).collect();
    positions.extend(tail);
    (positions, uncomparable)
}

/// Order `items` by `sort` and return the permutation plus debug info.
pub fn sort_positions<R: Borrow<Record>>(items: &[R], sort: &SortState, registry: &ColumnRegistry) -> SortOutcome {
    let started = std::time::Instant::now();
    let total = items.len();
    let passthrough = || SortOutcome { positions: (0..total).collect(), debug: SortDebugInfo { total, ..Default::default() } };
    let SortState::By { key, direction } = sort else { return passthrough() };
    let Some(column) = registry.get(key) else {
        debug!(column = %key, "sort on unknown column; keeping input order");
        return passthrough();
    };
    let (positions, uncomparable) = order_by_column(items, column, *direction);
    if uncomparable > 0 {
        debug!(column = %key, uncomparable, "values not comparable under declared sort type; placed last");
    }
    metrics::histogram!("sort_eval_ms", started.elapsed().as_secs_f64() * 1_000.0);
    SortOutcome {
        positions,
        debug: SortDebugInfo { total, column: Some(key.clone()), direction: Some(*direction), uncomparable },
    }
}

/// Sorted copy of `records`; `SortState::None` keeps the input order.
pub fn apply_sort<'r>(records: Vec<&'r Record>, sort: &SortState, registry: &ColumnRegistry) -> Vec<&'r Record> {
    if sort.is_none() { return records; }
    let outcome = sort_positions(&records, sort, registry);
    outcome.positions.into_iter().map(|i| records[i]).collect()
}
