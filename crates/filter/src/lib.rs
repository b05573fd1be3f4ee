//! Tabula filter stage: per-column predicates combined with logical AND,
//! plus an optional global quick filter that passes when any column contains it.
//!
//! A record's outcome depends only on its own fields and the filter state.
//! Custom predicates may fail; a failure counts as "does not pass" for that
//! column and is reported as a diagnostic instead of aborting the stage.

#![forbid(unsafe_code)]

use std::borrow::Borrow;

use tabula_core::{ColumnDef, ColumnRegistry, FilterState, Record, RecordId, Value};
use tracing::{debug, warn};

/// Survivor counts after each stage of evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FilterDebugInfo {
    pub total: usize,
    /// `(column key, survivors)` in the order the column filters were applied.
    pub after_columns: Vec<(String, usize)>,
    pub after_global: usize,
    /// Filter keys that had no effect: unknown to the registry or not filterable.
    pub ignored: Vec<String>,
}

/// Non-fatal report of a custom predicate failing on one record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FilterDiagnostic {
    pub column: String,
    pub record: RecordId,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Positions (into the input slice) of passing items, in input order.
    pub positions: Vec<usize>,
    pub debug: FilterDebugInfo,
    pub diagnostics: Vec<FilterDiagnostic>,
}

/// Default predicate: case-insensitive substring match on the value's text form.
pub fn default_predicate(value: &Value, input: &str) -> bool {
    contains_lowercase(value, &input.to_lowercase())
}

fn contains_lowercase(value: &Value, needle_lower: &str) -> bool {
    value.to_string().to_lowercase().contains(needle_lower)
}

struct ActiveFilter<'a> {
    column: &'a ColumnDef,
    input: &'a str,
    input_lower: String,
}

/// A filter state resolved against a registry, ready to evaluate records.
pub struct FilterPlan<'a> {
    registry: &'a ColumnRegistry,
    columns: Vec<ActiveFilter<'a>>,
    /// Lowercased global quick-filter input.
    global: Option<String>,
    ignored: Vec<String>,
}

impl<'a> FilterPlan<'a> {
    pub fn compile(state: &'a FilterState, registry: &'a ColumnRegistry) -> Self {
        let mut columns = Vec::new();
        let mut ignored = Vec::new();
        for (key, input) in state.active() {
            match registry.get(key) {
                Some(column) if column.is_filterable() => {
                    columns.push(ActiveFilter { column, input, input_lower: input.to_lowercase() });
                }
                Some(_) => {
                    debug!(column = %key, "filter input on non-filterable column ignored");
                    ignored.push(key.to_string());
                }
                None => {
                    debug!(column = %key, "filter input on unknown column ignored");
                    ignored.push(key.to_string());
                }
            }
        }
        Self { registry, columns, global: state.global().map(|q| q.to_lowercase()), ignored }
    }

    fn eval_column(af: &ActiveFilter<'_>, record: &Record) -> anyhow::Result<bool> {
        match af.column.predicate() {
            Some(pred) => pred(record, af.input),
            None => Ok(contains_lowercase(af.column.raw(record), &af.input_lower)),
        }
    }

    /// Any registry column, filterable or not, containing the query passes.
    fn matches_global(&self, record: &Record) -> bool {
        let Some(q) = self.global.as_deref() else { return true };
        self.registry.all_columns().any(|c| contains_lowercase(c.raw(record), q))
    }

    /// Evaluate over `items`, keeping input order.
    pub fn run<R: Borrow<Record>>(&self, items: &[R]) -> FilterOutcome {
        let started = std::time::Instant::now();
        let total = items.len();
        let mut debug_info = FilterDebugInfo { total, ignored: self.ignored.clone(), ..Default::default() };
        let mut diagnostics = Vec::new();

        let mut candidates: Vec<usize> = (0..total).collect();
        for af in self.columns.iter() {
            candidates.retain(|&i| {
                let record = items[i].borrow();
                match Self::eval_column(af, record) {
                    Ok(pass) => pass,
                    Err(e) => {
                        warn!(column = %af.column.key(), record = record.id().0, error = %e, "filter predicate failed; record excluded");
                        diagnostics.push(FilterDiagnostic {
                            column: af.column.key().to_string(),
                            record: record.id(),
                            message: e.to_string(),
                        });
                        false
                    }
                }
            });
            debug_info.after_columns.push((af.column.key().to_string(), candidates.len()));
        }
        if self.global.is_some() {
            candidates.retain(|&i| self.matches_global(items[i].borrow()));
        }
        debug_info.after_global = candidates.len();

        if !diagnostics.is_empty() {
            metrics::counter!("filter_predicate_failures_total", diagnostics.len() as u64);
        }
        metrics::histogram!("filter_eval_ms", started.elapsed().as_secs_f64() * 1_000.0);
        debug!(total, kept = candidates.len(), columns = self.columns.len(), "filter stage evaluated");
        FilterOutcome { positions: candidates, debug: debug_info, diagnostics }
    }
}

/// Evaluate `state` over `items` and return positions plus debug info and diagnostics.
pub fn filter_positions<R: Borrow<Record>>(items: &[R], state: &FilterState, registry: &ColumnRegistry) -> FilterOutcome {
    FilterPlan::compile(state, registry).run(items)
}

/// Records passing every active filter, in input order.
pub fn apply_filters<'r, R: Borrow<Record>>(
    items: &'r [R],
    state: &FilterState,
    registry: &ColumnRegistry,
) -> Vec<&'r Record> {
    let outcome = filter_positions(items, state, registry);
    outcome.positions.into_iter().map(|i| items[i].borrow()).collect()
}
