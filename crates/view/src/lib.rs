//! Tabula view: projection stage and the coordinator that owns filter/sort
//! state and keeps the derived rows current.
//!
//! Pipeline per change: source -> filter -> sort -> project. The source is
//! never mutated; every recompute bumps the view epoch.

#![forbid(unsafe_code)]

mod config;
mod projection;

use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tabula_core::{ColumnRegistry, FilterState, Record, RecordId, SortIndicator, SortState, TableError, TableResult};
use tabula_filter::filter_positions;
use tabula_sort::sort_positions;
use tracing::{debug, warn};

pub use config::ViewConfig;
pub use projection::{project, Row};
pub use tabula_filter::{FilterDebugInfo, FilterDiagnostic};
pub use tabula_sort::SortDebugInfo;

pub mod prelude {
    pub use super::{project, HeaderCell, Row, TableView, ViewConfig, ViewDebugInfo};
}

/// Header rendering data for one column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub indicator: SortIndicator,
    pub filterable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViewDebugInfo {
    pub epoch: u64,
    pub filter: FilterDebugInfo,
    pub sort: SortDebugInfo,
    pub filter_cached: bool,
    pub sort_cached: bool,
    pub recompute_ms: f64,
}

#[derive(Clone)]
struct FilterEntry {
    /// Source indices, in source order.
    kept: Vec<usize>,
    debug: FilterDebugInfo,
    diagnostics: Vec<FilterDiagnostic>,
}

#[derive(Clone)]
struct SortEntry {
    /// Source indices, in display order.
    ordered: Vec<usize>,
    debug: SortDebugInfo,
}

#[derive(Default)]
struct Memo {
    filtered: FxHashMap<FilterState, FilterEntry>,
    sorted: FxHashMap<(FilterState, SortState), SortEntry>,
}

impl Memo {
    const MAX_ENTRIES: usize = 64;

    fn clear(&mut self) {
        self.filtered.clear();
        self.sorted.clear();
    }

    fn trim(&mut self) {
        if self.filtered.len() > Self::MAX_ENTRIES || self.sorted.len() > Self::MAX_ENTRIES { self.clear(); }
    }
}

/// Coordinator over one source record set and a fixed column registry.
pub struct TableView {
    registry: ColumnRegistry,
    source: Vec<Record>,
    filter: FilterState,
    sort: SortState,
    config: ViewConfig,
    visible: Vec<usize>,
    rows: Vec<Row>,
    diagnostics: Vec<FilterDiagnostic>,
    debug: ViewDebugInfo,
    epoch: u64,
    memo: Option<Memo>,
}

fn check_unique_ids(records: &[Record]) -> TableResult<()> {
    let mut seen: FxHashSet<RecordId> = FxHashSet::default();
    for r in records {
        if !seen.insert(r.id()) { return Err(TableError::DuplicateRecordId(r.id().0)); }
    }
    Ok(())
}

impl TableView {
    pub fn new(registry: ColumnRegistry, source: Vec<Record>, config: ViewConfig) -> TableResult<Self> {
        check_unique_ids(&source)?;
        let mut view = Self {
            registry,
            source,
            filter: FilterState::default(),
            sort: SortState::None,
            memo: config.memoize.then(Memo::default),
            config,
            visible: Vec::new(),
            rows: Vec::new(),
            diagnostics: Vec::new(),
            debug: ViewDebugInfo::default(),
            epoch: 0,
        };
        view.recompute();
        Ok(view)
    }

    fn require_column(&self, key: &str) -> TableResult<()> {
        if self.registry.get(key).is_none() { return Err(TableError::UnknownColumn(key.to_string())); }
        Ok(())
    }

    /// Filter input for one column changed; `None` or empty clears it.
    pub fn on_filter_input_changed(&mut self, key: &str, value: Option<&str>) -> TableResult<()> {
        self.require_column(key)?;
        if self.filter.set(key, value) { self.recompute(); }
        Ok(())
    }

    pub fn on_global_filter_changed(&mut self, value: Option<&str>) {
        if self.filter.set_global(value) { self.recompute(); }
    }

    /// Header click on `key`: ascending, descending, none.
    pub fn on_sort_toggled(&mut self, key: &str) -> TableResult<()> {
        self.require_column(key)?;
        self.sort.toggle(key);
        self.recompute();
        Ok(())
    }

    pub fn set_sort(&mut self, sort: SortState) -> TableResult<()> {
        if let Some(key) = sort.key() { self.require_column(key)?; }
        if sort != self.sort {
            self.sort = sort;
            self.recompute();
        }
        Ok(())
    }

    /// Swap in a new record set. Filter and sort state reset, cached results are dropped.
    pub fn replace_source(&mut self, records: Vec<Record>) -> TableResult<()> {
        check_unique_ids(&records)?;
        self.source = records;
        self.filter.clear();
        self.sort = SortState::None;
        if let Some(memo) = self.memo.as_mut() { memo.clear(); }
        self.recompute();
        Ok(())
    }

    fn run_filter(&mut self) -> (FilterEntry, bool) {
        if let Some(hit) = self.memo.as_ref().and_then(|m| m.filtered.get(&self.filter)) {
            return (hit.clone(), true);
        }
        let outcome = filter_positions(&self.source, &self.filter, &self.registry);
        let entry = FilterEntry { kept: outcome.positions, debug: outcome.debug, diagnostics: outcome.diagnostics };
        if let Some(memo) = self.memo.as_mut() {
            memo.trim();
            memo.filtered.insert(self.filter.clone(), entry.clone());
        }
        (entry, false)
    }

    fn run_sort(&mut self, kept: &[usize]) -> (SortEntry, bool) {
        let memo_key = (self.filter.clone(), self.sort.clone());
        if let Some(hit) = self.memo.as_ref().and_then(|m| m.sorted.get(&memo_key)) {
            return (hit.clone(), true);
        }
        let subset: Vec<&Record> = kept.iter().map(|&i| &self.source[i]).collect();
        let outcome = sort_positions(&subset, &self.sort, &self.registry);
        let ordered = outcome.positions.into_iter().map(|p| kept[p]).collect();
        let entry = SortEntry { ordered, debug: outcome.debug };
        if let Some(memo) = self.memo.as_mut() {
            memo.trim();
            memo.sorted.insert(memo_key, entry.clone());
        }
        (entry, false)
    }

    fn recompute(&mut self) {
        let started = Instant::now();
        let (filtered, filter_cached) = self.run_filter();
        let (sorted, sort_cached) = self.run_sort(&filtered.kept);
        self.rows = project(sorted.ordered.iter().map(|&i| &self.source[i]), &self.registry);
        self.visible = sorted.ordered;
        self.diagnostics = filtered.diagnostics;
        self.epoch += 1;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
        self.debug = ViewDebugInfo {
            epoch: self.epoch,
            filter: filtered.debug,
            sort: sorted.debug,
            filter_cached,
            sort_cached,
            recompute_ms: elapsed_ms,
        };
        metrics::gauge!("view_visible_rows", self.visible.len() as f64);
        debug!(
            epoch = self.epoch,
            visible = self.visible.len(),
            total = self.source.len(),
            filter_cached,
            sort_cached,
            ms = elapsed_ms,
            "view recomputed"
        );
        if elapsed_ms > self.config.slow_recompute_ms as f64 {
            warn!(
                ms = elapsed_ms,
                budget_ms = self.config.slow_recompute_ms,
                records = self.source.len(),
                "slow recompute; synchronous filter and sort exceeded the budget"
            );
        }
    }

    pub fn rows(&self) -> &[Row] { &self.rows }

    pub fn visible_row_count(&self) -> usize { self.visible.len() }
    pub fn total_row_count(&self) -> usize { self.source.len() }
    pub fn is_empty(&self) -> bool { self.visible.is_empty() }

    pub fn sort_indicator(&self, key: &str) -> SortIndicator { self.sort.indicator(key) }

    pub fn headers(&self) -> Vec<HeaderCell> {
        self.registry
            .all_columns()
            .map(|c| HeaderCell {
                key: c.key().to_string(),
                label: c.label().to_string(),
                indicator: self.sort.indicator(c.key()),
                filterable: c.is_filterable(),
            })
            .collect()
    }

    /// Footer text, e.g. "Showing 2 of 8 users".
    pub fn summary(&self, noun: &str) -> String {
        format!("Showing {} of {} {}", self.visible_row_count(), self.total_row_count(), noun)
    }

    pub fn diagnostics(&self) -> &[FilterDiagnostic] { &self.diagnostics }
    pub fn debug(&self) -> &ViewDebugInfo { &self.debug }
    pub fn epoch(&self) -> u64 { self.epoch }
    pub fn filter_state(&self) -> &FilterState { &self.filter }
    pub fn sort_state(&self) -> &SortState { &self.sort }
}
