//! Projection stage: records to rows of rendered cells.

#![forbid(unsafe_code)]

use serde::Serialize;
use smallvec::SmallVec;
use tabula_core::{ColumnRegistry, Record, RecordId, Value};

/// One rendered row: a cell per registry column, in registry order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub id: RecordId,
    pub cells: SmallVec<[Value; 8]>,
}

fn project_record(record: &Record, registry: &ColumnRegistry) -> Row {
    Row { id: record.id(), cells: registry.all_columns().map(|c| c.cell(record)).collect() }
}

/// Project `records` through the registry's formatters. Never touches the records.
pub fn project<'r, I>(records: I, registry: &ColumnRegistry) -> Vec<Row>
where
    I: IntoIterator<Item = &'r Record>,
{
    records.into_iter().map(|r| project_record(r, registry)).collect()
}
