//! Tabula core types: scalar values, records, column registry, view state and errors.

#![forbid(unsafe_code)]

pub mod columns;
mod error;
mod record;
mod state;
mod value;

pub use columns::{CellFormat, ColumnConfig, ColumnDef, ColumnRegistry, ColumnSummary, SortType};
pub use error::{TableError, TableResult};
pub use record::{records_from_json, Record, RecordId};
pub use state::{FilterState, SortDirection, SortIndicator, SortState};
pub use value::Value;

pub mod prelude {
    pub use super::{
        ColumnDef, ColumnRegistry, FilterState, Record, RecordId, SortDirection, SortIndicator, SortState, SortType,
        TableError, TableResult, Value,
    };
}
