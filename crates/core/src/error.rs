//! Setup-time errors. Everything here is fatal for the table it concerns:
//! a registry or record set that fails validation never reaches a view.

#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("validation: duplicate column key `{0}`")]
    DuplicateColumn(String),
    #[error("validation: empty column key at position {0}")]
    EmptyColumnKey(usize),
    #[error("validation: unknown column `{0}`")]
    UnknownColumn(String),
    #[error("validation: duplicate record id {0}")]
    DuplicateRecordId(u64),
    #[error("validation: record at position {position} has no integer `{id_field}` field")]
    MissingRecordId { position: usize, id_field: String },
    #[error("validation: field `{field}` of record {id} is not a scalar")]
    NonScalarField { id: u64, field: String },
    #[error("validation: invalid column config: {0}")]
    InvalidColumnConfig(String),
    #[error("validation: invalid records: {0}")]
    InvalidRecords(String),
}

pub type TableResult<T> = Result<T, TableError>;
