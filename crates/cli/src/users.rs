//! Bundled sample data: eight users and the column schema that displays them.

use tabula_core::{records_from_json, CellFormat, ColumnDef, ColumnRegistry, Record, SortType, TableResult};

const SAMPLE_USERS: &str = include_str!("../assets/users.json");

pub fn sample_users() -> TableResult<Vec<Record>> { records_from_json(SAMPLE_USERS, "id") }

/// Name, Email, Role, Status, Department, Last Login. Only Role, Status and Department take filter input.
pub fn user_columns() -> TableResult<ColumnRegistry> {
    ColumnRegistry::register(vec![
        ColumnDef::new("name", "Name").not_filterable(),
        ColumnDef::new("email", "Email").not_filterable(),
        ColumnDef::new("role", "Role").format(CellFormat::Capitalize),
        ColumnDef::new("status", "Status").format(CellFormat::Capitalize),
        ColumnDef::new("department", "Department"),
        ColumnDef::new("lastLogin", "Last Login").sort_type(SortType::DateTime).format(CellFormat::Date).not_filterable(),
    ])
}
