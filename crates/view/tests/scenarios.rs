use tabula_core::prelude::*;
use tabula_core::{records_from_json, CellFormat};
use tabula_view::prelude::*;

const USERS: &str = include_str!("fixtures/users.json");

fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("name", "Name").not_filterable(),
        ColumnDef::new("email", "Email").not_filterable(),
        ColumnDef::new("role", "Role").format(CellFormat::Capitalize),
        ColumnDef::new("status", "Status").format(CellFormat::Capitalize),
        ColumnDef::new("department", "Department"),
        ColumnDef::new("lastLogin", "Last Login").sort_type(SortType::DateTime).format(CellFormat::Date).not_filterable(),
    ]
}

fn users() -> Vec<Record> { records_from_json(USERS, "id").unwrap() }

fn view_with(config: ViewConfig) -> TableView {
    TableView::new(ColumnRegistry::register(columns()).unwrap(), users(), config).unwrap()
}

fn view() -> TableView { view_with(ViewConfig::default()) }

fn names(v: &TableView) -> Vec<String> {
    v.rows().iter().map(|r| r.cells[0].to_string()).collect()
}

#[test]
fn initial_view_shows_everything_in_source_order() {
    let v = view();
    assert_eq!(v.visible_row_count(), 8);
    assert_eq!(v.total_row_count(), 8);
    assert_eq!(v.rows().iter().map(|r| r.id.0).collect::<Vec<_>>(), (1..=8).collect::<Vec<_>>());
    assert_eq!(v.summary("users"), "Showing 8 of 8 users");
}

#[test]
fn department_filter_keeps_engineering() {
    let mut v = view();
    v.on_filter_input_changed("department", Some("Engineering")).unwrap();
    assert_eq!(names(&v), vec!["John Doe", "Charlie Wilson"]);
    assert_eq!(v.visible_row_count(), 2);
    assert_eq!(v.total_row_count(), 8);
    assert_eq!(v.summary("users"), "Showing 2 of 8 users");
}

#[test]
fn last_login_descending_puts_latest_first() {
    let mut v = view();
    v.on_sort_toggled("lastLogin").unwrap();
    v.on_sort_toggled("lastLogin").unwrap();
    assert_eq!(v.sort_indicator("lastLogin"), SortIndicator::Descending);
    assert_eq!(names(&v)[..2], ["Alice Brown", "Diana Prince"]);
    assert_eq!(v.rows()[0].cells[5], Value::from("2024-01-16"));
}

#[test]
fn contradictory_filters_give_empty_state() {
    let mut v = view();
    v.on_filter_input_changed("status", Some("pending")).unwrap();
    v.on_filter_input_changed("department", Some("HR")).unwrap();
    assert!(v.is_empty());
    assert!(v.rows().is_empty());
    assert_eq!(v.summary("users"), "Showing 0 of 8 users");
}

#[test]
fn duplicate_column_key_is_rejected() {
    let mut cols = columns();
    cols.push(ColumnDef::new("email", "Email again"));
    assert_eq!(ColumnRegistry::register(cols).err(), Some(TableError::DuplicateColumn("email".to_string())));
}

#[test]
fn header_click_cycles_and_moves_between_columns() {
    let mut v = view();
    v.on_sort_toggled("name").unwrap();
    assert_eq!(names(&v)[0], "Alice Brown");
    v.on_sort_toggled("name").unwrap();
    assert_eq!(names(&v)[0], "John Doe");
    v.on_sort_toggled("name").unwrap();
    assert_eq!(v.sort_state(), &SortState::None);
    assert_eq!(v.rows()[0].id.0, 1);

    v.on_sort_toggled("name").unwrap();
    v.on_sort_toggled("department").unwrap();
    let headers = v.headers();
    assert_eq!(headers[0].indicator, SortIndicator::None);
    assert_eq!(headers[4].indicator, SortIndicator::Ascending);
    assert_eq!(headers[4].label, "Department");
}

#[test]
fn sort_applies_to_filtered_subset() {
    let mut v = view();
    v.on_filter_input_changed("role", Some("user")).unwrap();
    v.set_sort(SortState::descending("name")).unwrap();
    assert_eq!(names(&v), vec!["Jane Smith", "Edward Norton", "Charlie Wilson", "Alice Brown"]);
}

#[test]
fn input_on_non_filterable_column_is_ignored() {
    let mut v = view();
    v.on_filter_input_changed("email", Some("zzz")).unwrap();
    assert_eq!(v.visible_row_count(), 8);
    assert_eq!(v.debug().filter.ignored, vec!["email".to_string()]);
    assert_eq!(v.headers().iter().filter(|h| h.filterable).count(), 3);
}

#[test]
fn clearing_a_filter_restores_rows() {
    let mut v = view();
    v.on_filter_input_changed("department", Some("Marketing")).unwrap();
    assert_eq!(v.visible_row_count(), 2);
    v.on_filter_input_changed("department", Some("")).unwrap();
    assert_eq!(v.visible_row_count(), 8);
    assert!(v.filter_state().is_empty());
}

#[test]
fn global_search_narrows_with_column_filters() {
    let mut v = view();
    v.on_global_filter_changed(Some("fiona"));
    assert_eq!(names(&v), vec!["Fiona Green"]);
    v.on_filter_input_changed("status", Some("pending")).unwrap();
    assert!(v.is_empty());
    v.on_global_filter_changed(None);
    assert_eq!(names(&v), vec!["Charlie Wilson"]);
}

#[test]
fn global_search_needs_the_text_inside_one_field() {
    let mut v = view();
    v.on_global_filter_changed(Some("2024-01-15"));
    assert_eq!(names(&v), vec!["John Doe"]);
    v.on_global_filter_changed(Some("ads"));
    assert!(v.is_empty());
    v.on_global_filter_changed(Some("MARKET"));
    assert_eq!(names(&v), vec!["Jane Smith", "Fiona Green"]);
}

#[test]
fn failing_predicate_only_drops_its_record() {
    let mut cols = columns();
    cols.push(ColumnDef::new("createdAt", "Created").filter_with(|r, input| {
        let year: i32 = input.parse()?;
        if r.id().0 == 3 { anyhow::bail!("corrupt timestamp"); }
        Ok(r.get("createdAt").as_str().map(|s| s.starts_with(&year.to_string())).unwrap_or(false))
    }));
    let mut v = TableView::new(ColumnRegistry::register(cols).unwrap(), users(), ViewConfig::default()).unwrap();
    v.on_filter_input_changed("createdAt", Some("2023")).unwrap();
    assert_eq!(v.visible_row_count(), 7);
    assert!(v.rows().iter().all(|r| r.id.0 != 3));
    assert_eq!(v.diagnostics().len(), 1);
    assert_eq!(v.diagnostics()[0].column, "createdAt");
}

#[test]
fn unparseable_login_sorts_last_both_ways() {
    let mut data = users();
    data.push(Record::new(9).with("name", "Ghost").with("lastLogin", "never"));
    data.push(Record::new(10).with("name", "Nobody"));
    let mut v = TableView::new(ColumnRegistry::register(columns()).unwrap(), data, ViewConfig::default()).unwrap();
    for sort in [SortState::ascending("lastLogin"), SortState::descending("lastLogin")] {
        v.set_sort(sort).unwrap();
        let ids: Vec<u64> = v.rows().iter().map(|r| r.id.0).collect();
        assert_eq!(ids[8..], [9, 10]);
        assert_eq!(v.debug().sort.uncomparable, 2);
    }
}

#[test]
fn replace_source_resets_state() {
    let mut v = view();
    v.on_filter_input_changed("department", Some("Engineering")).unwrap();
    v.on_sort_toggled("name").unwrap();
    let before = v.epoch();
    v.replace_source(users().into_iter().take(3).collect()).unwrap();
    assert!(v.filter_state().is_empty());
    assert_eq!(v.sort_state(), &SortState::None);
    assert_eq!(v.visible_row_count(), 3);
    assert_eq!(v.total_row_count(), 3);
    assert!(v.epoch() > before);
}

#[test]
fn memoized_and_plain_views_agree() {
    let mut plain = view();
    let mut memo = view_with(ViewConfig::default().memoized());
    let steps: Vec<Box<dyn Fn(&mut TableView)>> = vec![
        Box::new(|v: &mut TableView| v.on_filter_input_changed("status", Some("active")).unwrap()),
        Box::new(|v: &mut TableView| v.on_sort_toggled("lastLogin").unwrap()),
        Box::new(|v: &mut TableView| v.on_filter_input_changed("status", None).unwrap()),
        Box::new(|v: &mut TableView| v.on_sort_toggled("lastLogin").unwrap()),
        Box::new(|v: &mut TableView| v.on_filter_input_changed("status", Some("active")).unwrap()),
        Box::new(|v: &mut TableView| v.on_global_filter_changed(Some("example"))),
        Box::new(|v: &mut TableView| v.on_sort_toggled("lastLogin").unwrap()),
    ];
    for step in steps.iter() {
        step(&mut plain);
        step(&mut memo);
        assert_eq!(plain.rows(), memo.rows());
        assert_eq!(plain.summary("users"), memo.summary("users"));
    }
    assert!(memo.debug().filter_cached);
}

#[test]
fn projection_leaves_records_untouched() {
    let data = users();
    let snapshot = data.clone();
    let reg = ColumnRegistry::register(columns()).unwrap();
    let a = project(data.iter(), &reg);
    let b = project(data.iter(), &reg);
    assert_eq!(a, b);
    assert_eq!(data, snapshot);
    assert_eq!(a[2].cells[2], Value::from("Moderator"));
    assert_eq!(data[2].get("role"), &Value::from("moderator"));
}

#[test]
fn rows_serialize_as_plain_cells() {
    let mut v = view();
    v.on_global_filter_changed(Some("diana"));
    let json = serde_json::to_value(v.rows()).unwrap();
    assert_eq!(json[0]["id"], 6);
    assert_eq!(json[0]["cells"][0], "Diana Prince");
    assert_eq!(json[0]["cells"][5], "2024-01-16");
}
