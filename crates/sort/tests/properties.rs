use tabula_core::{ColumnDef, ColumnRegistry, Record, SortState, SortType};
use tabula_sort::{apply_sort, sort_key, sort_positions};

fn registry() -> ColumnRegistry {
    ColumnRegistry::register(vec![
        ColumnDef::new("name", "Name"),
        ColumnDef::new("department", "Department"),
        ColumnDef::new("lastLogin", "Last Login").sort_type(SortType::DateTime),
    ])
    .unwrap()
}

fn data() -> Vec<Record> {
    let rows = [
        (1, "John Doe", "Engineering", "2024-01-15T10:30:00Z"),
        (2, "Jane Smith", "Marketing", "2024-01-14T14:20:00Z"),
        (3, "Bob Johnson", "Support", "2024-01-10T16:45:00Z"),
        (4, "Alice Brown", "Sales", "2024-01-16T09:10:00Z"),
        (5, "Charlie Wilson", "Engineering", "2024-01-12T11:55:00Z"),
        (6, "Diana Prince", "HR", "2024-01-16T08:25:00Z"),
        (7, "Edward Norton", "Finance", "2024-01-13T17:30:00Z"),
        (8, "Fiona Green", "Marketing", "2024-01-08T12:40:00Z"),
    ];
    rows.iter()
        .map(|(id, name, dept, seen)| Record::new(*id).with("name", *name).with("department", *dept).with("lastLogin", *seen))
        .collect()
}

fn ids(rs: &[&Record]) -> Vec<u64> { rs.iter().map(|r| r.id().0).collect() }

#[test]
fn ties_keep_input_order_in_both_directions() {
    let d = data();
    let reg = registry();
    for sort in [SortState::ascending("department"), SortState::descending("department")] {
        let out = apply_sort(d.iter().collect(), &sort, &reg);
        let eng: Vec<u64> = out.iter().filter(|r| r.get("department").as_str() == Some("Engineering")).map(|r| r.id().0).collect();
        let mkt: Vec<u64> = out.iter().filter(|r| r.get("department").as_str() == Some("Marketing")).map(|r| r.id().0).collect();
        assert_eq!(eng, vec![1, 5]);
        assert_eq!(mkt, vec![2, 8]);
    }
}

#[test]
fn descending_is_exact_reverse_without_ties() {
    let d = data();
    let reg = registry();
    for key in ["name", "lastLogin"] {
        let asc = ids(&apply_sort(d.iter().collect(), &SortState::ascending(key), &reg));
        let mut desc = ids(&apply_sort(d.iter().collect(), &SortState::descending(key), &reg));
        desc.reverse();
        assert_eq!(asc, desc, "column {}", key);
    }
}

#[test]
fn sorting_twice_changes_nothing() {
    let d = data();
    let reg = registry();
    for sort in [
        SortState::None,
        SortState::ascending("department"),
        SortState::descending("department"),
        SortState::descending("lastLogin"),
    ] {
        let once = apply_sort(d.iter().collect(), &sort, &reg);
        let twice = apply_sort(once.clone(), &sort, &reg);
        assert_eq!(ids(&once), ids(&twice));
    }
}

#[test]
fn output_is_ordered_by_key() {
    let d = data();
    let reg = registry();
    let col = reg.get("lastLogin").unwrap();
    let out = sort_positions(&d, &SortState::ascending("lastLogin"), &reg);
    let keys: Vec<_> = out.positions.iter().map(|&i| sort_key(col.raw(&d[i]), SortType::DateTime).unwrap()).collect();
    assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(out.positions.len(), d.len());
}

#[test]
fn latest_login_first_when_descending() {
    let d = data();
    let out = apply_sort(d.iter().collect(), &SortState::descending("lastLogin"), &registry());
    assert_eq!(ids(&out)[..2], [4, 6]);
}

#[test]
fn signed_zeros_are_ties_and_keep_input_order() {
    let reg = ColumnRegistry::register(vec![ColumnDef::new("v", "V").sort_type(SortType::Numeric)]).unwrap();
    let d = vec![Record::new(1).with("v", 0.0), Record::new(2).with("v", -0.0), Record::new(3).with("v", -1.0)];
    let a = sort_key(d[0].get("v"), SortType::Numeric).unwrap();
    let b = sort_key(d[1].get("v"), SortType::Numeric).unwrap();
    assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    assert_eq!(a, b);
    assert_eq!(ids(&apply_sort(d.iter().collect(), &SortState::ascending("v"), &reg)), vec![3, 1, 2]);
    assert_eq!(ids(&apply_sort(d.iter().collect(), &SortState::descending("v"), &reg)), vec![1, 2, 3]);
}
