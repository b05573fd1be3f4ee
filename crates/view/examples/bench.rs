use std::time::Instant;

use tabula_core::{CellFormat, ColumnDef, ColumnRegistry, Record, SortType, TableResult};
use tabula_view::{TableView, ViewConfig};

const DEPARTMENTS: [&str; 6] = ["Engineering", "Marketing", "Sales", "Support", "HR", "Finance"];
const ROLES: [&str; 3] = ["admin", "user", "moderator"];
const STATUSES: [&str; 3] = ["active", "inactive", "pending"];

fn gen_user(i: usize) -> Record {
    let day = 1 + i % 28;
    let minute = i % 60;
    Record::new(i as u64 + 1)
        .with("name", format!("user-{i:06}"))
        .with("email", format!("user-{i:06}@example.com"))
        .with("role", ROLES[i % ROLES.len()])
        .with("status", STATUSES[i % STATUSES.len()])
        .with("department", DEPARTMENTS[i % DEPARTMENTS.len()])
        .with("lastLogin", format!("2024-01-{day:02}T10:{minute:02}:00Z"))
}

fn registry() -> TableResult<ColumnRegistry> {
    ColumnRegistry::register(vec![
        ColumnDef::new("name", "Name"),
        ColumnDef::new("email", "Email"),
        ColumnDef::new("role", "Role").format(CellFormat::Capitalize),
        ColumnDef::new("status", "Status").format(CellFormat::Capitalize),
        ColumnDef::new("department", "Department"),
        ColumnDef::new("lastLogin", "Last Login").sort_type(SortType::DateTime).format(CellFormat::Date),
    ])
}

fn percentile_us(xs: &mut [u128], p: f64) -> Option<u128> {
    if xs.is_empty() { return None; }
    xs.sort_unstable();
    let idx = ((xs.len() as f64 - 1.0) * p).round() as usize;
    Some(xs[idx])
}

fn fmt_ms(us: Option<u128>) -> String {
    match us {
        Some(us) => format!("{:.3}ms", us as f64 / 1000.0),
        None => "n/a".to_string(),
    }
}

fn main() -> anyhow::Result<()> {
    let n: usize = std::env::var("TABULA_BENCH_ROWS").ok().and_then(|s| s.parse().ok()).unwrap_or(100_000);
    let iters: usize = std::env::var("TABULA_BENCH_ITERS").ok().and_then(|s| s.parse().ok()).unwrap_or(20);
    let config = ViewConfig::from_env();

    eprintln!("generating {} records", n);
    let t0 = Instant::now();
    let data: Vec<Record> = (0..n).map(gen_user).collect();
    let gen_ms = t0.elapsed().as_secs_f64() * 1_000.0;

    let t1 = Instant::now();
    let mut view = TableView::new(registry()?, data, config)?;
    let mount_ms = t1.elapsed().as_secs_f64() * 1_000.0;
    println!("mount: generate={:.1}ms first_recompute={:.1}ms rows={} memoize={}", gen_ms, mount_ms, n, config.memoize);

    let mut run = |label: &str, step: &dyn Fn(&mut TableView, usize) -> TableResult<()>| -> TableResult<()> {
        let mut times: Vec<u128> = Vec::with_capacity(iters);
        for i in 0..iters {
            let t = Instant::now();
            step(&mut view, i)?;
            times.push(t.elapsed().as_micros());
        }
        let p50 = percentile_us(&mut times.clone(), 0.50);
        let p99 = percentile_us(&mut times, 0.99);
        println!("{}: p50={} p99={} ({} events, visible={})", label, fmt_ms(p50), fmt_ms(p99), iters, view.visible_row_count());
        Ok(())
    };

    run("filter_department", &|v, i| v.on_filter_input_changed("department", Some(DEPARTMENTS[i % DEPARTMENTS.len()])))?;
    run("toggle_last_login", &|v, _| v.on_sort_toggled("lastLogin"))?;
    run("global_search", &|v, i| {
        let q = format!("user-{:03}", i % 1000);
        v.on_global_filter_changed(Some(&q));
        Ok(())
    })?;
    Ok(())
}
