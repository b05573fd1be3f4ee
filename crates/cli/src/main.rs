use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tabula_core::{records_from_json, ColumnRegistry, ColumnSummary, Record, SortState};
use tabula_view::{FilterDiagnostic, HeaderCell, Row, TableView, ViewConfig, ViewDebugInfo};
use tracing::info;

mod render;
mod users;

#[derive(Parser, Debug)]
#[command(name = "tabula", version, about = "Filter, sort and render record tables")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the table after applying filters and sort
    Show {
        /// JSON array of records (default: bundled sample users)
        #[arg(long = "data", env = "TABULA_DATA")]
        data: Option<PathBuf>,
        /// JSON array of column configs (default: built-in user columns)
        #[arg(long = "columns")]
        columns: Option<PathBuf>,
        /// Record field holding the unique integer id
        #[arg(long = "id-field", default_value = "id")]
        id_field: String,
        /// Column filter, e.g. department=Engineering (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Case-insensitive search; a record matches when any column contains the text
        #[arg(long = "search")]
        search: Option<String>,
        /// Sort column, e.g. lastLogin:desc (default direction asc)
        #[arg(long = "sort", value_parser = parse_sort)]
        sort: Option<SortState>,
        /// Replay header clicks on a column, in order (repeatable)
        #[arg(long = "toggle")]
        toggles: Vec<String>,
        /// Plural noun used in the footer and empty state
        #[arg(long = "noun", default_value = "users")]
        noun: String,
        /// Explain filter stages and counts
        #[arg(long = "explain", action = ArgAction::SetTrue)]
        explain: bool,
    },
    /// List and validate the column registry
    Columns {
        /// JSON array of column configs (default: built-in user columns)
        #[arg(long = "columns")]
        columns: Option<PathBuf>,
    },
}

fn init_tracing() {
    let env = std::env::var("TABULA_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}

fn parse_sort(s: &str) -> Result<SortState, String> {
    let (key, dir) = match s.rsplit_once(':') {
        Some((k, d)) => (k, Some(d)),
        None => (s, None),
    };
    if key.is_empty() { return Err("sort column must not be empty".to_string()); }
    match dir.map(|d| d.to_ascii_lowercase()).as_deref() {
        None | Some("asc") | Some("ascending") => Ok(SortState::ascending(key)),
        Some("desc") | Some("descending") => Ok(SortState::descending(key)),
        Some(other) => Err(format!("unknown sort direction `{}` (use asc or desc)", other)),
    }
}

fn load_columns(path: Option<&Path>) -> Result<ColumnRegistry> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading columns from {}", p.display()))?;
            ColumnRegistry::from_json(&text).with_context(|| format!("columns file {}", p.display()))
        }
        None => users::user_columns().context("built-in user columns"),
    }
}

fn load_records(path: Option<&Path>, id_field: &str) -> Result<Vec<Record>> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading records from {}", p.display()))?;
            records_from_json(&text, id_field).with_context(|| format!("records file {}", p.display()))
        }
        None => users::sample_users().context("bundled sample users"),
    }
}

#[derive(Serialize)]
struct ShowJson<'a> {
    headers: Vec<HeaderCell>,
    rows: &'a [Row],
    visible: usize,
    total: usize,
    summary: String,
    diagnostics: &'a [FilterDiagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<&'a ViewDebugInfo>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { data, columns, id_field, filters, search, sort, toggles, noun, explain } => {
            info!(data = ?data, columns = ?columns, filters = filters.len(), "show invoked");
            let registry = load_columns(columns.as_deref())?;
            let records = load_records(data.as_deref(), &id_field)?;
            let mut view = TableView::new(registry, records, ViewConfig::from_env())?;
            for (key, value) in filters.iter() {
                view.on_filter_input_changed(key, Some(value.as_str()))?;
            }
            view.on_global_filter_changed(search.as_deref());
            if let Some(s) = sort { view.set_sort(s)?; }
            for key in toggles.iter() {
                view.on_sort_toggled(key)?;
            }

            match cli.output {
                Output::Human => {
                    if view.is_empty() {
                        println!("No {} found matching your search.", noun);
                    } else {
                        print!("{}", render::table(&view.headers(), view.rows()));
                    }
                    println!("{}", view.summary(&noun));
                }
                Output::Json => {
                    let out = ShowJson {
                        headers: view.headers(),
                        rows: view.rows(),
                        visible: view.visible_row_count(),
                        total: view.total_row_count(),
                        summary: view.summary(&noun),
                        diagnostics: view.diagnostics(),
                        debug: explain.then(|| view.debug()),
                    };
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
            if explain && matches!(cli.output, Output::Human) {
                let dbg = view.debug();
                let cols: Vec<String> = dbg.filter.after_columns.iter().map(|(k, n)| format!("{}={}", k, n)).collect();
                eprintln!(
                    "debug: epoch={} total={} after_columns=[{}] after_global={} ignored=[{}] sort={} uncomparable={} recompute={:.3}ms",
                    dbg.epoch,
                    dbg.filter.total,
                    cols.join(", "),
                    dbg.filter.after_global,
                    dbg.filter.ignored.join(", "),
                    view.sort_state().key().unwrap_or("-"),
                    dbg.sort.uncomparable,
                    dbg.recompute_ms
                );
            }
        }
        Commands::Columns { columns } => {
            info!(columns = ?columns, "columns invoked");
            let registry = load_columns(columns.as_deref())?;
            let summaries: Vec<ColumnSummary> = registry.all_columns().map(|c| c.summary()).collect();
            match cli.output {
                Output::Human => {
                    println!("{:<16} {:<20} {:<9} FILTERABLE", "KEY", "LABEL", "SORT");
                    for s in summaries.iter() {
                        let sort = serde_json::to_value(s.sort_type)?;
                        println!("{:<16} {:<20} {:<9} {}", s.key, s.label, sort.as_str().unwrap_or("auto"), if s.filterable { "yes" } else { "no" });
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
            }
        }
    }
    Ok(())
}
