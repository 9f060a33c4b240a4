//! **Atelier Dashboard**: `atelier` prints collection views and applies
//! mutations for every studio page from the terminal.
//!
//! ## Usage
//!
//! ```text
//! atelier status                                   collection matrix (default)
//! atelier view <collection> [--search s] [--filter facet=value]... [--sort key]
//! atelier add <collection> field=value...
//! atelier update <collection> <id> field=value...
//! atelier delete <collection> <id>
//! atelier duplicate <collection> <id>
//! atelier favorite <collection> <id>
//! atelier export <collection> csv|json|text
//! atelier init                                     write config/atelier.toml
//! ```

use atelier_core::advisory::{self, Advisory};
use atelier_core::export::{self, ExportFormat, Tabular};
use atelier_core::{
    Choice, CollectionStatus, EntityKind, FormInput, FromForm, Record, Repository, Studio,
    StudioConfig, ViewParams, DEFAULT_CONFIG_PATH, UNKNOWN_REFERENCE,
};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::collections::HashMap;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Every collection page the dashboard can show.
trait Page: FromForm + Tabular + Advisory {}

impl<R: FromForm + Tabular + Advisory> Page for R {}

/// Runs `$f(&repo, args...)` against the repository for `$kind`.
macro_rules! dispatch {
    ($studio:expr, $kind:expr, $f:ident ( $($arg:expr),* )) => {
        match $kind {
            EntityKind::Signal => $f(&$studio.signals, $($arg),*),
            EntityKind::SignalComment => $f(&$studio.comments, $($arg),*),
            EntityKind::Design => $f(&$studio.designs, $($arg),*),
            EntityKind::FundingRound => $f(&$studio.rounds, $($arg),*),
            EntityKind::Investor => $f(&$studio.investors, $($arg),*),
            EntityKind::Prototype => $f(&$studio.prototypes, $($arg),*),
            EntityKind::BrandAsset => $f(&$studio.assets, $($arg),*),
            EntityKind::Challenge => $f(&$studio.challenges, $($arg),*),
            EntityKind::Solution => $f(&$studio.solutions, $($arg),*),
        }
    };
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let sub = args.get(1).map(|s| s.as_str()).unwrap_or("status");
    let rest: &[String] = args.get(2..).unwrap_or(&[]);

    if matches!(sub, "--help" | "-h" | "help") {
        print_help();
        return;
    }

    let config = match StudioConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("atelier {}: {}", sub, e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if sub == "init" {
        if let Err(e) = run_init(&config) {
            eprintln!("atelier init: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let (studio, sync) = match Studio::open(&config) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!(
                "atelier {}: cannot open collection store at {}: {}",
                sub,
                config.db_path().display(),
                e
            );
            std::process::exit(1);
        }
    };

    let result = run(&studio, &config, sub, rest);

    // Dropping the studio closes the sync queue so the worker can drain.
    drop(studio);
    if let Some(handle) = sync {
        match handle.await {
            Ok(pushed) => tracing::debug!(target: "atelier::sync", pushed, "mirror drained"),
            Err(e) => tracing::warn!(target: "atelier::sync", error = %e, "mirror worker aborted"),
        }
    }

    if let Err(e) = result {
        eprintln!("atelier {}: {}", sub, e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("Atelier Dashboard v{}", VERSION);
    println!();
    println!("Usage: atelier [COMMAND] [ARGS]");
    println!();
    println!("Commands:");
    println!("  status                               Collection matrix (default)");
    println!("  view <collection> [options]          Filtered, sorted table with summary and advisory");
    println!("      --search <text>                  Case-insensitive match on title, text fields and tags");
    println!("      --filter <facet>=<value>         Exact match on a category/status field (repeatable)");
    println!("      --sort <key>                     Secondary sort key; favorites always come first");
    println!("  add <collection> field=value...      Create a record");
    println!("  update <collection> <id> f=v...      Edit fields of a record, coerced as in add");
    println!("  delete <collection> <id>             Delete (challenges also remove their solutions)");
    println!("  duplicate <collection> <id>          Copy with a new id and reset progress");
    println!("  favorite <collection> <id>           Toggle the favorite flag");
    println!("  export <collection> csv|json|text    Print an export to stdout");
    println!("  init                                 Write the current config to {}", DEFAULT_CONFIG_PATH);
    println!("  help                                 Print this help message");
    println!();
    println!("Collections:");
    for kind in EntityKind::ALL {
        println!("  {:<12} {:<22} key {}", kind.collection_name(), kind.page(), kind.store_key());
    }
    println!();
    println!("Configure via ATELIER_CONFIG or {} and ATELIER__* environment variables.", DEFAULT_CONFIG_PATH);
}

fn run(studio: &Studio, config: &StudioConfig, sub: &str, rest: &[String]) -> Result<(), String> {
    match sub {
        "status" | "dash" => {
            print_banner(config);
            print_collection_matrix(&studio.collection_status());
            Ok(())
        }
        "view" => {
            let kind = collection_arg(rest)?;
            let parents = parent_titles(studio, kind);
            dispatch!(studio, kind, run_view(&rest[1..], &parents))
        }
        "add" => {
            let kind = collection_arg(rest)?;
            let form = FormInput::parse_pairs(&rest[1..]).map_err(|e| e.to_string())?;
            dispatch!(studio, kind, run_add(&form))
        }
        "update" => {
            let kind = collection_arg(rest)?;
            let id = id_arg(rest)?;
            let form = FormInput::parse_pairs(&rest[2..]).map_err(|e| e.to_string())?;
            if form.is_empty() {
                return Err("nothing to update; pass field=value pairs".to_string());
            }
            dispatch!(studio, kind, run_update(id, &form))
        }
        "delete" => {
            let kind = collection_arg(rest)?;
            let id = id_arg(rest)?;
            if kind == EntityKind::Challenge {
                let outcome = studio.delete_challenge(id).map_err(|e| e.to_string())?;
                println!(
                    "Deleted challenge '{}' and {} linked solution(s).",
                    outcome.removed.title,
                    outcome.removed_children.len()
                );
                return Ok(());
            }
            dispatch!(studio, kind, run_delete(id))
        }
        "duplicate" => {
            let kind = collection_arg(rest)?;
            let id = id_arg(rest)?;
            dispatch!(studio, kind, run_duplicate(id))
        }
        "favorite" => {
            let kind = collection_arg(rest)?;
            let id = id_arg(rest)?;
            dispatch!(studio, kind, run_favorite(id))
        }
        "export" => {
            let kind = collection_arg(rest)?;
            let format = rest
                .get(1)
                .and_then(|f| ExportFormat::parse(f))
                .ok_or_else(|| "expected export format: csv | json | text".to_string())?;
            dispatch!(studio, kind, run_export(format))
        }
        other => Err(format!(
            "unknown subcommand '{}'. Use: atelier status | view | add | update | delete | duplicate | favorite | export | init | --help",
            other
        )),
    }
}

fn run_init(config: &StudioConfig) -> Result<(), String> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        return Err(format!("{} already exists", path.display()));
    }
    config.save_to_path(path).map_err(|e| e.to_string())?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn collection_arg(rest: &[String]) -> Result<EntityKind, String> {
    let name = rest.first().ok_or_else(|| {
        let names: Vec<&str> = EntityKind::ALL.iter().map(|k| k.collection_name()).collect();
        format!("missing collection; one of: {}", names.join(", "))
    })?;
    EntityKind::parse(name).ok_or_else(|| format!("unknown collection '{}'", name))
}

fn id_arg(rest: &[String]) -> Result<&str, String> {
    rest.get(1)
        .map(|s| s.as_str())
        .ok_or_else(|| "missing record id".to_string())
}

/// Parent id → title for collections holding a soft reference.
fn parent_titles(studio: &Studio, kind: EntityKind) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = match kind {
        EntityKind::SignalComment => studio.signals.load().into_iter().map(|s| (s.id, s.title)).collect(),
        EntityKind::Investor => studio.rounds.load().into_iter().map(|r| (r.id, r.name)).collect(),
        EntityKind::Solution => studio.challenges.load().into_iter().map(|c| (c.id, c.title)).collect(),
        _ => Vec::new(),
    };
    pairs.into_iter().collect()
}

/// Column holding the parent reference, if the collection has one.
fn parent_column(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::SignalComment => Some("Signal"),
        EntityKind::Investor => Some("Round"),
        EntityKind::Solution => Some("Challenge"),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands (generic over the collection)
// ─────────────────────────────────────────────────────────────────────────────

fn run_view<R: Page>(
    repo: &Repository<R>,
    args: &[String],
    parents: &HashMap<String, String>,
) -> Result<(), String> {
    let params = parse_view_params::<R>(args)?;
    let view = repo.view(&params);
    let records = repo.load();

    println!();
    println!("  ┌─ {} ─ {} ─────────────────────────────────────", R::KIND.page().to_uppercase(), R::KIND.collection_name());
    println!();
    print_records(&view.items, parents);
    println!(
        "  Showing {} of {}  |  sort: {}{}",
        view.items.len(),
        records.len(),
        params.sort.label(),
        if params.search.is_empty() && params.filters.is_empty() { "" } else { "  |  filtered" }
    );
    println!();
    print_summary(&view.summary);
    print!("{}", advisory::render(R::KIND.page(), &R::advise(&records, &view.summary)));
    println!();
    Ok(())
}

fn parse_view_params<R: Record>(args: &[String]) -> Result<ViewParams<R::Sort>, String> {
    let mut params = ViewParams::<R::Sort>::new();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("{} needs a value", flag))?;
        match flag.as_str() {
            "--search" | "-s" => params.search = value.clone(),
            "--filter" | "-f" => {
                let (facet, wanted) = value
                    .split_once('=')
                    .ok_or_else(|| format!("expected facet=value, got '{}'", value))?;
                if !R::FACETS.iter().any(|f| *f == facet) {
                    return Err(format!(
                        "{} has no facet '{}'; available: {}",
                        R::KIND,
                        facet,
                        if R::FACETS.is_empty() { "none".to_string() } else { R::FACETS.join(", ") }
                    ));
                }
                params.filters.insert(facet.to_string(), wanted.to_string());
            }
            "--sort" => {
                params.sort = <R::Sort as Choice>::parse(value).ok_or_else(|| {
                    format!("unknown sort '{}'; one of: {}", value, <R::Sort as Choice>::labels())
                })?;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
    }
    Ok(params)
}

fn run_add<R: Page>(repo: &Repository<R>, form: &FormInput) -> Result<(), String> {
    let created = repo.create(form).map_err(|e| e.to_string())?;
    println!("Created {} '{}' ({})", R::KIND, created.title(), created.id());
    Ok(())
}

fn run_update<R: Page>(repo: &Repository<R>, id: &str, form: &FormInput) -> Result<(), String> {
    let updated = repo.update_form(id, form).map_err(|e| e.to_string())?;
    println!("Updated {} '{}' ({})", R::KIND, updated.title(), updated.id());
    Ok(())
}

fn run_delete<R: Page>(repo: &Repository<R>, id: &str) -> Result<(), String> {
    let removed = repo.delete(id).map_err(|e| e.to_string())?;
    println!("Deleted {} '{}'", R::KIND, removed.title());
    Ok(())
}

fn run_duplicate<R: Page>(repo: &Repository<R>, id: &str) -> Result<(), String> {
    let copy = repo.duplicate(id).map_err(|e| e.to_string())?;
    println!("Duplicated as '{}' ({})", copy.title(), copy.id());
    Ok(())
}

fn run_favorite<R: Page>(repo: &Repository<R>, id: &str) -> Result<(), String> {
    let pinned = repo.toggle_favorite(id).map_err(|e| e.to_string())?;
    println!("{} {} {}", R::KIND, id, if pinned { "favorited" } else { "unfavorited" });
    Ok(())
}

fn run_export<R: Page>(repo: &Repository<R>, format: ExportFormat) -> Result<(), String> {
    let view = repo.view(&ViewParams::new());
    let payload = match format {
        ExportFormat::Csv => export::to_csv(&view.items),
        ExportFormat::Json => export::to_json(&view.items).map_err(|e| e.to_string())?,
        ExportFormat::Text => {
            let title = format!("{} ({})", R::KIND.page(), R::KIND.collection_name());
            let mut text = export::to_text(&title, &view.items, &view.summary);
            text.push('\n');
            text.push_str(&advisory::render(
                R::KIND.page(),
                &R::advise(&view.items, &view.summary),
            ));
            text
        }
    };
    print!("{}", payload);
    if format == ExportFormat::Json {
        println!();
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Section renderers
// ─────────────────────────────────────────────────────────────────────────────

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| {
                    Cell::new(h)
                        .set_alignment(CellAlignment::Center)
                        .add_attribute(Attribute::Bold)
                })
                .collect::<Vec<_>>(),
        );
    table
}

fn print_banner(config: &StudioConfig) {
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    println!();
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║   {} DASHBOARD v{}", config.app_name.to_uppercase(), VERSION);
    println!("║   {}", now);
    println!("╚══════════════════════════════════════════════════════════════════════╝");
    println!();
}

fn print_collection_matrix(rows: &[CollectionStatus]) {
    println!("  ┌─ COLLECTIONS ─ Store Matrix ─────────────────────────────────────┐");
    println!();

    let mut table = styled_table(&["Key", "Page", "Entity", "Total", "Active", "Archived", "Dangling", "Status"]);
    for row in rows {
        let (status_text, status_color) = if row.error.is_some() {
            ("✗ UNREADABLE", Color::Red)
        } else if row.total > 0 {
            ("● ACTIVE", Color::Green)
        } else if row.stored {
            ("○ EMPTY", Color::DarkYellow)
        } else {
            ("○ NEW", Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&row.key),
            Cell::new(&row.page),
            Cell::new(row.kind),
            Cell::new(row.total).set_alignment(CellAlignment::Right),
            Cell::new(row.active).set_alignment(CellAlignment::Right),
            Cell::new(row.archived).set_alignment(CellAlignment::Right),
            Cell::new(row.dangling)
                .set_alignment(CellAlignment::Right)
                .fg(if row.dangling > 0 { Color::DarkYellow } else { Color::Reset }),
            Cell::new(status_text)
                .set_alignment(CellAlignment::Center)
                .fg(status_color),
        ]);
    }
    println!("{table}");

    let total: usize = rows.iter().map(|r| r.total).sum();
    let active: usize = rows.iter().map(|r| r.active).sum();
    let errors = rows.iter().filter(|r| r.error.is_some()).count();
    println!(
        "  Records: {}  |  Active: {}  |  Collections: {}  |  Errors: {}",
        total,
        active,
        rows.len(),
        errors
    );
    for row in rows.iter().filter(|r| r.error.is_some()) {
        if let Some(err) = &row.error {
            println!("  ⚠ {}: {}", row.key, err);
        }
    }
    println!();
}

fn print_records<R: Tabular>(records: &[R], parents: &HashMap<String, String>) {
    if records.is_empty() {
        println!("  (no matching records)");
        println!();
        return;
    }
    let parent_col = parent_column(R::KIND);
    let mut table = styled_table(R::COLUMNS);
    for record in records {
        let row: Vec<Cell> = R::COLUMNS
            .iter()
            .map(|column| {
                let text = record.cell(column).map(|f| f.render()).unwrap_or_default();
                match *column {
                    "Favorited" => {
                        if record.favorited() {
                            Cell::new("★").fg(Color::Yellow).set_alignment(CellAlignment::Center)
                        } else {
                            Cell::new("")
                        }
                    }
                    "Status" if record.is_archived() => Cell::new(text).fg(Color::DarkGrey),
                    c if Some(c) == parent_col && !text.is_empty() => {
                        let title = parents.get(&text).map(String::as_str).unwrap_or(UNKNOWN_REFERENCE);
                        Cell::new(title)
                    }
                    _ => Cell::new(text),
                }
            })
            .collect();
        table.add_row(row);
    }
    println!("{table}");
}

fn print_summary(summary: &atelier_core::Summary) {
    let mut table = styled_table(&["Metric", "Value"]);
    for (label, value) in [
        ("Total", summary.total.to_string()),
        ("Active", summary.count.to_string()),
        ("Archived", summary.archived.to_string()),
        ("Favorited", summary.favorited.to_string()),
        ("Average", format!("{:.1}", summary.average)),
    ] {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    if !summary.breakdown.is_empty() {
        let mut table = styled_table(&["Group", "Count", "Share"]);
        for bucket in &summary.breakdown {
            table.add_row(vec![
                Cell::new(&bucket.label),
                Cell::new(bucket.count).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", bucket.percent)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }
    println!();
}
