//! Export payloads: CSV, pretty JSON and the plain-text report.
//!
//! All output is built in memory and is deterministic for a given input; no
//! timestamps or locale-dependent formatting are added.

use crate::entities::{
    BrandAsset, Challenge, Design, FundingRound, Investor, Prototype, Signal, SignalComment,
    Solution,
};
use crate::error::{StudioError, StudioResult};
use crate::record::Record;
use crate::view::Summary;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write as _;

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "text" | "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// A single exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(String),
    Number(f64),
    Count(u32),
    Flag(bool),
    Date(DateTime<Utc>),
}

impl Field {
    fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    fn list(items: &[String]) -> Self {
        Self::Text(items.join("; "))
    }

    /// Display form used by both CSV and text exports.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Count(n) => n.to_string(),
            Self::Flag(b) => if *b { "yes" } else { "no" }.to_string(),
            Self::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Integral values print without decimals; others at most two places.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return String::new();
    }
    if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        let s = format!("{:.2}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Records that can be laid out as a table row.
pub trait Tabular: Record {
    /// Column headers in export order.
    const COLUMNS: &'static [&'static str];

    /// Cell for `column`, or `None` for an unknown header.
    fn cell(&self, column: &str) -> Option<Field>;
}

/// Quotes a CSV field when it holds a delimiter, quote or line break.
pub fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV with every column of the entity.
pub fn to_csv<R: Tabular>(records: &[R]) -> String {
    render_csv(records, R::COLUMNS)
}

/// CSV restricted to `columns`, in the given order. Unknown headers fail.
pub fn to_csv_with<R: Tabular>(records: &[R], columns: &[&str]) -> StudioResult<String> {
    if let Some(bad) = columns.iter().find(|c| !R::COLUMNS.iter().any(|k| k == *c)) {
        return Err(StudioError::invalid(format!(
            "unknown {} column '{}'",
            R::KIND,
            bad
        )));
    }
    Ok(render_csv(records, columns))
}

fn render_csv<R: Tabular>(records: &[R], columns: &[&str]) -> String {
    let mut out = columns
        .iter()
        .map(|c| csv_escape(c))
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|c| csv_escape(&record.cell(c).map(|f| f.render()).unwrap_or_default()))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Pretty JSON, two-space indent, same field names as the store.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> StudioResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Plain-text report with fixed section headers.
pub fn to_text<R: Tabular>(title: &str, records: &[R], summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", title);
    out.push_str(&summary_block(summary));
    let _ = writeln!(out, "--- Records ---");
    if records.is_empty() {
        let _ = writeln!(out, "(none)");
    }
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, record.title());
        for column in R::COLUMNS {
            if *column == "Id" || is_title_column(column) {
                continue;
            }
            let value = record.cell(column).map(|f| f.render()).unwrap_or_default();
            if !value.is_empty() {
                let _ = writeln!(out, "   {}: {}", column, value);
            }
        }
    }
    out
}

fn is_title_column(column: &str) -> bool {
    matches!(column, "Title" | "Name" | "Text")
}

/// `--- Summary ---` and `--- Breakdown ---` sections.
pub fn summary_block(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Summary ---");
    let _ = writeln!(out, "Total: {}", summary.total);
    let _ = writeln!(out, "Active: {}", summary.count);
    let _ = writeln!(out, "Archived: {}", summary.archived);
    let _ = writeln!(out, "Favorited: {}", summary.favorited);
    let _ = writeln!(out, "Average: {:.1}", summary.average);
    let _ = writeln!(out, "--- Breakdown ---");
    if summary.breakdown.is_empty() {
        let _ = writeln!(out, "(none)");
    }
    for bucket in &summary.breakdown {
        let _ = writeln!(out, "{}: {} ({:.1}%)", bucket.label, bucket.count, bucket.percent);
    }
    out
}

impl Tabular for Signal {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Title", "Category", "Strength", "Trajectory", "Status", "Source", "Notes", "Tags",
        "Favorited", "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Title" => Field::text(&self.title),
            "Category" => Field::Text(self.category.to_string()),
            "Strength" => Field::Number(self.strength),
            "Trajectory" => Field::Text(self.trajectory.to_string()),
            "Status" => Field::Text(self.status.to_string()),
            "Source" => Field::text(&self.source),
            "Notes" => Field::text(&self.notes),
            "Tags" => Field::list(&self.tags),
            "Favorited" => Field::Flag(self.favorited),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for SignalComment {
    const COLUMNS: &'static [&'static str] = &["Id", "Text", "Signal", "Author", "Created"];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Text" => Field::text(&self.text),
            "Signal" => Field::text(&self.signal_id),
            "Author" => Field::text(&self.author),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for Design {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Name", "Collection", "Category", "Status", "Version", "Iterations", "Cost", "Tags",
        "Favorited", "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Name" => Field::text(&self.name),
            "Collection" => Field::text(&self.collection),
            "Category" => Field::Text(self.category.to_string()),
            "Status" => Field::Text(self.status.to_string()),
            "Version" => Field::Count(self.version),
            "Iterations" => Field::Count(self.iterations),
            "Cost" => Field::Number(self.cost),
            "Tags" => Field::list(&self.tags),
            "Favorited" => Field::Flag(self.favorited),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for FundingRound {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Name", "Stage", "Status", "Target", "Raised", "Ownership", "Notes", "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Name" => Field::text(&self.name),
            "Stage" => Field::Text(self.stage.to_string()),
            "Status" => Field::Text(self.status.to_string()),
            "Target" => Field::Number(self.target),
            "Raised" => Field::Number(self.raised),
            "Ownership" => Field::Text(
                self.ownership
                    .iter()
                    .map(|(holder, v)| format!("{}:{}", holder, format_number(*v)))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            "Notes" => Field::text(&self.notes),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for Investor {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Name", "Firm", "Kind", "Status", "Interest", "Commitment", "Round", "Tags",
        "Favorited", "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Name" => Field::text(&self.name),
            "Firm" => Field::text(&self.firm),
            "Kind" => Field::Text(self.kind.to_string()),
            "Status" => Field::Text(self.status.to_string()),
            "Interest" => Field::Number(self.interest),
            "Commitment" => Field::Number(self.commitment),
            "Round" => Field::text(&self.round_id),
            "Tags" => Field::list(&self.tags),
            "Favorited" => Field::Flag(self.favorited),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for Prototype {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Title", "Hypothesis", "Kind", "Status", "Confidence", "Version", "Iterations",
        "Tags", "Favorited", "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Title" => Field::text(&self.title),
            "Hypothesis" => Field::text(&self.hypothesis),
            "Kind" => Field::Text(self.kind.to_string()),
            "Status" => Field::Text(self.status.to_string()),
            "Confidence" => Field::Number(self.confidence),
            "Version" => Field::Count(self.version),
            "Iterations" => Field::Count(self.iterations),
            "Tags" => Field::list(&self.tags),
            "Favorited" => Field::Flag(self.favorited),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for BrandAsset {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Name", "Kind", "Status", "Alignment", "Description", "Tags", "Favorited", "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Name" => Field::text(&self.name),
            "Kind" => Field::Text(self.kind.to_string()),
            "Status" => Field::Text(self.status.to_string()),
            "Alignment" => Field::Number(self.alignment),
            "Description" => Field::text(&self.description),
            "Tags" => Field::list(&self.tags),
            "Favorited" => Field::Flag(self.favorited),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for Challenge {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Title", "Category", "Priority", "Status", "Description", "Tags", "Favorited",
        "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Title" => Field::text(&self.title),
            "Category" => Field::Text(self.category.to_string()),
            "Priority" => Field::Text(self.priority.to_string()),
            "Status" => Field::Text(self.status.to_string()),
            "Description" => Field::text(&self.description),
            "Tags" => Field::list(&self.tags),
            "Favorited" => Field::Flag(self.favorited),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

impl Tabular for Solution {
    const COLUMNS: &'static [&'static str] = &[
        "Id", "Title", "Challenge", "Status", "Effectiveness", "Description", "Created",
    ];

    fn cell(&self, column: &str) -> Option<Field> {
        Some(match column {
            "Id" => Field::text(&self.id),
            "Title" => Field::text(&self.title),
            "Challenge" => Field::text(&self.challenge_id),
            "Status" => Field::Text(self.status.to_string()),
            "Effectiveness" => Field::Number(self.effectiveness),
            "Description" => Field::text(&self.description),
            "Created" => Field::Date(self.created_at),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FormInput, FromForm};
    use crate::view::summarize;
    use chrono::TimeZone;

    fn design(name: &str, cost: &str) -> Design {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let form = FormInput::new().with("name", name).with("cost", cost);
        Design::from_form("d1".into(), created, &form).unwrap()
    }

    #[test]
    fn csv_quotes_commas_and_prints_integral_numbers_plainly() {
        let csv = to_csv_with(&[design("X, Y", "5")], &["Name", "Cost"]).unwrap();
        assert_eq!(csv, "Name,Cost\n\"X, Y\",5\n");
    }

    #[test]
    fn csv_doubles_embedded_quotes_and_handles_newlines() {
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("a\nb"), "\"a\nb\"");
        assert_eq!(csv_escape("plain"), "plain");
    }

    #[test]
    fn csv_rejects_unknown_columns() {
        assert!(to_csv_with(&[design("X", "1")], &["Name", "Colour"]).is_err());
    }

    #[test]
    fn full_csv_has_header_and_one_row_per_record() {
        let csv = to_csv(&[design("A", "1.5"), design("B", "2")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Id,Name,Collection"));
        assert!(lines[1].contains(",1.5,"));
        assert!(lines[1].ends_with("2026-03-01T12:00:00Z"));
    }

    #[test]
    fn json_is_pretty_with_camel_case_fields() {
        let json = to_json(&[design("A", "1")]).unwrap();
        assert!(json.contains("\n    \"createdAt\""));
        assert!(json.starts_with("[\n  {"));
    }

    #[test]
    fn text_report_is_deterministic_with_fixed_headers() {
        let designs = vec![design("A", "10"), design("B", "20")];
        let summary = summarize(&designs);
        let text = to_text("Designs", &designs, &summary);
        assert_eq!(text, to_text("Designs", &designs, &summary));
        for header in ["=== Designs ===", "--- Summary ---", "--- Breakdown ---", "--- Records ---"] {
            assert!(text.contains(header), "missing {header}");
        }
        assert!(text.contains("Average: 15.0"));
        assert!(text.contains("1. A\n"));
        assert!(text.contains("   Cost: 10\n"));
        assert!(!text.contains("   Name:"));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.33");
        assert_eq!(format_number(f64::NAN), "");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn amounts_beyond_integer_range_export_exactly() {
        let csv = to_csv_with(&[design("Couture", "1e20")], &["Cost"]).unwrap();
        assert_eq!(csv, "Cost\n100000000000000000000\n");
    }

    #[test]
    fn format_parse() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("txt"), Some(ExportFormat::Text));
        assert_eq!(ExportFormat::parse("xml"), None);
    }
}
