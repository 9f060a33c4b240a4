//! Template advisories built from collection KPIs.
//!
//! Each line is a fixed sentence with numbers filled in from the summary and
//! the entity KPIs. Output depends only on the records, so the same
//! collection always yields the same advice.

use crate::entities::{
    active_cost, commitments, funding_totals, rising_share, validation_rate, AssetStatus,
    BrandAsset, Challenge, ChallengeStatus, Design, DesignStatus, FundingRound, Investor,
    InvestorStatus, Priority, Prototype, PrototypeStatus, Signal, SignalComment, Solution,
    SolutionStatus, Trajectory,
};
use crate::export::format_number;
use crate::record::Record;
use crate::view::Summary;

/// Records whose collection produces advisory lines.
pub trait Advisory: Record {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String>;
}

/// `=== <title> Advisory ===` followed by one bullet per line.
pub fn render(title: &str, lines: &[String]) -> String {
    let mut out = format!("=== {} Advisory ===\n", title);
    for line in lines {
        out.push_str("  • ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn active<R: Record>(records: &[R]) -> impl Iterator<Item = &R> {
    records.iter().filter(|r| !r.is_archived())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

fn empty_line(noun: &str) -> String {
    format!("No active {} yet. Add one to start tracking.", noun)
}

fn leading_group(summary: &Summary) -> Option<String> {
    summary
        .top_bucket()
        .map(|b| format!("{} leads with {} ({:.0}%).", b.label, b.count, b.percent))
}

impl Advisory for Signal {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("signals")];
        }
        let rising = active(records)
            .filter(|s| s.trajectory == Trajectory::Rising)
            .count();
        let mut lines = vec![format!(
            "{} of {} active signals are rising ({:.0}%).",
            rising,
            summary.count,
            rising_share(records)
        )];
        lines.push(format!("Average signal strength is {:.1}.", summary.average));
        if let Some(top) = leading_group(summary) {
            lines.push(top);
        }
        let falling = active(records)
            .filter(|s| s.trajectory == Trajectory::Falling)
            .count();
        if falling > rising {
            lines.push("More signals are falling than rising; review the watchlist.".to_string());
        }
        lines
    }
}

impl Advisory for SignalComment {
    fn advise(records: &[Self], _summary: &Summary) -> Vec<String> {
        if records.is_empty() {
            return vec![empty_line("comments")];
        }
        let unassigned = records.iter().filter(|c| c.signal_id.is_empty()).count();
        let mut lines = vec![format!("{} recorded.", plural(records.len(), "comment", "comments"))];
        if unassigned > 0 {
            lines.push(format!(
                "{} not linked to a signal.",
                plural(unassigned, "comment is", "comments are")
            ));
        }
        lines
    }
}

impl Advisory for Design {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("designs")];
        }
        let in_production = active(records)
            .filter(|d| d.status == DesignStatus::Production)
            .count();
        let mut lines = vec![
            format!(
                "{} of {} active designs are in production.",
                in_production, summary.count
            ),
            format!(
                "Active cost totals {} (average {}).",
                format_number(active_cost(records)),
                format_number(summary.average)
            ),
        ];
        if let Some(top) = leading_group(summary) {
            lines.push(top);
        }
        lines
    }
}

impl Advisory for FundingRound {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("funding rounds")];
        }
        let totals = funding_totals(records);
        let mut lines = vec![format!(
            "Raised {} of {} targeted across {} ({:.0}%).",
            format_number(totals.raised),
            format_number(totals.target),
            plural(summary.count, "round", "rounds"),
            totals.percent_raised
        )];
        if totals.target > 0.0 && totals.percent_raised < 50.0 {
            lines.push("Less than half the target is raised; prioritise investor follow-ups.".to_string());
        }
        if let Some(top) = leading_group(summary) {
            lines.push(top);
        }
        lines
    }
}

impl Advisory for Investor {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("investors")];
        }
        let committed = commitments(records);
        let warm = active(records)
            .filter(|i| i.status == InvestorStatus::Interested)
            .count();
        vec![
            format!(
                "{} committed for a total of {}.",
                plural(committed.committed, "investor has", "investors have"),
                format_number(committed.amount)
            ),
            format!(
                "{} interested and worth a follow-up.",
                plural(warm, "investor is", "investors are")
            ),
            format!("Average interest is {:.1}.", summary.average),
        ]
    }
}

impl Advisory for Prototype {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("prototypes")];
        }
        let testing = active(records)
            .filter(|p| p.status == PrototypeStatus::Testing)
            .count();
        vec![
            format!(
                "Validation rate is {:.0}% across {}.",
                validation_rate(records),
                plural(summary.count, "active prototype", "active prototypes")
            ),
            format!("{} in testing.", plural(testing, "prototype", "prototypes")),
            format!("Average confidence is {:.1}.", summary.average),
        ]
    }
}

impl Advisory for BrandAsset {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("brand assets")];
        }
        let approved = active(records)
            .filter(|a| a.status == AssetStatus::Approved)
            .count();
        let in_review = active(records)
            .filter(|a| a.status == AssetStatus::Review)
            .count();
        let mut lines = vec![
            format!("{} of {} active assets are approved.", approved, summary.count),
            format!("Average brand alignment is {:.1}.", summary.average),
        ];
        if in_review > 0 {
            lines.push(format!(
                "{} waiting for review.",
                plural(in_review, "asset is", "assets are")
            ));
        }
        lines
    }
}

impl Advisory for Challenge {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("challenges")];
        }
        let open = active(records)
            .filter(|c| c.status == ChallengeStatus::Open)
            .count();
        let critical = active(records)
            .filter(|c| c.priority == Priority::Critical && c.status != ChallengeStatus::Resolved)
            .count();
        let mut lines = vec![format!(
            "{} of {} active challenges are still open.",
            open, summary.count
        )];
        if critical > 0 {
            lines.push(format!(
                "{} unresolved; tackle these first.",
                plural(critical, "critical challenge is", "critical challenges are")
            ));
        }
        if let Some(top) = leading_group(summary) {
            lines.push(top);
        }
        lines
    }
}

impl Advisory for Solution {
    fn advise(records: &[Self], summary: &Summary) -> Vec<String> {
        if summary.count == 0 {
            return vec![empty_line("solutions")];
        }
        let adopted = active(records)
            .filter(|s| s.status == SolutionStatus::Adopted)
            .count();
        vec![
            format!("{} of {} active solutions adopted.", adopted, summary.count),
            format!("Average effectiveness is {:.1}.", summary.average),
        ]
    }
}
