//! Derived views: filter, sort and aggregate a collection for display.
//!
//! Everything here is a pure function of (collection, parameters). Summaries
//! are computed over the unfiltered, non-archived records, so search and facet
//! filters change the displayed list but never the KPIs.

use crate::record::{Choice, Record};
use serde::Serialize;
use std::collections::BTreeMap;

/// Search text, exact-match facet filters and the secondary sort key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewParams<S> {
    pub search: String,
    /// facet name → required label.
    pub filters: BTreeMap<String, String>,
    pub sort: S,
}

impl<S: Choice + Default> ViewParams<S> {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort: S::default(),
        }
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    pub fn filter(mut self, facet: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(facet.into(), value.into());
        self
    }

    pub fn sort_by(mut self, sort: S) -> Self {
        self.sort = sort;
        self
    }
}

/// One slice of the summary breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    /// Share of the active records, 0–100.
    pub percent: f64,
}

/// Collection KPIs.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    /// Every record, archived included.
    pub total: usize,
    /// Non-archived records. All other figures are over this subset.
    pub count: usize,
    pub archived: usize,
    pub favorited: usize,
    /// Mean headline metric of the active records; 0 when there are none.
    pub average: f64,
    /// Active records grouped by category/stage/status, largest bucket first.
    pub breakdown: Vec<Bucket>,
}

impl Summary {
    /// Largest bucket, if any.
    pub fn top_bucket(&self) -> Option<&Bucket> {
        self.breakdown.first()
    }

    pub fn bucket(&self, label: &str) -> Option<&Bucket> {
        self.breakdown.iter().find(|b| b.label == label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView<R> {
    pub items: Vec<R>,
    pub summary: Summary,
}

/// True when the record passes the search text and every facet filter.
pub fn matches<R: Record>(record: &R, params: &ViewParams<R::Sort>) -> bool {
    matches_search(record, &params.search)
        && params
            .filters
            .iter()
            .all(|(facet, wanted)| record.facet(facet) == Some(wanted.as_str()))
}

fn matches_search<R: Record>(record: &R, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
        || record
            .tags()
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Stable sort: favorited first, then the secondary key. Ties keep collection order.
pub fn sort_records<R: Record>(records: &mut [R], sort: R::Sort) {
    records.sort_by(|a, b| {
        b.favorited()
            .cmp(&a.favorited())
            .then_with(|| a.compare(b, sort))
    });
}

pub fn summarize<R: Record>(records: &[R]) -> Summary {
    let total = records.len();
    let active: Vec<&R> = records.iter().filter(|r| !r.is_archived()).collect();
    let count = active.len();

    let metrics: Vec<f64> = active.iter().filter_map(|r| r.metric()).collect();
    let average = if metrics.is_empty() {
        0.0
    } else {
        metrics.iter().sum::<f64>() / metrics.len() as f64
    };

    let mut groups: BTreeMap<&'static str, usize> = BTreeMap::new();
    for record in &active {
        *groups.entry(record.group()).or_insert(0) += 1;
    }
    let mut breakdown: Vec<Bucket> = groups
        .into_iter()
        .map(|(label, n)| Bucket {
            label: label.to_string(),
            count: n,
            percent: percent(n, count),
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    Summary {
        total,
        count,
        archived: total - count,
        favorited: active.iter().filter(|r| r.favorited()).count(),
        average,
        breakdown,
    }
}

/// Filtered + sorted display list and the collection summary.
pub fn derive<R: Record>(records: &[R], params: &ViewParams<R::Sort>) -> DerivedView<R> {
    let mut items: Vec<R> = records
        .iter()
        .filter(|r| matches(*r, params))
        .cloned()
        .collect();
    sort_records(&mut items, params.sort);
    DerivedView {
        items,
        summary: summarize(records),
    }
}

/// `part / whole × 100`, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
