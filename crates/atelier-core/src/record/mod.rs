//! Record model shared by every entity collection.
//!
//! A record is identified by an opaque caller-generated `id` and carries a
//! `createdAt` timestamp that is set once and never rewritten. Each entity
//! type lives in its own collection under one store key (see [`EntityKind`]).

mod choice;
mod form;

pub use choice::Choice;
pub(crate) use choice::choice_enum;
pub use form::{clamp_score, floor_amount, FormInput, DEFAULT_SCORE, SCORE_MAX, SCORE_MIN};

use crate::error::StudioResult;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Placeholder rendered for a soft reference whose target no longer exists.
pub const UNKNOWN_REFERENCE: &str = "Unknown";

/// Suffix appended to the title of a duplicated record.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Every entity collection, with its page and store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Signal,
    SignalComment,
    Design,
    FundingRound,
    Investor,
    Prototype,
    BrandAsset,
    Challenge,
    Solution,
}

impl EntityKind {
    pub const ALL: [Self; 9] = [
        Self::Signal,
        Self::SignalComment,
        Self::Design,
        Self::FundingRound,
        Self::Investor,
        Self::Prototype,
        Self::BrandAsset,
        Self::Challenge,
        Self::Solution,
    ];

    /// Store key holding the collection (JSON array).
    pub fn store_key(&self) -> &'static str {
        match self {
            Self::Signal => "bi_signals",
            Self::SignalComment => "bi_comments",
            Self::Design => "fl_designs",
            Self::FundingRound => "fd_rounds",
            Self::Investor => "fd_investors",
            Self::Prototype => "pv_prototypes",
            Self::BrandAsset => "bc_assets",
            Self::Challenge => "il_challenges",
            Self::Solution => "il_solutions",
        }
    }

    /// Dashboard page the collection belongs to.
    pub fn page(&self) -> &'static str {
        match self {
            Self::Signal | Self::SignalComment => "Business Intelligence",
            Self::Design => "Fashion Lab",
            Self::FundingRound | Self::Investor => "Funding",
            Self::Prototype => "Prototype Vault",
            Self::BrandAsset => "Brand & Culture",
            Self::Challenge | Self::Solution => "Innovation Lab",
        }
    }

    /// Plural collection name used on the command line and in export headers.
    pub fn collection_name(&self) -> &'static str {
        match self {
            Self::Signal => "signals",
            Self::SignalComment => "comments",
            Self::Design => "designs",
            Self::FundingRound => "rounds",
            Self::Investor => "investors",
            Self::Prototype => "prototypes",
            Self::BrandAsset => "assets",
            Self::Challenge => "challenges",
            Self::Solution => "solutions",
        }
    }

    /// Accepts the collection name, the store key or the singular label.
    pub fn parse(input: &str) -> Option<Self> {
        let wanted = input.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| {
            k.collection_name() == wanted
                || k.store_key() == wanted
                || k.to_string().to_ascii_lowercase().replace(' ', "") == wanted.replace([' ', '_', '-'], "")
        })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Signal => "Signal",
            Self::SignalComment => "Signal Comment",
            Self::Design => "Design",
            Self::FundingRound => "Funding Round",
            Self::Investor => "Investor",
            Self::Prototype => "Prototype",
            Self::BrandAsset => "Brand Asset",
            Self::Challenge => "Challenge",
            Self::Solution => "Solution",
        };
        f.write_str(label)
    }
}

/// One entity instance in a collection.
pub trait Record:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Categorical fields usable as exact-match view filters.
    const FACETS: &'static [&'static str];

    /// Whether the record has a favorite/pinned flag.
    const PINNABLE: bool = false;

    /// Secondary sort keys offered by views of this collection.
    type Sort: Choice + Default + fmt::Debug;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn title(&self) -> &str;

    fn set_title(&mut self, title: String);

    /// Text fields searched by the free-text view filter. Tags are searched separately.
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title()]
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    fn favorited(&self) -> bool {
        false
    }

    fn set_favorited(&mut self, _pinned: bool) {}

    /// True when the record sits in the entity's terminal archive/decline state.
    fn is_archived(&self) -> bool;

    /// Label of a categorical field, or `None` if the facet does not exist.
    fn facet(&self, name: &str) -> Option<&'static str>;

    /// Ordering for the secondary sort key, already in display direction.
    fn compare(&self, other: &Self, sort: Self::Sort) -> Ordering;

    /// Headline number averaged in the collection summary.
    fn metric(&self) -> Option<f64> {
        None
    }

    /// Bucket label for the summary breakdown.
    fn group(&self) -> &'static str;

    /// Applies the numeric write policy (score clamps, amount floors, counters >= 1).
    fn normalize(&mut self) {}

    /// Resets progress fields on a duplicate (version, iterations, status).
    fn reset_progress(&mut self) {}

    /// Gives the record a new identity. Only used for duplication.
    fn reassign(&mut self, id: String, created_at: DateTime<Utc>);
}

/// Records that can be built from a submitted form.
pub trait FromForm: Record {
    /// Form field holding the required title/name.
    const TITLE_FIELD: &'static str;

    /// Fails only when the required title/name is empty.
    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self>;
}

/// Soft foreign key from a child record to its parent collection.
pub trait ChildOf<P: Record>: Record {
    fn parent_id(&self) -> &str;
}

/// Title of the parent a child points to, or [`UNKNOWN_REFERENCE`] when dangling.
pub fn resolve_parent<'a, P, C>(child: &C, parents: &'a [P]) -> &'a str
where
    P: Record,
    C: ChildOf<P>,
{
    parents
        .iter()
        .find(|p| p.id() == child.parent_id())
        .map(|p| p.title())
        .unwrap_or(UNKNOWN_REFERENCE)
}

/// Fresh opaque record id.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Descending comparison for numeric fields; NaN sorts last.
pub fn cmp_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Newest first.
pub fn cmp_newest(a: DateTime<Utc>, b: DateTime<Utc>) -> Ordering {
    b.cmp(&a)
}

/// Case-insensitive ascending title order.
pub fn cmp_title(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_parse_accepts_aliases() {
        assert_eq!(EntityKind::parse("signals"), Some(EntityKind::Signal));
        assert_eq!(EntityKind::parse("bi_signals"), Some(EntityKind::Signal));
        assert_eq!(EntityKind::parse("Funding Round"), Some(EntityKind::FundingRound));
        assert_eq!(EntityKind::parse("brand_asset"), Some(EntityKind::BrandAsset));
        assert_eq!(EntityKind::parse("widgets"), None);
    }

    #[test]
    fn store_keys_are_unique_and_prefixed() {
        let mut keys: Vec<_> = EntityKind::ALL.iter().map(|k| k.store_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), EntityKind::ALL.len());
        for key in keys {
            assert!(key.contains('_'), "{key} is not namespaced");
        }
    }

    #[test]
    fn numeric_helpers() {
        assert_eq!(cmp_desc(80.0, 40.0), Ordering::Less);
        assert_eq!(cmp_desc(f64::NAN, 40.0), Ordering::Greater);
        assert_eq!(cmp_title("apple", "Banana"), Ordering::Less);
        assert_ne!(new_record_id(), new_record_id());
    }
}
