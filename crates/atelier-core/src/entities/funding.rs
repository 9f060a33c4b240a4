//! Funding page: rounds (with ownership splits) and the investor pipeline.

use crate::error::StudioResult;
use crate::record::{
    choice_enum, clamp_score, cmp_desc, cmp_newest, cmp_title, floor_amount, ChildOf, Choice,
    EntityKind, FormInput, FromForm, Record,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

choice_enum! {
    pub enum RoundStage {
        PreSeed => "Pre-Seed",
        Seed => "Seed",
        SeriesA => "Series A",
        SeriesB => "Series B",
        Grant => "Grant",
    }
}

choice_enum! {
    pub enum RoundStatus {
        Planning => "Planning",
        Active => "Active",
        Closed => "Closed",
        Declined => "Declined",
    }
}

choice_enum! {
    pub enum RoundSort {
        Newest => "newest",
        Target => "target",
        Raised => "raised",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRound {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stage: RoundStage,
    #[serde(default)]
    pub status: RoundStatus,
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub raised: f64,
    /// Holder → share, stored as entered. Views normalise to percentages.
    #[serde(default)]
    pub ownership: BTreeMap<String, f64>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Record for FundingRound {
    const KIND: EntityKind = EntityKind::FundingRound;
    const FACETS: &'static [&'static str] = &["stage", "status"];
    type Sort = RoundSort;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn set_title(&mut self, title: String) {
        self.name = title;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.notes]
    }

    fn is_archived(&self) -> bool {
        self.status == RoundStatus::Declined
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "stage" => Some(self.stage.label()),
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: RoundSort) -> Ordering {
        match sort {
            RoundSort::Newest => cmp_newest(self.created_at, other.created_at),
            RoundSort::Target => cmp_desc(self.target, other.target),
            RoundSort::Raised => cmp_desc(self.raised, other.raised),
            RoundSort::Title => cmp_title(&self.name, &other.name),
        }
    }

    fn metric(&self) -> Option<f64> {
        Some(self.raised)
    }

    fn group(&self) -> &'static str {
        self.stage.label()
    }

    fn normalize(&mut self) {
        self.target = floor_amount(self.target);
        self.raised = floor_amount(self.raised);
    }

    fn reset_progress(&mut self) {
        self.raised = 0.0;
        self.status = RoundStatus::Planning;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for FundingRound {
    const TITLE_FIELD: &'static str = "name";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            name: form.required("name")?,
            stage: form.choice("stage"),
            status: form.choice("status"),
            target: form.amount("target"),
            raised: form.amount("raised"),
            ownership: form.splits("ownership"),
            notes: form.text("notes"),
            created_at,
        })
    }
}

/// Aggregate money position across non-declined rounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FundingTotals {
    pub target: f64,
    pub raised: f64,
    /// raised / target × 100, or 0 when nothing is targeted.
    pub percent_raised: f64,
}

pub fn funding_totals(rounds: &[FundingRound]) -> FundingTotals {
    let (target, raised) = rounds
        .iter()
        .filter(|r| !r.is_archived())
        .fold((0.0, 0.0), |(t, r), round| (t + round.target, r + round.raised));
    let percent_raised = if target > 0.0 { raised / target * 100.0 } else { 0.0 };
    FundingTotals {
        target,
        raised,
        percent_raised,
    }
}

/// One holder's slice of a round's ownership.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipShare {
    pub holder: String,
    pub entered: f64,
    pub percent: f64,
}

/// Normalised ownership split for a round, largest holder first.
///
/// Percentages are relative to the entered total so they always sum to 100
/// unless the round has no positive entries (then every share is 0).
pub fn ownership_split(round: &FundingRound) -> Vec<OwnershipShare> {
    let total: f64 = round.ownership.values().filter(|v| **v > 0.0).sum();
    let mut shares: Vec<OwnershipShare> = round
        .ownership
        .iter()
        .map(|(holder, value)| OwnershipShare {
            holder: holder.clone(),
            entered: *value,
            percent: if total > 0.0 && *value > 0.0 {
                value / total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    shares.sort_by(|a, b| cmp_desc(a.percent, b.percent).then_with(|| a.holder.cmp(&b.holder)));
    shares
}

choice_enum! {
    pub enum InvestorKind {
        Angel => "Angel",
        VentureCapital => "Venture Capital",
        Corporate => "Corporate",
        Grant => "Grant",
    }
}

choice_enum! {
    /// Pipeline stage of an investor conversation.
    pub enum InvestorStatus {
        Prospect => "Prospect",
        Contacted => "Contacted",
        Interested => "Interested",
        Committed => "Committed",
        Declined => "Declined",
    }
}

impl InvestorStatus {
    /// Pipeline rank: Committed > Interested > Contacted > Prospect > Declined.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Committed => 4,
            Self::Interested => 3,
            Self::Contacted => 2,
            Self::Prospect => 1,
            Self::Declined => 0,
        }
    }
}

choice_enum! {
    pub enum InvestorSort {
        Newest => "newest",
        Interest => "interest",
        Pipeline => "pipeline",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub firm: String,
    #[serde(default)]
    pub kind: InvestorKind,
    #[serde(default)]
    pub status: InvestorStatus,
    /// 0–100.
    #[serde(default = "default_interest")]
    pub interest: f64,
    /// Amount pledged.
    #[serde(default)]
    pub commitment: f64,
    /// Soft reference to a funding round; may be empty or dangling.
    #[serde(default)]
    pub round_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorited: bool,
    pub created_at: DateTime<Utc>,
}

fn default_interest() -> f64 {
    crate::record::DEFAULT_SCORE
}

impl Record for Investor {
    const KIND: EntityKind = EntityKind::Investor;
    const FACETS: &'static [&'static str] = &["kind", "status"];
    const PINNABLE: bool = true;
    type Sort = InvestorSort;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn set_title(&mut self, title: String) {
        self.name = title;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.firm]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn favorited(&self) -> bool {
        self.favorited
    }

    fn set_favorited(&mut self, pinned: bool) {
        self.favorited = pinned;
    }

    fn is_archived(&self) -> bool {
        self.status == InvestorStatus::Declined
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "kind" => Some(self.kind.label()),
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: InvestorSort) -> Ordering {
        match sort {
            InvestorSort::Newest => cmp_newest(self.created_at, other.created_at),
            InvestorSort::Interest => cmp_desc(self.interest, other.interest),
            InvestorSort::Pipeline => other.status.rank().cmp(&self.status.rank()),
            InvestorSort::Title => cmp_title(&self.name, &other.name),
        }
    }

    fn metric(&self) -> Option<f64> {
        Some(self.interest)
    }

    fn group(&self) -> &'static str {
        self.status.label()
    }

    fn normalize(&mut self) {
        self.interest = clamp_score(self.interest);
        self.commitment = floor_amount(self.commitment);
    }

    fn reset_progress(&mut self) {
        self.status = InvestorStatus::Prospect;
        self.commitment = 0.0;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for Investor {
    const TITLE_FIELD: &'static str = "name";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            name: form.required("name")?,
            firm: form.text("firm"),
            kind: form.choice("kind"),
            status: form.choice("status"),
            interest: form.score("interest"),
            commitment: form.amount("commitment"),
            round_id: form.text("roundId"),
            tags: form.tags("tags"),
            favorited: form.flag("favorited"),
            created_at,
        })
    }
}

impl ChildOf<FundingRound> for Investor {
    fn parent_id(&self) -> &str {
        &self.round_id
    }
}

/// Committed investors and the amount they pledged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Commitments {
    pub committed: usize,
    pub amount: f64,
}

pub fn commitments(investors: &[Investor]) -> Commitments {
    investors
        .iter()
        .filter(|i| i.status == InvestorStatus::Committed)
        .fold(Commitments::default(), |acc, i| Commitments {
            committed: acc.committed + 1,
            amount: acc.amount + i.commitment,
        })
}
