//! Innovation Lab page: open challenges and the solutions proposed for them.
//!
//! Solutions point at their challenge through `challengeId`. This is the one
//! pair that cascades on delete (see [`crate::cascade`]).

use crate::error::StudioResult;
use crate::record::{
    choice_enum, clamp_score, cmp_desc, cmp_newest, cmp_title, ChildOf, Choice, EntityKind,
    FormInput, FromForm, Record,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

choice_enum! {
    pub enum ChallengeCategory {
        Product => "Product",
        Process => "Process",
        Market => "Market",
        Culture => "Culture",
    }
}

choice_enum! {
    pub enum Priority {
        Medium => "Medium",
        Low => "Low",
        High => "High",
        Critical => "Critical",
    }
}

impl Priority {
    /// Critical > High > Medium > Low.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 3,
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }
}

choice_enum! {
    pub enum ChallengeStatus {
        Open => "Open",
        InProgress => "In Progress",
        Resolved => "Resolved",
        Archived => "Archived",
    }
}

choice_enum! {
    pub enum ChallengeSort {
        Newest => "newest",
        Priority => "priority",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: ChallengeCategory,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: ChallengeStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorited: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Challenge {
    const KIND: EntityKind = EntityKind::Challenge;
    const FACETS: &'static [&'static str] = &["category", "priority", "status"];
    const PINNABLE: bool = true;
    type Sort = ChallengeSort;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.description]
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
        self.status == ChallengeStatus::Archived
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "category" => Some(self.category.label()),
            "priority" => Some(self.priority.label()),
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: ChallengeSort) -> Ordering {
        match sort {
            ChallengeSort::Newest => cmp_newest(self.created_at, other.created_at),
            ChallengeSort::Priority => other.priority.rank().cmp(&self.priority.rank()),
            ChallengeSort::Title => cmp_title(&self.title, &other.title),
        }
    }

    fn group(&self) -> &'static str {
        self.category.label()
    }

    fn reset_progress(&mut self) {
        self.status = ChallengeStatus::Open;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for Challenge {
    const TITLE_FIELD: &'static str = "title";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            title: form.required("title")?,
            description: form.text("description"),
            category: form.choice("category"),
            priority: form.choice("priority"),
            status: form.choice("status"),
            tags: form.tags("tags"),
            favorited: form.flag("favorited"),
            created_at,
        })
    }
}

choice_enum! {
    pub enum SolutionStatus {
        Proposed => "Proposed",
        Testing => "Testing",
        Adopted => "Adopted",
        Rejected => "Rejected",
    }
}

choice_enum! {
    pub enum SolutionSort {
        Newest => "newest",
        Effectiveness => "effectiveness",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub id: String,
    pub challenge_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: SolutionStatus,
    /// 0–100.
    #[serde(default = "default_effectiveness")]
    pub effectiveness: f64,
    pub created_at: DateTime<Utc>,
}

fn default_effectiveness() -> f64 {
    crate::record::DEFAULT_SCORE
}

impl Record for Solution {
    const KIND: EntityKind = EntityKind::Solution;
    const FACETS: &'static [&'static str] = &["status"];
    type Sort = SolutionSort;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.description]
    }

    fn is_archived(&self) -> bool {
        self.status == SolutionStatus::Rejected
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: SolutionSort) -> Ordering {
        match sort {
            SolutionSort::Newest => cmp_newest(self.created_at, other.created_at),
            SolutionSort::Effectiveness => cmp_desc(self.effectiveness, other.effectiveness),
            SolutionSort::Title => cmp_title(&self.title, &other.title),
        }
    }

    fn metric(&self) -> Option<f64> {
        Some(self.effectiveness)
    }

    fn group(&self) -> &'static str {
        self.status.label()
    }

    fn normalize(&mut self) {
        self.effectiveness = clamp_score(self.effectiveness);
    }

    fn reset_progress(&mut self) {
        self.status = SolutionStatus::Proposed;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for Solution {
    const TITLE_FIELD: &'static str = "title";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            challenge_id: form.text("challengeId"),
            title: form.required("title")?,
            description: form.text("description"),
            status: form.choice("status"),
            effectiveness: form.score("effectiveness"),
            created_at,
        })
    }
}

impl ChildOf<Challenge> for Solution {
    fn parent_id(&self) -> &str {
        &self.challenge_id
    }
}

/// Per-challenge roll-up of its solutions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeProgress {
    pub challenge_id: String,
    pub title: String,
    pub solutions: usize,
    pub adopted: usize,
    /// Mean effectiveness of non-rejected solutions, 0 when there are none.
    pub average_effectiveness: f64,
}

/// Progress for every challenge in collection order. Solutions pointing at a
/// missing challenge are ignored.
pub fn challenge_progress(challenges: &[Challenge], solutions: &[Solution]) -> Vec<ChallengeProgress> {
    challenges
        .iter()
        .map(|c| {
            let linked: Vec<&Solution> = solutions.iter().filter(|s| s.challenge_id == c.id).collect();
            let live: Vec<f64> = linked
                .iter()
                .filter(|s| !s.is_archived())
                .map(|s| s.effectiveness)
                .collect();
            let average_effectiveness = if live.is_empty() {
                0.0
            } else {
                live.iter().sum::<f64>() / live.len() as f64
            };
            ChallengeProgress {
                challenge_id: c.id.clone(),
                title: c.title.clone(),
                solutions: linked.len(),
                adopted: linked
                    .iter()
                    .filter(|s| s.status == SolutionStatus::Adopted)
                    .count(),
                average_effectiveness,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(id: &str) -> Challenge {
        Challenge::from_form(id.into(), Utc::now(), &FormInput::new().with("title", id)).unwrap()
    }

    fn solution(id: &str, challenge_id: &str, effectiveness: &str, status: &str) -> Solution {
        let form = FormInput::new()
            .with("title", id)
            .with("challengeId", challenge_id)
            .with("effectiveness", effectiveness)
            .with("status", status);
        Solution::from_form(id.into(), Utc::now(), &form).unwrap()
    }

    #[test]
    fn priority_defaults_to_medium_and_sorts_by_rank() {
        let mut low = challenge("a");
        low.priority = Priority::Low;
        let mut critical = challenge("b");
        critical.priority = Priority::Critical;
        assert_eq!(challenge("c").priority, Priority::Medium);
        assert_eq!(critical.compare(&low, ChallengeSort::Priority), Ordering::Less);
    }

    #[test]
    fn progress_rolls_up_linked_solutions() {
        let challenges = vec![challenge("c1"), challenge("c2")];
        let solutions = vec![
            solution("s1", "c1", "80", "adopted"),
            solution("s2", "c1", "40", "testing"),
            solution("s3", "c1", "10", "rejected"),
            solution("s4", "missing", "99", "adopted"),
        ];
        let progress = challenge_progress(&challenges, &solutions);
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].solutions, 3);
        assert_eq!(progress[0].adopted, 1);
        assert_eq!(progress[0].average_effectiveness, 60.0);
        assert_eq!(progress[1].solutions, 0);
        assert_eq!(progress[1].average_effectiveness, 0.0);
    }
}
