//! Business Intelligence page: market signals and the comment thread on them.

use crate::record::{
    choice_enum, clamp_score, cmp_desc, cmp_newest, cmp_title, ChildOf, Choice, EntityKind,
    FormInput, FromForm, Record,
};
use crate::error::StudioResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

choice_enum! {
    pub enum SignalCategory {
        Market => "Market",
        Competitor => "Competitor",
        Technology => "Technology",
        Consumer => "Consumer",
        Regulatory => "Regulatory",
    }
}

choice_enum! {
    /// Direction a signal is moving in.
    pub enum Trajectory {
        Stable => "Stable",
        Rising => "Rising",
        Falling => "Falling",
    }
}

impl Trajectory {
    /// Ordinal rank for sorting: Rising > Stable > Falling.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Rising => 2,
            Self::Stable => 1,
            Self::Falling => 0,
        }
    }
}

choice_enum! {
    pub enum SignalStatus {
        Active => "Active",
        Archived => "Archived",
    }
}

choice_enum! {
    pub enum SignalSort {
        Newest => "newest",
        Strength => "strength",
        Trajectory => "trajectory",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: SignalCategory,
    /// 0–100.
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default)]
    pub trajectory: Trajectory,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub status: SignalStatus,
    pub created_at: DateTime<Utc>,
}

fn default_strength() -> f64 {
    crate::record::DEFAULT_SCORE
}

impl Record for Signal {
    const KIND: EntityKind = EntityKind::Signal;
    const FACETS: &'static [&'static str] = &["category", "trajectory", "status"];
    const PINNABLE: bool = true;
    type Sort = SignalSort;

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
        vec![&self.title, &self.source]
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
        self.status == SignalStatus::Archived
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "category" => Some(self.category.label()),
            "trajectory" => Some(self.trajectory.label()),
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: SignalSort) -> Ordering {
        match sort {
            SignalSort::Newest => cmp_newest(self.created_at, other.created_at),
            SignalSort::Strength => cmp_desc(self.strength, other.strength),
            SignalSort::Trajectory => other.trajectory.rank().cmp(&self.trajectory.rank()),
            SignalSort::Title => cmp_title(&self.title, &other.title),
        }
    }

    fn metric(&self) -> Option<f64> {
        Some(self.strength)
    }

    fn group(&self) -> &'static str {
        self.category.label()
    }

    fn normalize(&mut self) {
        self.strength = clamp_score(self.strength);
    }

    fn reset_progress(&mut self) {
        self.status = SignalStatus::Active;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for Signal {
    const TITLE_FIELD: &'static str = "title";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            title: form.required("title")?,
            category: form.choice("category"),
            strength: form.score("strength"),
            trajectory: form.choice("trajectory"),
            source: form.text("source"),
            notes: form.text("notes"),
            tags: form.tags("tags"),
            favorited: form.flag("favorited"),
            status: form.choice("status"),
            created_at,
        })
    }
}

/// Percentage of active signals that are rising. 0 when there are none.
pub fn rising_share(signals: &[Signal]) -> f64 {
    let active: Vec<_> = signals.iter().filter(|s| !s.is_archived()).collect();
    if active.is_empty() {
        return 0.0;
    }
    let rising = active
        .iter()
        .filter(|s| s.trajectory == Trajectory::Rising)
        .count();
    rising as f64 / active.len() as f64 * 100.0
}

choice_enum! {
    pub enum CommentSort {
        Newest => "newest",
    }
}

/// A note left on a signal. `signal_id` is a soft reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalComment {
    pub id: String,
    pub signal_id: String,
    pub text: String,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Record for SignalComment {
    const KIND: EntityKind = EntityKind::SignalComment;
    const FACETS: &'static [&'static str] = &[];
    type Sort = CommentSort;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn title(&self) -> &str {
        &self.text
    }

    fn set_title(&mut self, title: String) {
        self.text = title;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.text, &self.author]
    }

    fn is_archived(&self) -> bool {
        false
    }

    fn facet(&self, _name: &str) -> Option<&'static str> {
        None
    }

    fn compare(&self, other: &Self, _sort: CommentSort) -> Ordering {
        cmp_newest(self.created_at, other.created_at)
    }

    fn group(&self) -> &'static str {
        "Comment"
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for SignalComment {
    const TITLE_FIELD: &'static str = "text";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            signal_id: form.text("signalId"),
            text: form.required("text")?,
            author: form.text("author"),
            created_at,
        })
    }
}

impl ChildOf<Signal> for SignalComment {
    fn parent_id(&self) -> &str {
        &self.signal_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::resolve_parent;

    fn signal(title: &str, strength: f64, trajectory: Trajectory) -> Signal {
        let form = FormInput::new()
            .with("title", title)
            .with("strength", strength.to_string())
            .with("trajectory", trajectory.label());
        Signal::from_form(title.to_lowercase(), Utc::now(), &form).unwrap()
    }

    #[test]
    fn form_defaults() {
        let s = Signal::from_form("s1".into(), Utc::now(), &FormInput::new().with("title", "Thrift boom")).unwrap();
        assert_eq!(s.strength, 50.0);
        assert_eq!(s.category, SignalCategory::Market);
        assert_eq!(s.trajectory, Trajectory::Stable);
        assert_eq!(s.status, SignalStatus::Active);
        assert!(s.tags.is_empty());
        assert!(!s.favorited);
    }

    #[test]
    fn trajectory_sort_uses_rank_not_label() {
        let rising = signal("A", 10.0, Trajectory::Rising);
        let stable = signal("B", 10.0, Trajectory::Stable);
        let falling = signal("C", 10.0, Trajectory::Falling);
        assert_eq!(rising.compare(&stable, SignalSort::Trajectory), Ordering::Less);
        assert_eq!(stable.compare(&falling, SignalSort::Trajectory), Ordering::Less);
        assert_eq!(falling.compare(&rising, SignalSort::Trajectory), Ordering::Greater);
    }

    #[test]
    fn rising_share_ignores_archived() {
        let mut archived = signal("Old", 90.0, Trajectory::Rising);
        archived.status = SignalStatus::Archived;
        let signals = vec![
            signal("A", 80.0, Trajectory::Rising),
            signal("B", 40.0, Trajectory::Falling),
            archived,
        ];
        assert_eq!(rising_share(&signals), 50.0);
        assert_eq!(rising_share(&[]), 0.0);
    }

    #[test]
    fn dangling_comment_resolves_to_unknown() {
        let signals = vec![signal("Resale", 70.0, Trajectory::Rising)];
        let form = FormInput::new().with("text", "Check resale margins").with("signalId", "resale");
        let linked = SignalComment::from_form("c1".into(), Utc::now(), &form).unwrap();
        assert_eq!(resolve_parent(&linked, &signals), "Resale");

        let form = FormInput::new().with("text", "Orphan").with("signalId", "gone");
        let orphan = SignalComment::from_form("c2".into(), Utc::now(), &form).unwrap();
        assert_eq!(resolve_parent(&orphan, &signals), "Unknown");
    }

    #[test]
    fn stored_json_uses_camel_case_and_labels() {
        let s = signal("A", 80.0, Trajectory::Rising);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["trajectory"], "Rising");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
