//! Prototype Vault page.

use crate::error::StudioResult;
use crate::record::{
    choice_enum, clamp_score, cmp_desc, cmp_newest, cmp_title, Choice, EntityKind, FormInput,
    FromForm, Record,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

choice_enum! {
    pub enum PrototypeKind {
        Physical => "Physical",
        Digital => "Digital",
        Service => "Service",
        Hybrid => "Hybrid",
    }
}

choice_enum! {
    pub enum PrototypeStatus {
        Idea => "Idea",
        Building => "Building",
        Testing => "Testing",
        Validated => "Validated",
        Archived => "Archived",
    }
}

choice_enum! {
    pub enum PrototypeSort {
        Newest => "newest",
        Confidence => "confidence",
        Version => "version",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prototype {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub hypothesis: String,
    #[serde(default)]
    pub kind: PrototypeKind,
    #[serde(default)]
    pub status: PrototypeStatus,
    /// 0–100.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "one")]
    pub version: u32,
    #[serde(default = "one")]
    pub iterations: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorited: bool,
    pub created_at: DateTime<Utc>,
}

fn default_confidence() -> f64 {
    crate::record::DEFAULT_SCORE
}

fn one() -> u32 {
    1
}

impl Record for Prototype {
    const KIND: EntityKind = EntityKind::Prototype;
    const FACETS: &'static [&'static str] = &["kind", "status"];
    const PINNABLE: bool = true;
    type Sort = PrototypeSort;

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
        vec![&self.title, &self.hypothesis]
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
        self.status == PrototypeStatus::Archived
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "kind" => Some(self.kind.label()),
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: PrototypeSort) -> Ordering {
        match sort {
            PrototypeSort::Newest => cmp_newest(self.created_at, other.created_at),
            PrototypeSort::Confidence => cmp_desc(self.confidence, other.confidence),
            PrototypeSort::Version => other.version.cmp(&self.version),
            PrototypeSort::Title => cmp_title(&self.title, &other.title),
        }
    }

    fn metric(&self) -> Option<f64> {
        Some(self.confidence)
    }

    fn group(&self) -> &'static str {
        self.status.label()
    }

    fn normalize(&mut self) {
        self.confidence = clamp_score(self.confidence);
        self.version = self.version.max(1);
        self.iterations = self.iterations.max(1);
    }

    fn reset_progress(&mut self) {
        self.version = 1;
        self.iterations = 1;
        self.status = PrototypeStatus::Idea;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for Prototype {
    const TITLE_FIELD: &'static str = "title";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            title: form.required("title")?,
            hypothesis: form.text("hypothesis"),
            kind: form.choice("kind"),
            status: form.choice("status"),
            confidence: form.score("confidence"),
            version: form.counter("version"),
            iterations: form.counter("iterations"),
            tags: form.tags("tags"),
            favorited: form.flag("favorited"),
            created_at,
        })
    }
}

/// Share of active prototypes that reached Validated, in percent.
pub fn validation_rate(prototypes: &[Prototype]) -> f64 {
    let active: Vec<_> = prototypes.iter().filter(|p| !p.is_archived()).collect();
    if active.is_empty() {
        return 0.0;
    }
    let validated = active
        .iter()
        .filter(|p| p.status == PrototypeStatus::Validated)
        .count();
    validated as f64 / active.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prototype(title: &str, status: &str) -> Prototype {
        let form = FormInput::new().with("title", title).with("status", status);
        Prototype::from_form(title.into(), Utc::now(), &form).unwrap()
    }

    #[test]
    fn unknown_status_defaults_to_idea() {
        assert_eq!(prototype("Kiosk", "shipped").status, PrototypeStatus::Idea);
        assert_eq!(prototype("Kiosk", "testing").status, PrototypeStatus::Testing);
    }

    #[test]
    fn validation_rate_over_active() {
        let protos = vec![
            prototype("A", "validated"),
            prototype("B", "testing"),
            prototype("C", "idea"),
            prototype("D", "validated"),
            prototype("E", "archived"),
        ];
        assert_eq!(validation_rate(&protos), 50.0);
        assert_eq!(validation_rate(&[]), 0.0);
    }

    #[test]
    fn normalize_clamps_confidence() {
        let mut p = prototype("A", "idea");
        p.confidence = 180.0;
        p.version = 0;
        p.normalize();
        assert_eq!(p.confidence, 100.0);
        assert_eq!(p.version, 1);
    }
}
