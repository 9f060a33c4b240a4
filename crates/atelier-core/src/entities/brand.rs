//! Brand & Culture page: brand assets and how well they align with the studio voice.

use crate::error::StudioResult;
use crate::record::{
    choice_enum, clamp_score, cmp_desc, cmp_newest, cmp_title, Choice, EntityKind, FormInput,
    FromForm, Record,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

choice_enum! {
    pub enum AssetKind {
        Logo => "Logo",
        Palette => "Palette",
        Typography => "Typography",
        Voice => "Voice",
        Guideline => "Guideline",
    }
}

choice_enum! {
    pub enum AssetStatus {
        Draft => "Draft",
        Review => "Review",
        Approved => "Approved",
        Retired => "Retired",
    }
}

choice_enum! {
    pub enum AssetSort {
        Newest => "newest",
        Alignment => "alignment",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandAsset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: AssetKind,
    #[serde(default)]
    pub status: AssetStatus,
    /// 0–100.
    #[serde(default = "default_alignment")]
    pub alignment: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorited: bool,
    pub created_at: DateTime<Utc>,
}

fn default_alignment() -> f64 {
    crate::record::DEFAULT_SCORE
}

impl Record for BrandAsset {
    const KIND: EntityKind = EntityKind::BrandAsset;
    const FACETS: &'static [&'static str] = &["kind", "status"];
    const PINNABLE: bool = true;
    type Sort = AssetSort;

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
        vec![&self.name, &self.description]
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
        self.status == AssetStatus::Retired
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "kind" => Some(self.kind.label()),
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: AssetSort) -> Ordering {
        match sort {
            AssetSort::Newest => cmp_newest(self.created_at, other.created_at),
            AssetSort::Alignment => cmp_desc(self.alignment, other.alignment),
            AssetSort::Title => cmp_title(&self.name, &other.name),
        }
    }

    fn metric(&self) -> Option<f64> {
        Some(self.alignment)
    }

    fn group(&self) -> &'static str {
        self.status.label()
    }

    fn normalize(&mut self) {
        self.alignment = clamp_score(self.alignment);
    }

    fn reset_progress(&mut self) {
        self.status = AssetStatus::Draft;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for BrandAsset {
    const TITLE_FIELD: &'static str = "name";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            name: form.required("name")?,
            description: form.text("description"),
            kind: form.choice("kind"),
            status: form.choice("status"),
            alignment: form.score("alignment"),
            tags: form.tags("tags"),
            favorited: form.flag("favorited"),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retired_assets_count_as_archived() {
        let form = FormInput::new().with("name", "Old wordmark").with("status", "Retired");
        let asset = BrandAsset::from_form("a".into(), Utc::now(), &form).unwrap();
        assert!(asset.is_archived());
        assert_eq!(asset.facet("status"), Some("Retired"));
        assert_eq!(asset.facet("colour"), None);
    }
}
