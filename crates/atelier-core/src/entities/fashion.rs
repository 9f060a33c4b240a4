//! Fashion Lab page: design pieces moving from concept to production.

use crate::error::StudioResult;
use crate::record::{
    choice_enum, cmp_desc, cmp_newest, cmp_title, floor_amount, Choice, EntityKind, FormInput,
    FromForm, Record,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

choice_enum! {
    pub enum DesignCategory {
        Apparel => "Apparel",
        Footwear => "Footwear",
        Accessories => "Accessories",
        Textile => "Textile",
    }
}

choice_enum! {
    pub enum DesignStatus {
        Concept => "Concept",
        Sketch => "Sketch",
        Sample => "Sample",
        Production => "Production",
        Archived => "Archived",
    }
}

choice_enum! {
    pub enum DesignSort {
        Newest => "newest",
        Cost => "cost",
        Iterations => "iterations",
        Title => "title",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub id: String,
    pub name: String,
    /// Seasonal collection the piece belongs to (free text).
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub category: DesignCategory,
    #[serde(default)]
    pub status: DesignStatus,
    #[serde(default = "one")]
    pub version: u32,
    #[serde(default = "one")]
    pub iterations: u32,
    /// Unit cost. Floored at 0, not capped.
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorited: bool,
    pub created_at: DateTime<Utc>,
}

fn one() -> u32 {
    1
}

impl Record for Design {
    const KIND: EntityKind = EntityKind::Design;
    const FACETS: &'static [&'static str] = &["category", "status"];
    const PINNABLE: bool = true;
    type Sort = DesignSort;

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
        vec![&self.name, &self.collection]
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
        self.status == DesignStatus::Archived
    }

    fn facet(&self, name: &str) -> Option<&'static str> {
        match name {
            "category" => Some(self.category.label()),
            "status" => Some(self.status.label()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: DesignSort) -> Ordering {
        match sort {
            DesignSort::Newest => cmp_newest(self.created_at, other.created_at),
            DesignSort::Cost => cmp_desc(self.cost, other.cost),
            DesignSort::Iterations => other.iterations.cmp(&self.iterations),
            DesignSort::Title => cmp_title(&self.name, &other.name),
        }
    }

    fn metric(&self) -> Option<f64> {
        Some(self.cost)
    }

    fn group(&self) -> &'static str {
        self.category.label()
    }

    fn normalize(&mut self) {
        self.cost = floor_amount(self.cost);
        self.version = self.version.max(1);
        self.iterations = self.iterations.max(1);
    }

    fn reset_progress(&mut self) {
        self.version = 1;
        self.iterations = 1;
        self.status = DesignStatus::Concept;
    }

    fn reassign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl FromForm for Design {
    const TITLE_FIELD: &'static str = "name";

    fn from_form(id: String, created_at: DateTime<Utc>, form: &FormInput) -> StudioResult<Self> {
        Ok(Self {
            id,
            name: form.required("name")?,
            collection: form.text("collection"),
            category: form.choice("category"),
            status: form.choice("status"),
            version: form.counter("version"),
            iterations: form.counter("iterations"),
            cost: form.amount("cost"),
            tags: form.tags("tags"),
            favorited: form.flag("favorited"),
            created_at,
        })
    }
}

/// Summed cost of designs not archived.
pub fn active_cost(designs: &[Design]) -> f64 {
    designs
        .iter()
        .filter(|d| !d.is_archived())
        .map(|d| d.cost)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(name: &str, cost: &str) -> Design {
        let form = FormInput::new().with("name", name).with("cost", cost);
        Design::from_form(name.into(), Utc::now(), &form).unwrap()
    }

    #[test]
    fn negative_cost_is_floored() {
        assert_eq!(design("Tote", "-12").cost, 0.0);
        assert_eq!(design("Tote", "abc").cost, 0.0);
        assert_eq!(design("Tote", "45.5").cost, 45.5);
    }

    #[test]
    fn reset_progress_returns_to_concept() {
        let mut d = design("Parka", "120");
        d.version = 3;
        d.iterations = 11;
        d.status = DesignStatus::Production;
        d.reset_progress();
        assert_eq!((d.version, d.iterations, d.status), (1, 1, DesignStatus::Concept));
    }

    #[test]
    fn active_cost_skips_archived() {
        let mut archived = design("Old", "500");
        archived.status = DesignStatus::Archived;
        let designs = vec![design("A", "10"), design("B", "15.5"), archived];
        assert_eq!(active_cost(&designs), 25.5);
    }
}
