//! Submitted field sets.
//!
//! Forms carry raw strings. Numeric and enumerated fields never fail to parse:
//! they coerce to the field default. Only the required title/name can reject
//! a submission.

use super::Choice;
use crate::error::{StudioError, StudioResult};
use std::collections::BTreeMap;

/// Default for 0–100 score fields when the input is empty or unparsable.
pub const DEFAULT_SCORE: f64 = 50.0;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Clamps a 0–100 score. NaN becomes the default score.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_SCORE
    } else {
        value.clamp(SCORE_MIN, SCORE_MAX)
    }
}

/// Floors a monetary amount at zero. NaN becomes zero.
pub fn floor_amount(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    fields: BTreeMap<String, String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Parses `key=value` pairs (command-line style).
    pub fn parse_pairs<I, S>(pairs: I) -> StudioResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut form = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| StudioError::invalid(format!("expected key=value, got '{}'", pair)))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(StudioError::invalid(format!("empty field name in '{}'", pair)));
            }
            form.set(key, value);
        }
        Ok(form)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Submitted field names, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Trimmed text, empty when absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    /// Trimmed text that must be non-empty.
    pub fn required(&self, key: &str) -> StudioResult<String> {
        let value = self.text(key);
        if value.is_empty() {
            Err(StudioError::invalid(format!("'{}' is required", key)))
        } else {
            Ok(value)
        }
    }

    /// 0–100 score; defaults to 50, clamped.
    pub fn score(&self, key: &str) -> f64 {
        self.number(key).map(clamp_score).unwrap_or(DEFAULT_SCORE)
    }

    /// Non-negative amount; defaults to 0.
    pub fn amount(&self, key: &str) -> f64 {
        self.number(key).map(floor_amount).unwrap_or(0.0)
    }

    /// Progress counter (version, iterations); defaults to 1, never below 1.
    pub fn counter(&self, key: &str) -> u32 {
        self.get(key)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1)
    }

    /// Enumerated field; empty or unknown labels fall back to the default option.
    pub fn choice<C: Choice + Default>(&self, key: &str) -> C {
        self.get(key).and_then(C::parse).unwrap_or_default()
    }

    /// Comma separated tags, trimmed, empties dropped, duplicates removed.
    pub fn tags(&self, key: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tag in self.get(key).unwrap_or("").split(',') {
            let tag = tag.trim();
            if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                out.push(tag.to_string());
            }
        }
        out
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("true" | "1" | "yes" | "on")
        )
    }

    /// `holder:value` pairs separated by commas (`"Founders:70, Seed fund:30"`).
    /// Entries with an unparsable value are dropped.
    pub fn splits(&self, key: &str) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for entry in self.get(key).unwrap_or("").split(',') {
            if let Some((holder, value)) = entry.split_once(':') {
                let holder = holder.trim();
                if holder.is_empty() {
                    continue;
                }
                if let Ok(v) = value.trim().parse::<f64>() {
                    if v.is_finite() {
                        out.insert(holder.to_string(), v);
                    }
                }
            }
        }
        out
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormInput {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut form = Self::new();
        for (k, v) in iter {
            form.set(k, v);
        }
        form
    }
}
