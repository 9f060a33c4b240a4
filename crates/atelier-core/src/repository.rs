//! One record type bound to its store key.

use crate::cascade;
use crate::error::{StudioError, StudioResult};
use crate::mutation;
use crate::record::{FormInput, FromForm, Record};
use crate::store::{self, KeyValueStore};
use crate::view::{self, DerivedView, Summary, ViewParams};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// Load → mutate → save for a single collection.
///
/// Every mutation reads the current collection, applies one transform from
/// [`crate::mutation`] and writes the whole collection back. A failed
/// mutation writes nothing, and neither does one whose stored collection
/// cannot be decoded.
pub struct Repository<R> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Repository<R> {
    /// Repository under the entity's standard key.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, R::KIND.store_key())
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _record: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current collection; empty when nothing is stored or the load fails.
    pub fn load(&self) -> Vec<R> {
        store::load(self.store.as_ref(), &self.key, Vec::new())
    }

    /// Current collection for a write. Undecodable stored data is an error here,
    /// never an empty collection.
    pub fn load_current(&self) -> StudioResult<Vec<R>> {
        store::load_strict(self.store.as_ref(), &self.key, Vec::new())
    }

    pub fn save(&self, records: &[R]) -> StudioResult<()> {
        store::save(self.store.as_ref(), &self.key, records)
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.load().into_iter().find(|r| r.id() == id)
    }

    pub fn update(&self, id: &str, patch: &Map<String, Value>) -> StudioResult<R> {
        let (next, updated) = mutation::update(&self.load_current()?, id, patch)?;
        self.save(&next)?;
        Ok(updated)
    }

    /// Parents with cascade rules are rejected; [`crate::Studio::delete_challenge`]
    /// removes them together with their children.
    pub fn delete(&self, id: &str) -> StudioResult<R> {
        if let Some(rule) = cascade::rules_for(R::KIND).next() {
            return Err(StudioError::invalid(format!(
                "deleting a {} also removes its {} records; use the cascading delete",
                R::KIND,
                rule.child
            )));
        }
        let (next, removed) = mutation::delete(&self.load_current()?, id)?;
        self.save(&next)?;
        Ok(removed)
    }

    pub fn duplicate(&self, id: &str) -> StudioResult<R> {
        let (next, copy) = mutation::duplicate(&self.load_current()?, id)?;
        self.save(&next)?;
        Ok(copy)
    }

    /// Returns the new favorite state.
    pub fn toggle_favorite(&self, id: &str) -> StudioResult<bool> {
        let (next, record) = mutation::toggle_favorite(&self.load_current()?, id)?;
        self.save(&next)?;
        Ok(record.favorited())
    }

    pub fn view(&self, params: &ViewParams<R::Sort>) -> DerivedView<R> {
        view::derive(&self.load(), params)
    }

    pub fn summary(&self) -> Summary {
        view::summarize(&self.load())
    }
}

impl<R: FromForm> Repository<R> {
    pub fn create(&self, form: &FormInput) -> StudioResult<R> {
        let (next, created) = mutation::create(&self.load_current()?, form)?;
        self.save(&next)?;
        Ok(created)
    }

    /// Form-driven update; see [`mutation::update_form`].
    pub fn update_form(&self, id: &str, form: &FormInput) -> StudioResult<R> {
        let (next, updated) = mutation::update_form(&self.load_current()?, id, form)?;
        self.save(&next)?;
        Ok(updated)
    }
}
