//! atelier-core: persisted collections, derived views, mutations and exports
//! for the studio dashboards (intelligence, fashion, funding, prototypes,
//! brand, innovation).
//!
//! Collections are stored whole under one key each. Views and mutations are
//! pure functions over a loaded collection; [`Repository`] and [`Studio`]
//! wire them to a [`KeyValueStore`].

mod config;
mod error;
mod record;
mod repository;
mod studio;

pub mod advisory;
pub mod cascade;
pub mod entities;
pub mod export;
pub mod mutation;
pub mod store;
pub mod view;

pub use config::{StudioConfig, CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use error::{StudioError, StudioResult};
pub use record::{
    clamp_score, cmp_desc, cmp_newest, cmp_title, floor_amount, new_record_id, resolve_parent,
    ChildOf, Choice, EntityKind, FormInput, FromForm, Record, COPY_SUFFIX, DEFAULT_SCORE,
    SCORE_MAX, SCORE_MIN, UNKNOWN_REFERENCE,
};
pub use repository::Repository;
pub use studio::{CollectionStatus, Studio};

pub use advisory::Advisory;
pub use cascade::{CascadeOutcome, CascadeRule, CASCADE_RULES};
pub use export::{ExportFormat, Field, Tabular};
pub use store::{KeyValueStore, MemoryStore, MirrorSink, RemoteSink, SledStore, SyncQueue};
pub use view::{Bucket, DerivedView, Summary, ViewParams};
