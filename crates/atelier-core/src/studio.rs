//! Studio facade: every collection over one injected store.

use crate::cascade::{self, CascadeOutcome};
use crate::config::StudioConfig;
use crate::entities::{
    challenge_progress, BrandAsset, Challenge, ChallengeProgress, Design, FundingRound, Investor,
    Prototype, Signal, SignalComment, Solution,
};
use crate::error::StudioResult;
use crate::record::{resolve_parent, ChildOf, EntityKind, Record};
use crate::repository::Repository;
use crate::store::{KeyValueStore, MirrorSink, SledStore, SyncQueue};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Per-collection health row for the status matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStatus {
    pub kind: EntityKind,
    pub key: String,
    pub page: String,
    /// False when nothing has been saved under the key yet.
    pub stored: bool,
    pub total: usize,
    pub active: usize,
    pub archived: usize,
    /// Child records whose parent reference points at a missing record.
    pub dangling: usize,
    /// Set when the stored value does not decode; the collection then reads as empty.
    pub error: Option<String>,
}

pub struct Studio {
    store: Arc<dyn KeyValueStore>,
    pub signals: Repository<Signal>,
    pub comments: Repository<SignalComment>,
    pub designs: Repository<Design>,
    pub rounds: Repository<FundingRound>,
    pub investors: Repository<Investor>,
    pub prototypes: Repository<Prototype>,
    pub assets: Repository<BrandAsset>,
    /// Plain deletes are refused here; use [`Studio::delete_challenge`].
    pub challenges: Repository<Challenge>,
    pub solutions: Repository<Solution>,
}

impl Studio {
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            signals: Repository::new(Arc::clone(&store)),
            comments: Repository::new(Arc::clone(&store)),
            designs: Repository::new(Arc::clone(&store)),
            rounds: Repository::new(Arc::clone(&store)),
            investors: Repository::new(Arc::clone(&store)),
            prototypes: Repository::new(Arc::clone(&store)),
            assets: Repository::new(Arc::clone(&store)),
            challenges: Repository::new(Arc::clone(&store)),
            solutions: Repository::new(Arc::clone(&store)),
            store,
        }
    }

    /// Opens the sled store under `config.storage_path`. With a `mirror_path`
    /// the sync worker is spawned on the current tokio runtime and its handle
    /// returned; it finishes once the studio is dropped.
    pub fn open(config: &StudioConfig) -> StudioResult<(Self, Option<JoinHandle<usize>>)> {
        let store = SledStore::open_path(config.db_path())?;
        let (store, handle) = match &config.mirror_path {
            Some(dir) => {
                let (queue, handle) = SyncQueue::spawn(Arc::new(MirrorSink::new(dir)));
                tracing::info!(
                    target: "atelier::studio",
                    mirror = %dir.display(),
                    "remote sync enabled"
                );
                (store.with_sync(queue), Some(handle))
            }
            None => (store, None),
        };
        tracing::info!(
            target: "atelier::studio",
            app = %config.app_name,
            collections = store.entry_count(),
            "{} ready",
            config.app_name
        );
        Ok((Self::with_store(Arc::new(store)), handle))
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Deletes a challenge and every solution linked to it. Solutions are
    /// written first so a failure in between never leaves orphans.
    pub fn delete_challenge(&self, id: &str) -> StudioResult<CascadeOutcome<Challenge, Solution>> {
        let outcome = cascade::delete_cascading(
            &self.challenges.load_current()?,
            &self.solutions.load_current()?,
            id,
        )?;
        if !outcome.removed_children.is_empty() {
            self.solutions.save(&outcome.children)?;
        }
        self.challenges.save(&outcome.parents)?;
        tracing::info!(
            target: "atelier::studio",
            id = id,
            solutions = outcome.removed_children.len(),
            action = "CASCADE",
            "removed challenge '{}' with {} linked solutions",
            outcome.removed.title,
            outcome.removed_children.len()
        );
        Ok(outcome)
    }

    /// Status row for every collection, in [`EntityKind::ALL`] order.
    pub fn collection_status(&self) -> Vec<CollectionStatus> {
        EntityKind::ALL
            .iter()
            .map(|kind| {
                let mut row = self.status_row(*kind);
                row.dangling = match kind {
                    EntityKind::SignalComment => self.dangling(&self.signals, &self.comments),
                    EntityKind::Investor => self.dangling(&self.rounds, &self.investors),
                    EntityKind::Solution => self.dangling(&self.challenges, &self.solutions),
                    _ => 0,
                };
                row
            })
            .collect()
    }

    fn status_row(&self, kind: EntityKind) -> CollectionStatus {
        match kind {
            EntityKind::Signal => self.status_of::<Signal>(),
            EntityKind::SignalComment => self.status_of::<SignalComment>(),
            EntityKind::Design => self.status_of::<Design>(),
            EntityKind::FundingRound => self.status_of::<FundingRound>(),
            EntityKind::Investor => self.status_of::<Investor>(),
            EntityKind::Prototype => self.status_of::<Prototype>(),
            EntityKind::BrandAsset => self.status_of::<BrandAsset>(),
            EntityKind::Challenge => self.status_of::<Challenge>(),
            EntityKind::Solution => self.status_of::<Solution>(),
        }
    }

    fn dangling<P: Record, C: ChildOf<P>>(&self, parents: &Repository<P>, children: &Repository<C>) -> usize {
        cascade::dangling(&parents.load(), &children.load()).len()
    }

    fn status_of<R: Record>(&self) -> CollectionStatus {
        let kind = R::KIND;
        let mut status = CollectionStatus {
            kind,
            key: kind.store_key().to_string(),
            page: kind.page().to_string(),
            stored: false,
            total: 0,
            active: 0,
            archived: 0,
            dangling: 0,
            error: None,
        };
        match self.store.get(kind.store_key()) {
            Ok(None) => {}
            Ok(Some(bytes)) => {
                status.stored = true;
                match serde_json::from_slice::<Vec<R>>(&bytes) {
                    Ok(records) => {
                        status.total = records.len();
                        status.archived = records.iter().filter(|r| r.is_archived()).count();
                        status.active = status.total - status.archived;
                    }
                    Err(e) => status.error = Some(e.to_string()),
                }
            }
            Err(e) => status.error = Some(e.to_string()),
        }
        status
    }

    /// Title of the signal a comment belongs to, or "Unknown".
    pub fn signal_title(&self, comment: &SignalComment) -> String {
        resolve_parent(comment, &self.signals.load()).to_string()
    }

    /// Name of the round an investor is attached to, or "Unknown".
    pub fn round_name(&self, investor: &Investor) -> String {
        resolve_parent(investor, &self.rounds.load()).to_string()
    }

    /// Title of the challenge a solution addresses, or "Unknown".
    pub fn challenge_title(&self, solution: &Solution) -> String {
        resolve_parent(solution, &self.challenges.load()).to_string()
    }

    pub fn solutions_for(&self, challenge_id: &str) -> Vec<Solution> {
        self.solutions
            .load()
            .into_iter()
            .filter(|s| s.challenge_id == challenge_id)
            .collect()
    }

    pub fn challenge_progress(&self) -> Vec<ChallengeProgress> {
        challenge_progress(&self.challenges.load(), &self.solutions.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FormInput;
    use crate::store::MemoryStore;

    fn studio() -> Studio {
        Studio::with_store(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn status_matrix_covers_every_collection() {
        let studio = studio();
        studio.signals.create(&FormInput::new().with("title", "Resale")).unwrap();
        let rows = studio.collection_status();
        assert_eq!(rows.len(), EntityKind::ALL.len());
        let signals = &rows[0];
        assert_eq!((signals.key.as_str(), signals.stored, signals.total), ("bi_signals", true, 1));
        assert!(!rows[1].stored);
    }

    #[test]
    fn corrupt_collection_reports_error_and_reads_empty() {
        let studio = studio();
        studio.store().put("fl_designs", b"{not json").unwrap();
        let row = studio
            .collection_status()
            .into_iter()
            .find(|r| r.kind == EntityKind::Design)
            .unwrap();
        assert!(row.error.is_some());
        assert!(studio.designs.load().is_empty());
    }

    #[test]
    fn dangling_references_resolve_to_unknown() {
        let studio = studio();
        let round = studio.rounds.create(&FormInput::new().with("name", "Seed")).unwrap();
        let linked = studio
            .investors
            .create(&FormInput::new().with("name", "Ada").with("roundId", round.id.as_str()))
            .unwrap();
        assert_eq!(studio.round_name(&linked), "Seed");
        studio.rounds.delete(&round.id).unwrap();
        assert_eq!(studio.round_name(&linked), "Unknown");
        assert_eq!(studio.investors.load().len(), 1);
    }

    #[test]
    fn challenge_delete_cascades_to_solutions() {
        let studio = studio();
        let c = studio.challenges.create(&FormInput::new().with("title", "Waste")).unwrap();
        let keep = studio.challenges.create(&FormInput::new().with("title", "Other")).unwrap();
        for (t, parent) in [("a", &c.id), ("b", &c.id), ("c", &keep.id)] {
            studio
                .solutions
                .create(&FormInput::new().with("title", t).with("challengeId", parent.as_str()))
                .unwrap();
        }
        let out = studio.delete_challenge(&c.id).unwrap();
        assert_eq!(out.removed_children.len(), 2);
        assert_eq!(studio.challenges.load().len(), 1);
        assert!(studio.solutions_for(&c.id).is_empty());
        assert_eq!(studio.solutions_for(&keep.id).len(), 1);
        assert_eq!(studio.challenge_progress()[0].solutions, 1);
    }

    #[test]
    fn status_rows_serialize_with_kind_and_dangling_counts() {
        let studio = studio();
        let signal = studio.signals.create(&FormInput::new().with("title", "Resale")).unwrap();
        for target in [signal.id.as_str(), "gone", ""] {
            studio
                .comments
                .create(&FormInput::new().with("text", "note").with("signalId", target))
                .unwrap();
        }
        let rows = studio.collection_status();
        assert_eq!(rows[1].dangling, 1);
        assert_eq!(rows[0].dangling, 0);

        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["kind"], "SignalComment");
        assert_eq!(json["key"], "bi_comments");
        assert_eq!(json["dangling"], 1);
    }

    #[test]
    fn plain_challenge_delete_is_refused() {
        let studio = studio();
        let c = studio.challenges.create(&FormInput::new().with("title", "Waste")).unwrap();
        studio
            .solutions
            .create(&FormInput::new().with("title", "Offcuts").with("challengeId", c.id.as_str()))
            .unwrap();

        assert!(studio.challenges.delete(&c.id).unwrap_err().is_validation());
        assert_eq!(studio.challenges.load().len(), 1);
        assert_eq!(studio.solutions_for(&c.id).len(), 1);

        studio.delete_challenge(&c.id).unwrap();
        assert!(studio.solutions.load().is_empty());
    }

    #[test]
    fn cascade_refuses_undecodable_solutions() {
        let studio = studio();
        let c = studio.challenges.create(&FormInput::new().with("title", "Waste")).unwrap();
        studio.store().put("il_solutions", b"{not json").unwrap();
        assert!(studio.delete_challenge(&c.id).is_err());
        assert_eq!(studio.challenges.load().len(), 1);
        assert_eq!(studio.store().get("il_solutions").unwrap().unwrap(), b"{not json".to_vec());
    }
}
