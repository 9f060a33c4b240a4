//! Property tests for derived views and collection mutations.

use atelier_core::entities::{Prototype, Signal, SignalCategory, SignalSort, Trajectory};
use atelier_core::mutation;
use atelier_core::view::{derive, summarize};
use atelier_core::{Choice, FormInput, FromForm, ViewParams, COPY_SUFFIX};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct SignalSeed {
    title: String,
    strength: u32,
    category: usize,
    trajectory: usize,
    favorited: bool,
    archived: bool,
}

fn seed() -> impl Strategy<Value = SignalSeed> {
    (
        "[A-Za-z ]{1,12}",
        0u32..=100,
        0..SignalCategory::ALL.len(),
        0..Trajectory::ALL.len(),
        any::<bool>(),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(title, strength, category, trajectory, favorited, archived)| SignalSeed {
            title,
            strength,
            category,
            trajectory,
            favorited,
            archived,
        })
}

fn build(seeds: &[SignalSeed]) -> Vec<Signal> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    seeds
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut form = FormInput::new()
                .with("title", s.title.trim().to_string() + "x")
                .with("strength", s.strength.to_string())
                .with("category", SignalCategory::ALL[s.category].label())
                .with("trajectory", Trajectory::ALL[s.trajectory].label());
            if s.archived {
                form.set("status", "Archived");
            }
            let mut signal = Signal::from_form(format!("s{i}"), base + Duration::minutes(i as i64), &form)
                .expect("title is never empty");
            signal.favorited = s.favorited;
            signal
        })
        .collect()
}

fn sort_strategy() -> impl Strategy<Value = SignalSort> {
    (0..SignalSort::ALL.len()).prop_map(|i| SignalSort::ALL[i])
}

proptest! {
    #[test]
    fn prop_derive_is_pure(seeds in prop::collection::vec(seed(), 0..20), sort in sort_strategy(), q in "[a-z]{0,2}") {
        let signals = build(&seeds);
        let snapshot = signals.clone();
        let params = ViewParams::new().search(q).sort_by(sort);
        let first = derive(&signals, &params);
        let second = derive(&signals, &params);
        prop_assert_eq!(first, second);
        prop_assert_eq!(signals, snapshot);
    }

    #[test]
    fn prop_category_filter_never_grows_result(
        seeds in prop::collection::vec(seed(), 0..20),
        q in "[a-z]{0,2}",
        category in 0..SignalCategory::ALL.len(),
    ) {
        let signals = build(&seeds);
        let loose = ViewParams::new().search(q.clone());
        let strict = ViewParams::new()
            .search(q)
            .filter("category", SignalCategory::ALL[category].label());
        let loose_view = derive(&signals, &loose);
        let strict_view = derive(&signals, &strict);
        prop_assert!(strict_view.items.len() <= loose_view.items.len());
        for item in &strict_view.items {
            prop_assert!(loose_view.items.contains(item));
        }
        prop_assert_eq!(strict_view.summary, loose_view.summary);
    }

    #[test]
    fn prop_favorites_precede_others(seeds in prop::collection::vec(seed(), 0..20), sort in sort_strategy()) {
        let signals = build(&seeds);
        let view = derive(&signals, &ViewParams::new().sort_by(sort));
        let first_plain = view.items.iter().position(|s| !s.favorited).unwrap_or(view.items.len());
        prop_assert!(view.items[first_plain..].iter().all(|s| !s.favorited));
    }

    #[test]
    fn prop_summary_average_is_finite(seeds in prop::collection::vec(seed(), 0..20)) {
        let signals = build(&seeds);
        let summary = summarize(&signals);
        prop_assert!(summary.average.is_finite());
        prop_assert!((0.0..=100.0).contains(&summary.average));
        prop_assert_eq!(summary.count + summary.archived, signals.len());
        let bucketed: usize = summary.breakdown.iter().map(|b| b.count).sum();
        prop_assert_eq!(bucketed, summary.count);
    }

    #[test]
    fn prop_create_then_delete_is_identity(seeds in prop::collection::vec(seed(), 0..10), title in "[A-Za-z]{1,10}") {
        let signals = build(&seeds);
        let (grown, created) = mutation::create(&signals, &FormInput::new().with("title", title)).unwrap();
        prop_assert_eq!(grown.len(), signals.len() + 1);
        let (shrunk, removed) = mutation::delete(&grown, &created.id).unwrap();
        prop_assert_eq!(removed, created);
        prop_assert_eq!(shrunk, signals);
    }

    #[test]
    fn prop_scores_are_clamped(raw in -1000.0f64..1000.0) {
        let form = FormInput::new().with("title", "p").with("confidence", raw.to_string());
        let p = Prototype::from_form("p1".into(), Utc::now(), &form).unwrap();
        prop_assert!((0.0..=100.0).contains(&p.confidence));
    }
}

#[test]
fn duplicate_copies_fields_and_resets_progress() {
    let form = FormInput::new()
        .with("title", "Smart hanger")
        .with("hypothesis", "Shoppers scan tags")
        .with("confidence", "80")
        .with("version", "4")
        .with("iterations", "9")
        .with("status", "Validated")
        .with("tags", "retail, iot");
    let source = Prototype::from_form("p1".into(), Utc::now(), &form).unwrap();
    let (next, copy) = mutation::duplicate(&[source.clone()], "p1").unwrap();

    assert_eq!(next.len(), 2);
    assert_ne!(copy.id, source.id);
    assert_eq!(copy.title, format!("Smart hanger{COPY_SUFFIX}"));
    assert_eq!((copy.version, copy.iterations), (1, 1));
    assert_eq!(copy.status.label(), "Idea");
    assert_eq!(copy.hypothesis, source.hypothesis);
    assert_eq!(copy.confidence, source.confidence);
    assert_eq!(copy.tags, source.tags);
    assert_eq!(next[0], source);
}

#[test]
fn strength_sort_example() {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let a = Signal::from_form(
        "a".into(),
        base,
        &FormInput::new().with("title", "A").with("strength", "80").with("trajectory", "Rising"),
    )
    .unwrap();
    let b = Signal::from_form(
        "b".into(),
        base,
        &FormInput::new().with("title", "B").with("strength", "40").with("trajectory", "Falling"),
    )
    .unwrap();
    let params = ViewParams::new().sort_by(SignalSort::Strength);

    let mut signals = vec![a, b];
    let order: Vec<String> = derive(&signals, &params).items.into_iter().map(|s| s.title).collect();
    assert_eq!(order, ["A", "B"]);

    let (next, _) = mutation::toggle_favorite(&signals, "b").unwrap();
    signals = next;
    let order: Vec<String> = derive(&signals, &params).items.into_iter().map(|s| s.title).collect();
    assert_eq!(order, ["B", "A"]);
}
