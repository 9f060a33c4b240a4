//! Explicit cascade table for parent → child deletes.
//!
//! References between collections are soft: a child may point at a parent
//! that no longer exists and readers render it as "Unknown". Only the pairs
//! listed in [`CASCADE_RULES`] remove their children when the parent goes.

use crate::error::{StudioError, StudioResult};
use crate::record::{ChildOf, EntityKind, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeRule {
    pub parent: EntityKind,
    pub child: EntityKind,
    /// Child field holding the parent id.
    pub foreign_key: &'static str,
}

pub const CASCADE_RULES: &[CascadeRule] = &[CascadeRule {
    parent: EntityKind::Challenge,
    child: EntityKind::Solution,
    foreign_key: "challengeId",
}];

/// Rules whose parent is `kind`.
pub fn rules_for(kind: EntityKind) -> impl Iterator<Item = &'static CascadeRule> {
    CASCADE_RULES.iter().filter(move |r| r.parent == kind)
}

pub fn cascades(parent: EntityKind, child: EntityKind) -> bool {
    rules_for(parent).any(|r| r.child == child)
}

/// Result of a cascading delete, before anything is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome<P, C> {
    pub parents: Vec<P>,
    pub children: Vec<C>,
    pub removed: P,
    pub removed_children: Vec<C>,
}

/// Removes parent `id` and every child pointing at it. Fails for pairs not in
/// [`CASCADE_RULES`].
pub fn delete_cascading<P, C>(parents: &[P], children: &[C], id: &str) -> StudioResult<CascadeOutcome<P, C>>
where
    P: Record,
    C: ChildOf<P>,
{
    if !cascades(P::KIND, C::KIND) {
        return Err(StudioError::invalid(format!(
            "no cascade from {} to {}",
            P::KIND,
            C::KIND
        )));
    }
    let (next_parents, removed) = crate::mutation::delete(parents, id)?;
    let (removed_children, kept): (Vec<C>, Vec<C>) =
        children.iter().cloned().partition(|c| c.parent_id() == id);

    tracing::debug!(
        target: "atelier::mutation",
        parent = %P::KIND,
        child = %C::KIND,
        id = id,
        removed_children = removed_children.len(),
        action = "CASCADE",
        "deleted {} '{}' and {} linked {}",
        P::KIND,
        removed.title(),
        removed_children.len(),
        C::KIND
    );
    Ok(CascadeOutcome {
        parents: next_parents,
        children: kept,
        removed,
        removed_children,
    })
}

/// Children whose non-empty parent reference points at nothing. Reported in
/// the status matrix; the children themselves are left in place.
pub fn dangling<'a, P, C>(parents: &[P], children: &'a [C]) -> Vec<&'a C>
where
    P: Record,
    C: ChildOf<P>,
{
    children
        .iter()
        .filter(|c| !c.parent_id().is_empty() && !parents.iter().any(|p| p.id() == c.parent_id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Challenge, FundingRound, Investor, Solution};
    use crate::record::{FormInput, FromForm};
    use chrono::Utc;

    fn challenge(id: &str) -> Challenge {
        Challenge::from_form(id.into(), Utc::now(), &FormInput::new().with("title", id)).unwrap()
    }

    fn solution(id: &str, parent: &str) -> Solution {
        let form = FormInput::new().with("title", id).with("challengeId", parent);
        Solution::from_form(id.into(), Utc::now(), &form).unwrap()
    }

    #[test]
    fn challenge_delete_removes_linked_solutions() {
        let challenges = vec![challenge("c1"), challenge("c2")];
        let solutions = vec![solution("s1", "c1"), solution("s2", "c2"), solution("s3", "c1")];
        let out = delete_cascading(&challenges, &solutions, "c1").unwrap();
        assert_eq!(out.removed.id, "c1");
        assert_eq!(out.parents.len(), 1);
        assert_eq!(out.removed_children.len(), 2);
        assert_eq!(out.children.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["s2"]);
    }

    #[test]
    fn pairs_outside_the_table_do_not_cascade() {
        assert!(cascades(EntityKind::Challenge, EntityKind::Solution));
        assert!(!cascades(EntityKind::FundingRound, EntityKind::Investor));
        let rounds: Vec<FundingRound> = Vec::new();
        let investors: Vec<Investor> = Vec::new();
        assert!(delete_cascading(&rounds, &investors, "r1").unwrap_err().is_validation());
    }

    #[test]
    fn dangling_skips_unlinked_children() {
        let challenges = vec![challenge("c1")];
        let solutions = vec![solution("s1", "c1"), solution("s2", "gone"), solution("s3", "")];
        let orphans = dangling(&challenges, &solutions);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, "s2");
    }
}
