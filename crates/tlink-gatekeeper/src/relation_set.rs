//! Accepted relation set with first-writer-wins pair arbitration

use crate::GatekeeperError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tlink_domain::{
    ClosureOracle, EntityPairKey, Origin, PairMatcher, Relation, UnorderedPairMatcher,
};

/// Reasons a candidate relation is dropped
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// One or both endpoint identifiers are empty
    InvalidRelation,

    /// The same unordered pair was already proposed earlier in this batch
    DuplicateInBatch,

    /// An accepted relation already covers this pair
    ConflictsWithAccepted {
        /// The relation that keeps the pair
        existing: Relation,
    },
}

impl RejectionReason {
    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::InvalidRelation => "invalid relation",
            RejectionReason::DuplicateInBatch => "duplicate in batch",
            RejectionReason::ConflictsWithAccepted { .. } => "conflicts with accepted",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::ConflictsWithAccepted { existing } => {
                write!(f, "{} {}", self.as_str(), existing)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

/// A dropped candidate and why it was dropped
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// The candidate as proposed
    pub relation: Relation,

    /// Why it was dropped
    pub reason: RejectionReason,
}

impl Rejection {
    fn new(relation: Relation, reason: RejectionReason) -> Self {
        Self { relation, reason }
    }
}

/// Result of merging one batch of candidates
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Label stamped on every accepted relation
    pub origin: Origin,

    /// Number of candidates in the batch
    pub proposed: usize,

    /// Relations committed, in their original relative order
    pub accepted: Vec<Relation>,

    /// Candidates dropped, duplicates and invalids first, then conflicts
    pub rejected: Vec<Rejection>,
}

impl MergeOutcome {
    fn new(origin: Origin, proposed: usize) -> Self {
        Self {
            origin,
            proposed,
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Number of relations committed
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Number of candidates dropped for any reason
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Number of candidates dropped for missing an endpoint
    pub fn invalid_count(&self) -> usize {
        self.count_where(|r| matches!(r, RejectionReason::InvalidRelation))
    }

    /// Number of candidates dropped as repeats within the batch
    pub fn duplicate_count(&self) -> usize {
        self.count_where(|r| matches!(r, RejectionReason::DuplicateInBatch))
    }

    /// Number of candidates dropped because the pair was already covered
    pub fn conflict_count(&self) -> usize {
        self.count_where(|r| matches!(r, RejectionReason::ConflictsWithAccepted { .. }))
    }

    fn count_where(&self, pred: impl Fn(&RejectionReason) -> bool) -> usize {
        self.rejected.iter().filter(|r| pred(&r.reason)).count()
    }
}

/// The relations accepted so far for one document
///
/// Keeps acceptance order for output and an index from unordered entity pair
/// to the relation covering it. At most one accepted relation exists per pair;
/// once a pair is covered, later candidates for it are rejected.
///
/// A set is owned by a single document-processing step and is cleared (or
/// taken) before the next document.
pub struct RelationSet<M = UnorderedPairMatcher> {
    accepted: Vec<Relation>,
    index: HashMap<EntityPairKey, usize>,
    matcher: M,
    overwrites: usize,
}

impl RelationSet<UnorderedPairMatcher> {
    /// Create an empty set using endpoint equality to detect conflicts
    pub fn new() -> Self {
        Self::with_matcher(UnorderedPairMatcher)
    }
}

impl Default for RelationSet<UnorderedPairMatcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: PairMatcher> RelationSet<M> {
    /// Create an empty set with a custom same-pair predicate
    pub fn with_matcher(matcher: M) -> Self {
        Self {
            accepted: Vec::new(),
            index: HashMap::new(),
            matcher,
            overwrites: 0,
        }
    }

    /// Everything accepted so far, in acceptance order
    pub fn snapshot(&self) -> &[Relation] {
        &self.accepted
    }

    /// Number of accepted relations
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    /// Whether nothing has been accepted
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// The accepted relation covering the pair `(a, b)`, in either order
    pub fn get(&self, a: &str, b: &str) -> Option<&Relation> {
        let key = EntityPairKey::new(a, b)?;
        self.index.get(&key).map(|&pos| &self.accepted[pos])
    }

    /// Number of times an accepted relation was replaced in the index
    ///
    /// Non-zero only when the pair matcher disagrees with the pair key.
    pub fn overwrites(&self) -> usize {
        self.overwrites
    }

    /// Reset to empty for the next document
    pub fn clear(&mut self) {
        self.accepted.clear();
        self.index.clear();
        self.overwrites = 0;
    }

    /// Remove and return everything accepted, leaving the set empty
    pub fn take(&mut self) -> Vec<Relation> {
        self.index.clear();
        self.overwrites = 0;
        std::mem::take(&mut self.accepted)
    }

    /// Accept a single candidate
    ///
    /// Rejects invalid candidates and candidates whose pair is already covered.
    /// The origin is stamped only if the candidate does not carry one.
    pub fn try_accept(&mut self, mut candidate: Relation, origin: &Origin) -> Result<&Relation, Rejection> {
        let Some(key) = candidate.pair_key() else {
            return Err(Rejection::new(candidate, RejectionReason::InvalidRelation));
        };

        if let Some(existing) = self.conflicting(&key, &candidate) {
            let existing = existing.clone();
            return Err(Rejection::new(
                candidate,
                RejectionReason::ConflictsWithAccepted { existing },
            ));
        }

        candidate.origin.get_or_insert_with(|| origin.clone());
        Ok(self.commit(key, candidate))
    }

    /// Merge one sieve invocation's proposals
    ///
    /// Filtering runs in two passes. The first looks only at the batch and
    /// drops invalid candidates and repeats of a pair already seen in the batch.
    /// The second drops the remaining candidates whose pair is already covered
    /// by an accepted relation. Survivors are committed in their original
    /// relative order with `origin` stamped on each.
    pub fn accept_batch(&mut self, candidates: Vec<Relation>, origin: &Origin) -> MergeOutcome {
        let mut outcome = MergeOutcome::new(origin.clone(), candidates.len());

        // Pass 1: batch-local filtering, independent of accepted state
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(key) = candidate.pair_key() else {
                outcome
                    .rejected
                    .push(Rejection::new(candidate, RejectionReason::InvalidRelation));
                continue;
            };

            if seen.contains(&key) {
                outcome
                    .rejected
                    .push(Rejection::new(candidate, RejectionReason::DuplicateInBatch));
                continue;
            }

            seen.insert(key.clone());
            unique.push((key, candidate));
        }

        // Pass 2: conflicts with relations accepted before this batch
        let mut survivors = Vec::with_capacity(unique.len());
        for (key, candidate) in unique {
            match self.conflicting(&key, &candidate) {
                Some(existing) => {
                    let existing = existing.clone();
                    outcome.rejected.push(Rejection::new(
                        candidate,
                        RejectionReason::ConflictsWithAccepted { existing },
                    ));
                }
                None => survivors.push((key, candidate)),
            }
        }

        for (key, mut relation) in survivors {
            relation.origin = Some(origin.clone());
            let committed = self.commit(key, relation).clone();
            outcome.accepted.push(committed);
        }

        outcome
    }

    /// Run the closure oracle over everything accepted and merge its output
    ///
    /// Inferred relations go through [`accept_batch`](Self::accept_batch) with
    /// [`Origin::Closure`], so they can only fill pairs that are not yet covered.
    pub fn expand_closure<O>(&mut self, oracle: &O) -> Result<MergeOutcome, GatekeeperError>
    where
        O: ClosureOracle + ?Sized,
    {
        let inferred = oracle
            .compute_closure(&self.accepted)
            .map_err(GatekeeperError::Closure)?;

        Ok(self.accept_batch(inferred, &Origin::Closure))
    }

    fn conflicting(&self, key: &EntityPairKey, candidate: &Relation) -> Option<&Relation> {
        let existing = &self.accepted[*self.index.get(key)?];
        if self.matcher.covers_same_pair(existing, candidate) {
            Some(existing)
        } else {
            None
        }
    }

    fn commit(&mut self, key: EntityPairKey, relation: Relation) -> &Relation {
        let position = self.accepted.len();

        if let Some(previous) = self.index.insert(key, position) {
            // Only reachable when the matcher and the pair key disagree
            self.overwrites += 1;
            tracing::warn!(
                existing = %self.accepted[previous],
                replacement = %relation,
                "UnexpectedOverwrite: accepted relation replaced in pair index"
            );
        }

        self.accepted.push(relation);
        &self.accepted[position]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlink_domain::{RelationKind, SieveFault};

    fn rel(a: &str, b: &str, kind: RelationKind) -> Relation {
        Relation::new(a, b, kind)
    }

    /// Infers a BEFORE b from a BEFORE x and x BEFORE b, for uncovered pairs only
    struct BeforeChain;

    impl ClosureOracle for BeforeChain {
        fn compute_closure(&self, accepted: &[Relation]) -> Result<Vec<Relation>, SieveFault> {
            let covered: HashSet<_> = accepted.iter().filter_map(Relation::pair_key).collect();
            let mut inferred = Vec::new();
            for left in accepted.iter().filter(|r| r.kind == RelationKind::Before) {
                for right in accepted.iter().filter(|r| r.kind == RelationKind::Before) {
                    if left.id2 != right.id1 || left.id1 == right.id2 {
                        continue;
                    }
                    let candidate = rel(&left.id1, &right.id2, RelationKind::Before);
                    if let Some(key) = candidate.pair_key() {
                        if !covered.contains(&key) {
                            inferred.push(candidate);
                        }
                    }
                }
            }
            Ok(inferred)
        }
    }

    struct FailingOracle;

    impl ClosureOracle for FailingOracle {
        fn compute_closure(&self, _accepted: &[Relation]) -> Result<Vec<Relation>, SieveFault> {
            Err(SieveFault::new("closure table missing"))
        }
    }

    /// Never considers two relations the same pair
    struct NeverSame;

    impl PairMatcher for NeverSame {
        fn covers_same_pair(&self, _accepted: &Relation, _candidate: &Relation) -> bool {
            false
        }
    }

    #[test]
    fn test_duplicate_in_batch_counted_once() {
        let mut set = RelationSet::new();
        let outcome = set.accept_batch(
            vec![
                rel("x", "y", RelationKind::Before),
                rel("x", "y", RelationKind::After),
            ],
            &Origin::sieve("S1"),
        );

        assert_eq!(outcome.accepted_count(), 1);
        assert_eq!(outcome.rejected_count(), 1);
        assert_eq!(outcome.duplicate_count(), 1);
        assert_eq!(outcome.conflict_count(), 0);
        assert_eq!(set.snapshot()[0].kind, RelationKind::Before);
    }

    #[test]
    fn test_duplicate_in_reverse_direction() {
        let mut set = RelationSet::new();
        let outcome = set.accept_batch(
            vec![
                rel("x", "y", RelationKind::Before),
                rel("y", "x", RelationKind::After),
            ],
            &Origin::sieve("S1"),
        );

        assert_eq!(outcome.duplicate_count(), 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_duplicate_and_conflict_counted_as_duplicate() {
        let mut set = RelationSet::new();
        set.accept_batch(vec![rel("x", "y", RelationKind::Before)], &Origin::sieve("S1"));

        // Both candidates hit the accepted pair; the second is also a batch repeat
        let outcome = set.accept_batch(
            vec![
                rel("x", "y", RelationKind::After),
                rel("y", "x", RelationKind::Vague),
            ],
            &Origin::sieve("S2"),
        );

        assert_eq!(outcome.rejected_count(), 2);
        assert_eq!(outcome.duplicate_count(), 1);
        assert_eq!(outcome.conflict_count(), 1);
        assert_eq!(outcome.rejected[0].relation.kind, RelationKind::Vague);
    }

    #[test]
    fn test_invalid_rejected() {
        let mut set = RelationSet::new();
        let outcome = set.accept_batch(
            vec![rel("e1", "", RelationKind::Before)],
            &Origin::sieve("S1"),
        );

        assert_eq!(outcome.invalid_count(), 1);
        assert!(set.is_empty());

        let single = set.try_accept(rel("", "e2", RelationKind::After), &Origin::sieve("S1"));
        assert_eq!(single.unwrap_err().reason, RejectionReason::InvalidRelation);
        assert!(set.is_empty());
    }

    #[test]
    fn test_invalid_does_not_mark_pair_seen() {
        let mut set = RelationSet::new();
        let outcome = set.accept_batch(
            vec![
                rel("e1", "", RelationKind::Before),
                rel("e1", "e2", RelationKind::Before),
            ],
            &Origin::sieve("S1"),
        );

        assert_eq!(outcome.invalid_count(), 1);
        assert_eq!(outcome.accepted_count(), 1);
    }

    #[test]
    fn test_first_writer_wins() {
        let mut set = RelationSet::new();
        set.accept_batch(vec![rel("x", "y", RelationKind::Before)], &Origin::sieve("A"));
        let outcome = set.accept_batch(vec![rel("y", "x", RelationKind::Before)], &Origin::sieve("B"));

        assert_eq!(outcome.conflict_count(), 1);
        match &outcome.rejected[0].reason {
            RejectionReason::ConflictsWithAccepted { existing } => {
                assert_eq!(existing.origin, Some(Origin::sieve("A")));
            }
            other => panic!("Expected ConflictsWithAccepted, got {:?}", other),
        }

        let kept = set.get("x", "y").unwrap();
        assert_eq!(kept.kind, RelationKind::Before);
        assert_eq!(kept.id1, "x");
        assert_eq!(kept.origin, Some(Origin::sieve("A")));
        assert_eq!(set.get("y", "x"), Some(kept));
    }

    #[test]
    fn test_batch_preserves_relative_order() {
        let mut set = RelationSet::new();
        set.accept_batch(vec![rel("b", "c", RelationKind::Before)], &Origin::sieve("S1"));

        let outcome = set.accept_batch(
            vec![
                rel("a", "b", RelationKind::Before),
                rel("c", "b", RelationKind::After),
                rel("c", "d", RelationKind::Includes),
                rel("a", "d", RelationKind::Vague),
            ],
            &Origin::sieve("S2"),
        );

        let ids: Vec<_> = outcome.accepted.iter().map(|r| (r.id1.as_str(), r.id2.as_str())).collect();
        assert_eq!(ids, vec![("a", "b"), ("c", "d"), ("a", "d")]);
        assert!(outcome.accepted.iter().all(|r| r.origin == Some(Origin::sieve("S2"))));
        assert_eq!(set.snapshot().len(), 4);
        assert_eq!(set.snapshot()[0].id1, "b");
    }

    #[test]
    fn test_batch_stamps_origin() {
        let mut set = RelationSet::new();
        let candidate = rel("e1", "e2", RelationKind::Before).with_origin(Origin::sieve("stale"));
        set.accept_batch(vec![candidate], &Origin::sieve("S1"));

        assert_eq!(set.snapshot()[0].origin, Some(Origin::sieve("S1")));
    }

    #[test]
    fn test_try_accept_keeps_existing_origin() {
        let mut set = RelationSet::new();
        let accepted = set
            .try_accept(
                rel("e1", "e2", RelationKind::Before).with_origin(Origin::sieve("Manual")),
                &Origin::sieve("S1"),
            )
            .unwrap();
        assert_eq!(accepted.origin, Some(Origin::sieve("Manual")));

        let accepted = set
            .try_accept(rel("e2", "e3", RelationKind::Before), &Origin::sieve("S1"))
            .unwrap();
        assert_eq!(accepted.origin, Some(Origin::sieve("S1")));

        let rejected = set
            .try_accept(rel("e3", "e2", RelationKind::After), &Origin::sieve("S2"))
            .unwrap_err();
        assert!(matches!(rejected.reason, RejectionReason::ConflictsWithAccepted { .. }));
    }

    #[test]
    fn test_closure_is_non_destructive() {
        let mut set = RelationSet::new();
        set.accept_batch(
            vec![
                rel("e1", "e2", RelationKind::Before),
                rel("e2", "e3", RelationKind::Before),
                rel("e1", "e3", RelationKind::Vague),
                rel("e3", "e4", RelationKind::Before),
            ],
            &Origin::sieve("S1"),
        );
        let before = set.snapshot().to_vec();

        let outcome = set.expand_closure(&BeforeChain).unwrap();

        assert_eq!(&set.snapshot()[..before.len()], &before[..]);
        assert_eq!(outcome.accepted_count(), 1);
        assert_eq!(outcome.accepted[0].id1, "e2");
        assert_eq!(outcome.accepted[0].id2, "e4");
        assert_eq!(outcome.accepted[0].origin, Some(Origin::Closure));
        // e1/e3 stays VAGUE from S1
        assert_eq!(set.get("e1", "e3").unwrap().kind, RelationKind::Vague);
    }

    #[test]
    fn test_reclosure_adds_nothing() {
        let mut set = RelationSet::new();
        set.accept_batch(
            vec![
                rel("a", "b", RelationKind::Before),
                rel("b", "c", RelationKind::Before),
                rel("c", "d", RelationKind::Before),
            ],
            &Origin::sieve("S1"),
        );

        let mut added = 0;
        loop {
            let outcome = set.expand_closure(&BeforeChain).unwrap();
            if outcome.accepted_count() == 0 {
                break;
            }
            added += outcome.accepted_count();
        }
        assert_eq!(added, 3);

        let again = set.expand_closure(&BeforeChain).unwrap();
        assert_eq!(again.proposed, 0);
        assert_eq!(again.accepted_count(), 0);
    }

    #[test]
    fn test_closure_fault_propagates() {
        let mut set = RelationSet::new();
        set.accept_batch(vec![rel("a", "b", RelationKind::Before)], &Origin::sieve("S1"));

        let err = set.expand_closure(&FailingOracle).unwrap_err();
        assert!(err.to_string().contains("closure table missing"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_overwrite_fallback_keeps_index_consistent() {
        let mut set = RelationSet::with_matcher(NeverSame);
        set.accept_batch(vec![rel("a", "b", RelationKind::Before)], &Origin::sieve("S1"));
        set.accept_batch(vec![rel("b", "a", RelationKind::Before)], &Origin::sieve("S2"));

        assert_eq!(set.overwrites(), 1);
        assert_eq!(set.get("a", "b").unwrap().origin, Some(Origin::sieve("S2")));
    }

    #[test]
    fn test_clear_and_take() {
        let mut set = RelationSet::new();
        set.accept_batch(vec![rel("a", "b", RelationKind::Before)], &Origin::sieve("S1"));

        let taken = set.take();
        assert_eq!(taken.len(), 1);
        assert!(set.is_empty());
        assert!(set.get("a", "b").is_none());

        set.accept_batch(vec![rel("a", "b", RelationKind::After)], &Origin::sieve("S1"));
        set.clear();
        assert!(set.is_empty());
        assert!(set.get("a", "b").is_none());
    }
}
