//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the aggregation engine and the
//! collaborators it consumes. Sieve heuristics, closure rules and reporting
//! live outside the engine.

use crate::{Document, Relation};
use std::error::Error;

/// Fault raised by a sieve or closure oracle
///
/// Any fault aborts processing of the current document.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct SieveFault {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl SieveFault {
    /// Create a fault with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a fault wrapping an underlying error
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The fault message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A rule or classifier proposing relations for a document
///
/// Implemented outside this workspace. A sieve may keep internal state across
/// documents (loaded models), but only reads the accepted relations it is given.
pub trait Sieve: Send + Sync {
    /// Propose candidate relations given the relations accepted so far
    fn annotate(
        &self,
        document: &dyn Document,
        accepted: &[Relation],
    ) -> Result<Vec<Relation>, SieveFault>;
}

/// Adapter turning a closure into a [`Sieve`]
pub struct FnSieve<F> {
    f: F,
}

/// Wrap a closure as a sieve
///
/// # Examples
///
/// ```
/// use tlink_domain::{sieve_fn, Document, Relation, RelationKind, Sieve, SieveDocument};
///
/// let sieve = sieve_fn(|_doc: &dyn Document, _accepted: &[Relation]| {
///     Ok(vec![Relation::new("e1", "e2", RelationKind::Vague)])
/// });
///
/// let doc = SieveDocument::new("d1");
/// assert_eq!(sieve.annotate(&doc, &[]).unwrap().len(), 1);
/// ```
pub fn sieve_fn<F>(f: F) -> FnSieve<F>
where
    F: Fn(&dyn Document, &[Relation]) -> Result<Vec<Relation>, SieveFault> + Send + Sync,
{
    FnSieve { f }
}

impl<F> Sieve for FnSieve<F>
where
    F: Fn(&dyn Document, &[Relation]) -> Result<Vec<Relation>, SieveFault> + Send + Sync,
{
    fn annotate(
        &self,
        document: &dyn Document,
        accepted: &[Relation],
    ) -> Result<Vec<Relation>, SieveFault> {
        (self.f)(document, accepted)
    }
}

/// Transitive-closure inference over an accepted relation set
///
/// Implemented outside this workspace. Should return only relations implied by
/// `accepted`; feeding an already closed set back in should yield nothing new.
pub trait ClosureOracle: Send + Sync {
    /// Infer additional relations from the accepted set
    fn compute_closure(&self, accepted: &[Relation]) -> Result<Vec<Relation>, SieveFault>;
}

/// Closure oracle that never infers anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClosure;

impl ClosureOracle for NoClosure {
    fn compute_closure(&self, _accepted: &[Relation]) -> Result<Vec<Relation>, SieveFault> {
        Ok(Vec::new())
    }
}

/// Decides whether an accepted relation already covers a candidate's pair
///
/// What counts as the same pair is owned by the relation model; the engine
/// only needs the boolean answer.
pub trait PairMatcher: Send + Sync {
    /// True when `accepted` and `candidate` link the same two entities
    fn covers_same_pair(&self, accepted: &Relation, candidate: &Relation) -> bool;
}

/// Matches relations whose endpoints are equal in either order
#[derive(Debug, Clone, Copy, Default)]
pub struct UnorderedPairMatcher;

impl PairMatcher for UnorderedPairMatcher {
    fn covers_same_pair(&self, accepted: &Relation, candidate: &Relation) -> bool {
        accepted.covers_same_pair(candidate)
    }
}

/// Renders relations for human-readable diagnostics
///
/// Purely observational; output never affects which relations are accepted.
pub trait DebugReporter: Send + Sync {
    /// Describe `relation` using the entity context of `document`
    fn describe(&self, relation: &Relation, document: &dyn Document) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RelationKind, SieveDocument};

    #[test]
    fn test_fn_sieve_sees_accepted() {
        let sieve = sieve_fn(|_doc: &dyn Document, accepted: &[Relation]| {
            Ok(accepted.iter().map(Relation::inverted).collect())
        });
        let doc = SieveDocument::new("d1");
        let accepted = vec![Relation::new("e1", "e2", RelationKind::Before)];

        let proposed = sieve.annotate(&doc, &accepted).unwrap();
        assert_eq!(proposed, vec![Relation::new("e2", "e1", RelationKind::After)]);
    }

    #[test]
    fn test_fault_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "model missing");
        let fault = SieveFault::with_source("could not load classifier", io);

        assert_eq!(fault.to_string(), "could not load classifier");
        assert!(fault.source().is_some());
        assert!(SieveFault::new("boom").source().is_none());
    }

    #[test]
    fn test_no_closure() {
        let accepted = vec![Relation::new("e1", "e2", RelationKind::Before)];
        assert!(NoClosure.compute_closure(&accepted).unwrap().is_empty());
    }

    #[test]
    fn test_unordered_matcher() {
        let a = Relation::new("e1", "e2", RelationKind::Before);
        let b = Relation::new("e2", "e1", RelationKind::Before);
        assert!(UnorderedPairMatcher.covers_same_pair(&a, &b));
    }
}
