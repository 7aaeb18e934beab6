//! TLink Gatekeeper
//!
//! Guards the accepted relation set of one document.
//!
//! The Gatekeeper provides:
//! - Rejection of invalid relations (missing endpoint)
//! - Duplicate detection within one batch of proposals
//! - Conflict detection against already-accepted relations (first writer wins)
//! - Provenance stamping of accepted relations
//! - Closure expansion merged under the same rules
//!
//! # Examples
//!
//! ```
//! use tlink_domain::{Origin, Relation, RelationKind};
//! use tlink_gatekeeper::RelationSet;
//!
//! let mut set = RelationSet::new();
//!
//! let outcome = set.accept_batch(
//!     vec![
//!         Relation::new("e1", "e2", RelationKind::Before),
//!         Relation::new("e2", "e1", RelationKind::After),
//!     ],
//!     &Origin::sieve("AdjacentVerbTimex"),
//! );
//!
//! assert_eq!(outcome.accepted_count(), 1);
//! assert_eq!(outcome.rejected_count(), 1);
//! assert_eq!(set.snapshot().len(), 1);
//! ```

#![warn(missing_docs)]

mod error;
mod relation_set;

pub use error::GatekeeperError;
pub use relation_set::{MergeOutcome, Rejection, RejectionReason, RelationSet};
