//! TLink Domain Layer
//!
//! This crate contains the value types and collaborator interfaces shared by the
//! temporal-link aggregation engine. It holds no merge logic of its own; the
//! gatekeeper and sieve crates depend on the concepts defined here.
//!
//! ## Key Concepts
//!
//! - **Relation**: a typed edge (TLink) between two opaque entity identifiers
//! - **EntityPairKey**: the order-independent key every consistency check uses
//! - **Origin**: which sieve (or closure) caused a relation to be accepted
//! - **Document**: the entity context a sieve reads, and the sink for results
//! - **Sieve / ClosureOracle**: external collaborators that propose relations
//!
//! ## Architecture
//!
//! - Only serde and thiserror as external dependencies
//! - Trait definitions for every external interaction
//! - Implementations of sieves and closure rules live outside this workspace

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod pair_key;
pub mod provenance;
pub mod relation;
pub mod traits;

// Re-exports for convenience
pub use document::{Document, Entity, EntityKind, EventAttributes, SieveDocument};
pub use pair_key::EntityPairKey;
pub use provenance::Origin;
pub use relation::{Relation, RelationKind};
pub use traits::{
    sieve_fn, ClosureOracle, DebugReporter, FnSieve, NoClosure, PairMatcher, Sieve, SieveFault,
    UnorderedPairMatcher,
};
