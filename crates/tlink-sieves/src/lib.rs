//! TLink Sieves
//!
//! Runs an ordered pipeline of sieves over documents and aggregates their
//! proposed temporal relations.
//!
//! # Overview
//!
//! The pipeline is responsible for:
//! - **Sieve resolution**: Mapping configured identifiers to sieve instances
//!   through a [`SieveRegistry`], once, at startup
//! - **Aggregation**: Merging each sieve's proposals so earlier sieves win
//!   conflicting entity pairs
//! - **Closure**: Running transitive closure after every sieve that added
//!   relations, under the same merge rules
//! - **Statistics**: Per-sieve proposed/removed/closure counters
//!
//! # Precedence
//!
//! | Sieve position | Wins against |
//! |----------------|--------------|
//! | Earlier in the list | Every later sieve and later closure output |
//! | Closure after sieve *k* | Sieves *k+1* onward |
//! | Within one batch | The first proposal for a pair |
//!
//! # Usage
//!
//! ## One document at a time
//!
//! ```
//! use tlink_domain::{sieve_fn, Document, NoClosure, Relation, RelationKind, SieveDocument};
//! use tlink_sieves::{PipelineConfig, SieveRegistry, SieveRunner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = SieveRegistry::new();
//! registry
//!     .register("Early", || {
//!         Ok(sieve_fn(|_doc: &dyn Document, _accepted: &[Relation]| {
//!             Ok(vec![Relation::new("e1", "e2", RelationKind::Before)])
//!         }))
//!     })
//!     .register("Late", || {
//!         Ok(sieve_fn(|_doc: &dyn Document, _accepted: &[Relation]| {
//!             Ok(vec![Relation::new("e2", "e1", RelationKind::Before)])
//!         }))
//!     });
//!
//! let config = PipelineConfig::with_sieves(["Early", "Late"]);
//! let runner = SieveRunner::from_registry(config, &registry, NoClosure)?;
//!
//! let mut doc = SieveDocument::new("d1");
//! let stats = runner.annotate_document(&mut doc)?;
//!
//! assert_eq!(doc.relations().len(), 1);
//! assert_eq!(stats.by_name("Late").unwrap().removed, 1);
//! println!("{}", stats.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Batch Worker
//!
//! [`BatchWorker`] processes many documents concurrently on the tokio
//! blocking pool, each with its own relation set.
//!
//! # Configuration
//!
//! The pipeline can be configured via TOML:
//!
//! ```toml
//! sieves = ["TimeTimeSieve", "AdjacentVerbTimex", "AllVagueSieve"]
//! # or: sieve_list = "default.sieves"
//! closure = true
//! debug = false
//! max_concurrent_documents = 4
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod statistics;
mod registry;
mod reporter;
mod runner;
mod worker;

pub use error::PipelineError;
pub use config::{load_sieve_list, parse_sieve_list, PipelineConfig};
pub use statistics::{SieveCounts, SieveStatistics};
pub use registry::{NamedSieve, SieveFactory, SieveRegistry};
pub use reporter::PlainReporter;
pub use runner::{RunReport, SieveRunner};
pub use worker::{BatchReport, BatchWorker};
