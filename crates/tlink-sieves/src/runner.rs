//! Sequential sieve pipeline over documents

use crate::config::check_sieve_name;
use crate::{NamedSieve, PipelineConfig, PipelineError, PlainReporter, SieveRegistry, SieveStatistics};
use tlink_domain::{ClosureOracle, DebugReporter, Document, Origin};
use tlink_gatekeeper::{GatekeeperError, MergeOutcome, RejectionReason, RelationSet};

/// Runs an ordered list of sieves over documents
///
/// For each document the runner:
/// 1. Removes every relation the document already holds
/// 2. Runs each sieve in order, merging its proposals into the accepted set
///    (earlier sieves win conflicting pairs)
/// 3. Runs closure after each sieve that added relations, if enabled
/// 4. Attaches the accepted relations, in acceptance order, to the document
///
/// A sieve or closure fault aborts the current document only.
///
/// # Examples
///
/// ```
/// use tlink_domain::{sieve_fn, Document, NoClosure, Relation, RelationKind, SieveDocument};
/// use tlink_sieves::{PipelineConfig, SieveRegistry, SieveRunner};
///
/// let mut registry = SieveRegistry::new();
/// registry.register("AllBefore", || {
///     Ok(sieve_fn(|_doc: &dyn Document, _accepted: &[Relation]| {
///         Ok(vec![Relation::new("e1", "e2", RelationKind::Before)])
///     }))
/// });
///
/// let config = PipelineConfig::with_sieves(["AllBefore"]);
/// let runner = SieveRunner::from_registry(config, &registry, NoClosure).unwrap();
///
/// let mut doc = SieveDocument::new("d1");
/// let stats = runner.annotate_document(&mut doc).unwrap();
///
/// assert_eq!(doc.relations().len(), 1);
/// assert_eq!(stats.get(0).unwrap().proposed, 1);
/// ```
pub struct SieveRunner {
    config: PipelineConfig,
    sieves: Vec<NamedSieve>,
    closure: Box<dyn ClosureOracle>,
    reporter: Box<dyn DebugReporter>,
}

/// Outcome of running the pipeline over a slice of documents
#[derive(Debug)]
pub struct RunReport {
    /// Counters merged from every document that completed
    pub statistics: SieveStatistics,

    /// Documents attempted, including failed ones
    pub documents_processed: usize,

    /// One error per failed document, in processing order
    pub failures: Vec<PipelineError>,
}

impl RunReport {
    /// Documents that completed without a fault
    pub fn succeeded(&self) -> usize {
        self.documents_processed - self.failures.len()
    }

    /// Whether every document completed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl SieveRunner {
    /// Create a runner from already built sieves
    ///
    /// `config.sieves` is not consulted; the given sieves run in order.
    pub fn new(
        config: PipelineConfig,
        sieves: Vec<NamedSieve>,
        closure: impl ClosureOracle + 'static,
    ) -> Result<Self, PipelineError> {
        for sieve in &sieves {
            check_sieve_name(sieve.name())?;
        }

        Ok(Self {
            config,
            sieves,
            closure: Box::new(closure),
            reporter: Box::new(PlainReporter),
        })
    }

    /// Create a runner, resolving the configured sieves through `registry`
    pub fn from_registry(
        config: PipelineConfig,
        registry: &SieveRegistry,
        closure: impl ClosureOracle + 'static,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let names = config.resolved_sieves()?;
        let sieves = registry.instantiate(&names)?;

        tracing::info!("Sieve pipeline ready with {} sieves", sieves.len());
        Self::new(config, sieves, closure)
    }

    /// Replace the reporter used to render relations in diagnostics
    pub fn with_reporter(mut self, reporter: impl DebugReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// The runner's configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Sieve identifiers in pipeline order
    pub fn sieve_names(&self) -> Vec<&str> {
        self.sieves.iter().map(NamedSieve::name).collect()
    }

    /// Zeroed statistics with one slot per sieve
    pub fn new_statistics(&self) -> SieveStatistics {
        SieveStatistics::new(self.sieve_names())
    }

    /// Run every sieve over one document
    ///
    /// On success the document holds exactly the accepted relations and the
    /// returned statistics cover this document alone. On failure the document
    /// is left without relations.
    pub fn annotate_document(
        &self,
        document: &mut dyn Document,
    ) -> Result<SieveStatistics, PipelineError> {
        let name = document.name().to_string();
        let mut stats = self.new_statistics();
        let mut set = RelationSet::new();

        tracing::info!("Processing document {}", name);
        document.clear_relations();

        for (slot, named) in self.sieves.iter().enumerate() {
            let proposed = named
                .sieve()
                .annotate(&*document, set.snapshot())
                .map_err(|source| PipelineError::SieveExecution {
                    document: name.clone(),
                    sieve: named.name().to_string(),
                    source,
                })?;

            let outcome = set.accept_batch(proposed, &Origin::sieve(named.name()));
            stats.add_proposed(slot, outcome.proposed);
            stats.add_removed(slot, outcome.rejected_count());
            self.log_rejections(named.name(), &outcome, &*document);

            let mut closure_added = 0;
            if self.config.closure && outcome.accepted_count() > 0 {
                let closed = set
                    .expand_closure(self.closure.as_ref())
                    .map_err(|err| match err {
                        GatekeeperError::Closure(source) => PipelineError::ClosureExecution {
                            document: name.clone(),
                            after_sieve: named.name().to_string(),
                            source,
                        },
                    })?;
                closure_added = closed.accepted_count();
                stats.add_closure_added(slot, closure_added);
                self.log_rejections(named.name(), &closed, &*document);
            }

            if self.config.debug {
                tracing::debug!(
                    "{}\t\t{} proposed, {} removed, {} closure added",
                    named.name(),
                    outcome.proposed,
                    outcome.rejected_count(),
                    closure_added
                );
            }
        }

        let relations = set.take();
        if self.config.debug {
            tracing::debug!("Document {} has {} links", name, relations.len());
        }
        document.attach_relations(relations);
        stats.record_document();

        Ok(stats)
    }

    /// Run the pipeline over each document in turn
    ///
    /// Failed documents are reported and skipped; their partial counters are
    /// not merged.
    pub fn run<D: Document>(&self, documents: &mut [D]) -> RunReport {
        let mut report = RunReport {
            statistics: self.new_statistics(),
            documents_processed: 0,
            failures: Vec::new(),
        };

        for document in documents.iter_mut() {
            report.documents_processed += 1;
            match self.annotate_document(document) {
                Ok(stats) => report.statistics.merge(&stats),
                Err(e) => {
                    tracing::error!("Document failed: {}", e);
                    report.failures.push(e);
                }
            }
        }

        tracing::info!(
            "Processed {} documents ({} failed)\n{}",
            report.documents_processed,
            report.failures.len(),
            report.statistics.summary()
        );

        report
    }

    fn log_rejections(&self, sieve: &str, outcome: &MergeOutcome, document: &dyn Document) {
        for rejection in &outcome.rejected {
            match &rejection.reason {
                RejectionReason::InvalidRelation => {
                    tracing::warn!(
                        "{} proposed an invalid relation: {}",
                        outcome.origin,
                        rejection.relation
                    );
                }
                RejectionReason::DuplicateInBatch => {
                    tracing::warn!(
                        "{} proposed the same pair twice, dropping {}",
                        outcome.origin,
                        self.reporter.describe(&rejection.relation, document)
                    );
                }
                RejectionReason::ConflictsWithAccepted { existing } if self.config.debug => {
                    tracing::debug!(
                        sieve,
                        existing = %existing,
                        "Dropping conflicting {}",
                        self.reporter.describe(&rejection.relation, document)
                    );
                }
                RejectionReason::ConflictsWithAccepted { .. } => {}
            }
        }
    }
}

impl std::fmt::Debug for SieveRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SieveRunner")
            .field("config", &self.config)
            .field("sieves", &self.sieves)
            .finish()
    }
}
