//! Parallel document processing on the tokio blocking pool

use crate::{PipelineError, SieveRunner, SieveStatistics};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tlink_domain::Document;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs a [`SieveRunner`] over many documents concurrently
///
/// Each document gets its own relation set and statistics, so documents never
/// share mutable state. Sieves run on tokio's blocking pool; at most
/// `max_concurrent` documents are in flight at once.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tlink_domain::{sieve_fn, Document, NoClosure, Relation, RelationKind, SieveDocument};
/// use tlink_sieves::{BatchWorker, NamedSieve, PipelineConfig, SieveRunner};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sieve = sieve_fn(|_doc: &dyn Document, _accepted: &[Relation]| {
///         Ok(vec![Relation::new("e1", "e2", RelationKind::Before)])
///     });
///     let runner = SieveRunner::new(
///         PipelineConfig::with_sieves(["AllBefore"]),
///         vec![NamedSieve::new("AllBefore", sieve)],
///         NoClosure,
///     )?;
///
///     let worker = BatchWorker::new(Arc::new(runner));
///     let docs = vec![SieveDocument::new("d1"), SieveDocument::new("d2")];
///     let report = worker.run(docs).await;
///
///     assert_eq!(report.documents.len(), 2);
///     assert_eq!(report.statistics.documents(), 2);
///     Ok(())
/// }
/// ```
pub struct BatchWorker {
    runner: Arc<SieveRunner>,
    max_concurrent: usize,
}

/// Outcome of a batch run
#[derive(Debug)]
pub struct BatchReport<D> {
    /// The documents, in input order, with relations attached
    pub documents: Vec<D>,

    /// Counters merged from every document that completed
    pub statistics: SieveStatistics,

    /// One error per failed document
    pub failures: Vec<PipelineError>,
}

impl<D> BatchReport<D> {
    /// Whether every document completed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl BatchWorker {
    /// Create a worker bounded by the runner's `max_concurrent_documents`
    pub fn new(runner: Arc<SieveRunner>) -> Self {
        let max_concurrent = runner.config().max_concurrent_documents;
        Self {
            runner,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Override the concurrency bound (at least 1)
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Current concurrency bound
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Process all documents and return them in input order
    ///
    /// A document whose sieve faults or panics is still returned, without
    /// relations, and its error is listed in `failures`.
    pub async fn run<D>(&self, documents: Vec<D>) -> BatchReport<D>
    where
        D: Document + Send + 'static,
    {
        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        let mut results = Vec::with_capacity(total);

        tracing::info!(
            "Batch worker started ({} documents, max {} concurrent)",
            total,
            self.max_concurrent
        );

        for (index, mut document) in documents.into_iter().enumerate() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    let error = PipelineError::Worker(format!("Failed to acquire permit: {}", e));
                    results.push((index, document, Err(error)));
                    continue;
                }
            };

            let runner = Arc::clone(&self.runner);
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| runner.annotate_document(&mut document)));
                let result = outcome.unwrap_or_else(|_| {
                    Err(PipelineError::Worker(format!(
                        "Processing of document '{}' panicked",
                        document.name()
                    )))
                });
                (index, document, result)
            });
        }

        let mut lost = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => lost.push(PipelineError::Worker(format!("Task join error: {}", e))),
            }
        }

        results.sort_by_key(|(index, _, _)| *index);

        let mut report = BatchReport {
            documents: Vec::with_capacity(total),
            statistics: self.runner.new_statistics(),
            failures: Vec::new(),
        };

        for (_, document, result) in results {
            match result {
                Ok(stats) => report.statistics.merge(&stats),
                Err(e) => {
                    tracing::error!("Document failed: {}", e);
                    report.failures.push(e);
                }
            }
            report.documents.push(document);
        }
        report.failures.extend(lost);

        tracing::info!(
            "Batch worker finished ({} failed). Statistics:\n{}",
            report.failures.len(),
            report.statistics.summary()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NamedSieve, PipelineConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tlink_domain::{
        sieve_fn, NoClosure, Relation, RelationKind, Sieve, SieveDocument, SieveFault,
    };

    fn pair_sieve() -> NamedSieve {
        NamedSieve::new(
            "Pairs",
            sieve_fn(|_doc: &dyn Document, _accepted: &[Relation]| {
                Ok(vec![
                    Relation::new("e1", "e2", RelationKind::Before),
                    Relation::new("e2", "e1", RelationKind::After),
                ])
            }),
        )
    }

    fn runner(sieves: Vec<NamedSieve>) -> Arc<SieveRunner> {
        let names: Vec<String> = sieves.iter().map(|s| s.name().to_string()).collect();
        Arc::new(SieveRunner::new(PipelineConfig::with_sieves(names), sieves, NoClosure).unwrap())
    }

    fn docs(count: usize) -> Vec<SieveDocument> {
        (0..count).map(|i| SieveDocument::new(format!("doc{}", i))).collect()
    }

    /// Tracks the highest number of concurrent calls
    struct Gauge {
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Sieve for Gauge {
        fn annotate(
            &self,
            _document: &dyn Document,
            _accepted: &[Relation],
        ) -> Result<Vec<Relation>, SieveFault> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_documents_returned_in_order() {
        let worker = BatchWorker::new(runner(vec![pair_sieve()])).with_max_concurrent(3);

        let report = worker.run(docs(10)).await;

        assert!(report.is_success());
        let names: Vec<_> = report.documents.iter().map(|d| d.name.clone()).collect();
        let expected: Vec<_> = (0..10).map(|i| format!("doc{}", i)).collect();
        assert_eq!(names, expected);
        assert!(report.documents.iter().all(|d| d.relations.len() == 1));
    }

    #[tokio::test]
    async fn test_statistics_merged() {
        let worker = BatchWorker::new(runner(vec![pair_sieve()]));

        let report = worker.run(docs(5)).await;

        let counts = report.statistics.get(0).unwrap();
        assert_eq!(report.statistics.documents(), 5);
        assert_eq!(counts.proposed, 10);
        assert_eq!(counts.removed, 5);
    }

    #[tokio::test]
    async fn test_failure_isolated() {
        let sieve = sieve_fn(|doc: &dyn Document, _accepted: &[Relation]| {
            if doc.name() == "doc2" {
                Err(SieveFault::new("bad parse tree"))
            } else {
                Ok(vec![Relation::new("e1", "e2", RelationKind::Vague)])
            }
        });
        let worker = BatchWorker::new(runner(vec![NamedSieve::new("Picky", sieve)]));

        let report = worker.run(docs(4)).await;

        assert_eq!(report.documents.len(), 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].document(), Some("doc2"));
        assert!(report.documents[2].relations.is_empty());
        assert_eq!(report.documents[3].relations.len(), 1);
        assert_eq!(report.statistics.documents(), 3);
    }

    #[tokio::test]
    async fn test_panic_reported() {
        let sieve = sieve_fn(|doc: &dyn Document, _accepted: &[Relation]| {
            if doc.name() == "doc1" {
                panic!("sieve bug");
            }
            Ok(Vec::new())
        });
        let worker = BatchWorker::new(runner(vec![NamedSieve::new("Buggy", sieve)]));

        let report = worker.run(docs(3)).await;

        assert_eq!(report.documents.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], PipelineError::Worker(_)));
        assert_eq!(report.statistics.documents(), 2);
    }

    #[tokio::test]
    async fn test_concurrency_bounded() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let gauge = Gauge {
            current: Arc::clone(&current),
            peak: Arc::clone(&peak),
        };
        let worker = BatchWorker::new(runner(vec![NamedSieve::new("Gauge", gauge)]))
            .with_max_concurrent(2);

        let report = worker.run(docs(8)).await;

        assert!(report.is_success());
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_clamped() {
        let worker = BatchWorker::new(runner(vec![pair_sieve()])).with_max_concurrent(0);
        assert_eq!(worker.max_concurrent(), 1);

        let report = worker.run(docs(2)).await;
        assert_eq!(report.statistics.documents(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let worker = BatchWorker::new(runner(vec![pair_sieve()]));
        let report = worker.run(Vec::<SieveDocument>::new()).await;

        assert!(report.documents.is_empty());
        assert!(report.is_success());
    }
}
