//! Per-sieve statistics for pipeline runs

use serde::Serialize;

/// Counters for one sieve slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SieveCounts {
    /// Sieve identifier
    pub name: String,

    /// Relations the sieve proposed
    pub proposed: usize,

    /// Proposals dropped as invalid, duplicate or conflicting
    pub removed: usize,

    /// Relations closure added after this sieve
    pub closure_added: usize,
}

impl SieveCounts {
    /// Proposals that were accepted
    pub fn accepted(&self) -> usize {
        self.proposed.saturating_sub(self.removed)
    }
}

/// Statistics collected during sieve runs
///
/// One slot per configured sieve, in pipeline order. Accumulated across
/// documents; worker-local statistics are combined with [`merge`](Self::merge).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SieveStatistics {
    slots: Vec<SieveCounts>,
    documents: usize,
}

impl SieveStatistics {
    /// Create zeroed statistics for the given sieves
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: names
                .into_iter()
                .map(|name| SieveCounts {
                    name: name.into(),
                    ..Default::default()
                })
                .collect(),
            documents: 0,
        }
    }

    /// Record proposals from the sieve in `slot`
    pub fn add_proposed(&mut self, slot: usize, count: usize) {
        if let Some(counts) = self.slots.get_mut(slot) {
            counts.proposed += count;
        }
    }

    /// Record dropped proposals from the sieve in `slot`
    pub fn add_removed(&mut self, slot: usize, count: usize) {
        if let Some(counts) = self.slots.get_mut(slot) {
            counts.removed += count;
        }
    }

    /// Record closure additions following the sieve in `slot`
    pub fn add_closure_added(&mut self, slot: usize, count: usize) {
        if let Some(counts) = self.slots.get_mut(slot) {
            counts.closure_added += count;
        }
    }

    /// Record a fully processed document
    pub fn record_document(&mut self) {
        self.documents += 1;
    }

    /// Number of documents processed
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Counters in pipeline order
    pub fn report(&self) -> &[SieveCounts] {
        &self.slots
    }

    /// Counters for the sieve in `slot`
    pub fn get(&self, slot: usize) -> Option<&SieveCounts> {
        self.slots.get(slot)
    }

    /// Counters for the first slot with this sieve name
    pub fn by_name(&self, name: &str) -> Option<&SieveCounts> {
        self.slots.iter().find(|c| c.name == name)
    }

    /// Total proposals across all sieves
    pub fn total_proposed(&self) -> usize {
        self.slots.iter().map(|c| c.proposed).sum()
    }

    /// Total dropped proposals across all sieves
    pub fn total_removed(&self) -> usize {
        self.slots.iter().map(|c| c.removed).sum()
    }

    /// Total closure additions across all sieves
    pub fn total_closure_added(&self) -> usize {
        self.slots.iter().map(|c| c.closure_added).sum()
    }

    /// Add another run's counters slot by slot
    ///
    /// Both sides must come from the same pipeline; slots missing on this side
    /// are appended.
    pub fn merge(&mut self, other: &SieveStatistics) {
        for (slot, theirs) in other.slots.iter().enumerate() {
            match self.slots.get_mut(slot) {
                Some(ours) => {
                    ours.proposed += theirs.proposed;
                    ours.removed += theirs.removed;
                    ours.closure_added += theirs.closure_added;
                }
                None => self.slots.push(theirs.clone()),
            }
        }
        self.documents += other.documents;
    }

    /// Zero all counters, keeping the sieve slots
    pub fn reset(&mut self) {
        for counts in &mut self.slots {
            counts.proposed = 0;
            counts.removed = 0;
            counts.closure_added = 0;
        }
        self.documents = 0;
    }

    /// Generate a summary report of the statistics
    pub fn summary(&self) -> String {
        let width = self
            .slots
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("Sieve".len());

        let mut lines = vec![
            "Sieve Statistics Summary".to_string(),
            "========================".to_string(),
            format!("Documents: {}", self.documents),
            String::new(),
            format!(
                "{:<width$}  {:>8}  {:>8}  {:>8}",
                "Sieve", "proposed", "removed", "closure"
            ),
        ];

        for counts in &self.slots {
            lines.push(format!(
                "{:<width$}  {:>8}  {:>8}  {:>8}",
                counts.name, counts.proposed, counts.removed, counts.closure_added
            ));
        }

        lines.push(format!(
            "{:<width$}  {:>8}  {:>8}  {:>8}",
            "Total",
            self.total_proposed(),
            self.total_removed(),
            self.total_closure_added()
        ));

        lines.join("\n")
    }
}
