//! Error types for sieve pipeline operations

use std::path::PathBuf;
use thiserror::Error;
use tlink_domain::SieveFault;

/// Errors that can occur while building or running the sieve pipeline
///
/// Rejected relations are never errors. A sieve or closure fault aborts the
/// document it happened on and is reported with the document's name.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A sieve faulted while annotating a document
    #[error("Sieve '{sieve}' failed on document '{document}': {source}")]
    SieveExecution {
        /// Name of the document being processed
        document: String,
        /// Identifier of the sieve that faulted
        sieve: String,
        /// The fault raised by the sieve
        #[source]
        source: SieveFault,
    },

    /// The closure oracle faulted
    #[error("Closure after sieve '{after_sieve}' failed on document '{document}': {source}")]
    ClosureExecution {
        /// Name of the document being processed
        document: String,
        /// Identifier of the sieve whose output was being closed
        after_sieve: String,
        /// The fault raised by the oracle
        #[source]
        source: SieveFault,
    },

    /// A registered sieve factory failed to build its sieve
    #[error("Sieve '{sieve}' could not be created: {source}")]
    SieveInit {
        /// Identifier of the sieve
        sieve: String,
        /// The fault raised by the factory
        #[source]
        source: SieveFault,
    },

    /// A configured sieve identifier is not registered
    #[error("Unknown sieve: {0}")]
    UnknownSieve(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a configuration or sieve-list file failed
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Batch worker error (task panicked or runtime issue)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Name of the document the error aborted, if it is document-specific
    pub fn document(&self) -> Option<&str> {
        match self {
            PipelineError::SieveExecution { document, .. }
            | PipelineError::ClosureExecution { document, .. } => Some(document),
            _ => None,
        }
    }

    /// Identifier of the sieve involved, if any
    pub fn sieve(&self) -> Option<&str> {
        match self {
            PipelineError::SieveExecution { sieve, .. }
            | PipelineError::SieveInit { sieve, .. } => Some(sieve),
            PipelineError::ClosureExecution { after_sieve, .. } => Some(after_sieve),
            PipelineError::UnknownSieve(sieve) => Some(sieve),
            _ => None,
        }
    }
}
