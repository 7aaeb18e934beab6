//! Gatekeeper error types

use thiserror::Error;
use tlink_domain::SieveFault;

/// Errors that can occur during gatekeeper operations
///
/// Rejected candidates are not errors; they are reported through
/// [`crate::MergeOutcome`]. Only collaborator faults surface here.
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// The closure oracle faulted
    #[error("Closure error: {0}")]
    Closure(#[source] SieveFault),
}
