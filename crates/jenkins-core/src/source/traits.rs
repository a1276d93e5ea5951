//! Transport trait definition.

use crate::source::errors::TransportError;
use crate::source::types::{RawJob, TransportRequest};

/// Host-provided access to a Jenkins server.
///
/// Implementations own the wire format (REST, RSS, a CLI tool) and translate
/// it into [`RawJob`] trees. Calls block; the engine runs them on a blocking
/// thread under its own timeout. Every call must be independent and safe to retry.
pub trait JobTransport: Send + Sync {
    /// Short identifier used in logs (e.g. "curl", "mock").
    fn name(&self) -> &'static str;

    /// Fetch the job tree with each job's latest build.
    ///
    /// Transports may ignore `request.job_filter`; the source re-applies it.
    fn fetch_jobs(&self, request: &TransportRequest) -> Result<Vec<RawJob>, TransportError>;
}
