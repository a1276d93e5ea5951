//! jenkins-core: Polling engine for Jenkins job status
//!
//! Fetches job/build state from a Jenkins server on a fixed schedule,
//! diffs each snapshot against the previous one, and publishes the
//! resulting status changes to host-side collaborators.
//!
//! # Main Entry Points
//!
//! - [`engine`] - Start, stop, and reconfigure the polling schedule
//! - [`source`] - Transport seam and snapshot construction
//! - [`diff`] - Pure snapshot comparison
//! - [`dispatch`] - Deliver engine events to notification and view code

pub mod diff;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod model;
pub mod source;

pub use diff::{StatusChange, diff};
pub use dispatch::{
    BuildFailure, EventPump, LayoutStrategy, NotificationAnchor, NotificationDispatcher,
    StatusWidget, ViewModelProjector, format_failure_message,
};
pub use engine::{CycleOutcome, EngineError, EngineEvent, EngineState, EngineStatus, PollingEngine};
pub use errors::WatchError;
pub use model::{Build, BuildResult, Job, JobColor, JobHealth, StateSnapshot};
pub use source::{
    JobTransport, PendingFetch, RawBuild, RawJob, RemoteJobSource, TransportError,
    TransportErrorKind, TransportRequest,
};

// Re-export config types from jenkins-config
pub use jenkins_config::{ConfigError, Configuration, LayoutMode};

// Re-export logging initialization
pub use logging::init_logging;
