//! Host-side collaborators the event pump drives.
//!
//! All calls arrive on the thread running the pump, one at a time.

use std::sync::Arc;

use crate::dispatch::types::BuildFailure;
use crate::model::StateSnapshot;
use crate::source::TransportErrorKind;

/// Surfaces failures to the user (balloons, toasts, terminal lines).
pub trait NotificationDispatcher: Send {
    fn on_build_failed(&mut self, failure: &BuildFailure);

    fn on_transport_error(&mut self, kind: TransportErrorKind, message: &str);
}

/// Rebuilds whatever tree or table view the host shows.
pub trait ViewModelProjector: Send {
    fn on_snapshot_updated(&mut self, snapshot: Arc<StateSnapshot>);
}

/// Compact broken-job indicator, used by the split layout.
pub trait StatusWidget: Send {
    fn update_broken_count(&mut self, broken: usize);
}
