use jenkins_config::LayoutMode;
use tracing::debug;

use crate::diff::StatusChange;
use crate::dispatch::traits::{NotificationDispatcher, StatusWidget};
use crate::dispatch::types::{BuildFailure, NotificationAnchor};
use crate::model::StateSnapshot;
use crate::source::TransportError;

/// How status changes reach the user, chosen once from [`LayoutMode`].
pub enum LayoutStrategy {
    /// Notifications anchored to the main view. No widget.
    Single {
        notifier: Box<dyn NotificationDispatcher>,
    },
    /// Notifications anchored to the status widget, which is refreshed after
    /// every snapshot.
    Split {
        notifier: Box<dyn NotificationDispatcher>,
        widget: Box<dyn StatusWidget>,
    },
}

impl LayoutStrategy {
    /// `widget` is dropped for [`LayoutMode::Single`].
    pub fn for_layout(
        mode: LayoutMode,
        notifier: Box<dyn NotificationDispatcher>,
        widget: Box<dyn StatusWidget>,
    ) -> Self {
        match mode {
            LayoutMode::Single => LayoutStrategy::Single { notifier },
            LayoutMode::Split => LayoutStrategy::Split { notifier, widget },
        }
    }

    pub fn mode(&self) -> LayoutMode {
        match self {
            LayoutStrategy::Single { .. } => LayoutMode::Single,
            LayoutStrategy::Split { .. } => LayoutMode::Split,
        }
    }

    pub fn anchor(&self) -> NotificationAnchor {
        match self {
            LayoutStrategy::Single { .. } => NotificationAnchor::ToolWindow,
            LayoutStrategy::Split { .. } => NotificationAnchor::StatusWidget,
        }
    }

    /// Returns the number of failure notifications sent.
    pub fn handle_snapshot(&mut self, snapshot: &StateSnapshot, changes: &[StatusChange]) -> usize {
        let anchor = self.anchor();
        if let LayoutStrategy::Split { widget, .. } = self {
            widget.update_broken_count(snapshot.broken_count());
        }

        let notifier = self.notifier();
        let mut sent = 0;
        for failure in changes
            .iter()
            .filter_map(|change| BuildFailure::from_change(change, anchor))
        {
            debug!(
                event = "core.dispatch.failure_notified",
                job = %failure.job_name,
                build_number = failure.build_number
            );
            notifier.on_build_failed(&failure);
            sent += 1;
        }
        sent
    }

    pub fn handle_transport_error(&mut self, error: &TransportError) {
        self.notifier()
            .on_transport_error(error.kind(), &error.to_string());
    }

    fn notifier(&mut self) -> &mut Box<dyn NotificationDispatcher> {
        match self {
            LayoutStrategy::Single { notifier } | LayoutStrategy::Split { notifier, .. } => notifier,
        }
    }
}
