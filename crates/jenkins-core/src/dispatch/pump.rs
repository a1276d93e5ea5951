use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dispatch::layout::LayoutStrategy;
use crate::dispatch::traits::ViewModelProjector;
use crate::engine::EngineEvent;

/// Delivers engine events to the host's collaborators on one thread.
///
/// Per `SnapshotUpdated`: the projector first, then the layout (widget
/// refresh and failure notifications). Per `TransportFailed`: one
/// transport-error notification.
pub struct EventPump {
    events: mpsc::UnboundedReceiver<EngineEvent>,
    layout: LayoutStrategy,
    projector: Box<dyn ViewModelProjector>,
}

impl EventPump {
    pub fn new(
        events: mpsc::UnboundedReceiver<EngineEvent>,
        layout: LayoutStrategy,
        projector: Box<dyn ViewModelProjector>,
    ) -> Self {
        Self {
            events,
            layout,
            projector,
        }
    }

    pub fn dispatch(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::SnapshotUpdated { snapshot, changes } => {
                self.projector.on_snapshot_updated(snapshot.clone());
                let notified = self.layout.handle_snapshot(&snapshot, &changes);
                debug!(
                    event = "core.dispatch.snapshot_dispatched",
                    changes = changes.len(),
                    notified
                );
            }
            EngineEvent::TransportFailed { error } => {
                self.layout.handle_transport_error(&error);
            }
        }
    }

    /// Dispatch everything already queued without waiting. For hosts that
    /// drive their own UI loop.
    pub fn drain_pending(&mut self) -> usize {
        let mut dispatched = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.dispatch(event);
                    dispatched += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        dispatched
    }

    /// Dispatch until the engine side closes or `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(event = "core.dispatch.pump_started", layout = %self.layout.mode());
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
            }
        }
        info!(event = "core.dispatch.pump_stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::StatusChange;
    use crate::dispatch::traits::{NotificationDispatcher, StatusWidget};
    use crate::dispatch::types::BuildFailure;
    use crate::model::{Build, BuildResult, Job, StateSnapshot};
    use crate::source::{TransportError, TransportErrorKind};
    use jenkins_config::LayoutMode;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, entry: String) {
            self.0.lock().unwrap().push(entry);
        }
    }

    impl NotificationDispatcher for Log {
        fn on_build_failed(&mut self, failure: &BuildFailure) {
            self.push(format!("notify {}", failure.message()));
        }

        fn on_transport_error(&mut self, kind: TransportErrorKind, _message: &str) {
            self.push(format!("error {}", kind));
        }
    }

    impl ViewModelProjector for Log {
        fn on_snapshot_updated(&mut self, snapshot: Arc<StateSnapshot>) {
            self.push(format!("view {}", snapshot.len()));
        }
    }

    impl StatusWidget for Log {
        fn update_broken_count(&mut self, broken: usize) {
            self.push(format!("widget {}", broken));
        }
    }

    fn pump(mode: LayoutMode) -> (EventPump, mpsc::UnboundedSender<EngineEvent>, Log) {
        let log = Log::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let layout =
            LayoutStrategy::for_layout(mode, Box::new(log.clone()), Box::new(log.clone()));
        (EventPump::new(rx, layout, Box::new(log.clone())), tx, log)
    }

    fn failing_update() -> EngineEvent {
        let snapshot = StateSnapshot::now(vec![
            Job::new("api", "https://ci/job/api/")
                .with_last_build(Build::new(4, BuildResult::Failure, "https://ci/job/api/4/")),
            Job::new("web", "https://ci/job/web/"),
        ]);
        EngineEvent::SnapshotUpdated {
            snapshot: Arc::new(snapshot),
            changes: vec![StatusChange::BuildStatusChanged {
                job: "api".to_string(),
                build_number: 4,
                build_url: "https://ci/job/api/4/".to_string(),
                previous: Some(BuildResult::Success),
                new: BuildResult::Failure,
            }],
        }
    }

    #[test]
    fn test_drain_pending_dispatches_in_order() {
        let (mut pump, tx, log) = pump(LayoutMode::Split);
        tx.send(failing_update()).unwrap();
        tx.send(EngineEvent::TransportFailed {
            error: TransportError::unreachable("refused"),
        })
        .unwrap();

        assert_eq!(pump.drain_pending(), 2);
        assert_eq!(
            log.entries(),
            vec![
                "view 2",
                "widget 1",
                "notify api#4: FAILED",
                "error unreachable"
            ]
        );
        assert_eq!(pump.drain_pending(), 0);
    }

    #[test]
    fn test_single_layout_skips_widget() {
        let (mut pump, tx, log) = pump(LayoutMode::Single);
        tx.send(failing_update()).unwrap();
        pump.drain_pending();
        assert_eq!(log.entries(), vec!["view 2", "notify api#4: FAILED"]);
    }

    #[tokio::test]
    async fn test_run_stops_when_engine_side_closes() {
        let (pump, tx, log) = pump(LayoutMode::Single);
        tx.send(failing_update()).unwrap();
        drop(tx);
        pump.run(CancellationToken::new()).await;
        assert_eq!(log.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (pump, _tx, log) = pump(LayoutMode::Single);
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        pump.run(shutdown).await;
        assert!(log.entries().is_empty());
    }
}
