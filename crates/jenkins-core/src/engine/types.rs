use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diff::StatusChange;
use crate::model::StateSnapshot;
use crate::source::TransportError;

/// Lifecycle position of the polling engine.
///
/// `Failed` is only entered for configuration errors found before any I/O.
/// Transport failures leave the engine `Idle` until the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Polling,
    Failed { reason: String },
}

impl EngineState {
    pub fn is_failed(&self) -> bool {
        matches!(self, EngineState::Failed { .. })
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => f.write_str("idle"),
            EngineState::Polling => f.write_str("polling"),
            EngineState::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Published by the engine, in cycle order, for the host to dispatch.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    SnapshotUpdated {
        snapshot: Arc<StateSnapshot>,
        changes: Vec<StatusChange>,
    },
    TransportFailed {
        error: TransportError,
    },
}

/// What [`crate::engine::PollingEngine::poll_now`] did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Started { generation: u64 },
    /// Another cycle is still in flight.
    SkippedBusy,
    /// Not started, stopped, or halted by a rejected configuration.
    SkippedInactive,
}

/// Point-in-time view of the engine for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub running: bool,
    #[serde(flatten)]
    pub state: EngineState,
    pub generation: u64,
    pub cycles_completed: u64,
    pub last_snapshot_at: Option<DateTime<Utc>>,
}
