use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use jenkins_config::{ConfigError, Configuration};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::diff::diff;
use crate::engine::errors::EngineError;
use crate::engine::types::{CycleOutcome, EngineEvent, EngineState, EngineStatus};
use crate::model::StateSnapshot;
use crate::source::{RemoteJobSource, TransportError};

#[derive(Debug, Clone, Copy)]
enum CycleTrigger {
    Start,
    Tick,
    Manual,
    Reconfigure,
}

impl CycleTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            CycleTrigger::Start => "start",
            CycleTrigger::Tick => "tick",
            CycleTrigger::Manual => "manual",
            CycleTrigger::Reconfigure => "reconfigure",
        }
    }
}

struct InFlight {
    generation: u64,
    task: JoinHandle<()>,
}

struct EngineCore {
    /// Last configuration that passed validation.
    config: Option<Configuration>,
    running: bool,
    state: EngineState,
    /// Bumped whenever in-flight work must be forgotten.
    generation: u64,
    cycles_completed: u64,
    in_flight: Option<InFlight>,
    /// Blocking transport call of the current generation. Outlives
    /// `in_flight` when the fetch timed out.
    transport_call: Option<AbortHandle>,
    previous: Option<Arc<StateSnapshot>>,
    schedule: Option<CancellationToken>,
}

impl EngineCore {
    /// Invalidate the in-flight cycle and cancel the tick schedule.
    fn retire(&mut self) {
        self.generation += 1;
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
            debug!(
                event = "core.engine.cycle_retired",
                generation = in_flight.generation
            );
        }
        // A retired call can no longer publish, so it no longer blocks new cycles.
        if let Some(call) = self.transport_call.take()
            && !call.is_finished()
        {
            debug!(event = "core.engine.transport_call_abandoned");
        }
        if let Some(schedule) = self.schedule.take() {
            schedule.cancel();
        }
    }

    fn halt(&mut self, error: &ConfigError) {
        self.retire();
        self.state = EngineState::Failed {
            reason: error.to_string(),
        };
        error!(
            event = "core.engine.configuration_rejected",
            error = %error
        );
    }
}

struct EngineInner {
    source: RemoteJobSource,
    runtime: Handle,
    events: mpsc::UnboundedSender<EngineEvent>,
    core: Mutex<EngineCore>,
}

impl EngineInner {
    fn lock(&self) -> MutexGuard<'_, EngineCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn trigger_cycle(inner: &Arc<EngineInner>, trigger: CycleTrigger) -> CycleOutcome {
        let mut core = inner.lock();

        let config = match (&core.config, core.running, &core.state) {
            (Some(config), true, state) if !state.is_failed() => config.clone(),
            _ => {
                debug!(
                    event = "core.engine.cycle_skipped",
                    trigger = trigger.as_str(),
                    reason = "inactive"
                );
                return CycleOutcome::SkippedInactive;
            }
        };

        if core.in_flight.is_some() {
            debug!(
                event = "core.engine.cycle_skipped",
                trigger = trigger.as_str(),
                reason = "cycle_in_flight"
            );
            return CycleOutcome::SkippedBusy;
        }

        if core
            .transport_call
            .as_ref()
            .is_some_and(|call| !call.is_finished())
        {
            debug!(
                event = "core.engine.cycle_skipped",
                trigger = trigger.as_str(),
                reason = "transport_busy"
            );
            return CycleOutcome::SkippedBusy;
        }

        let generation = core.generation;
        let fetch = inner.source.spawn_fetch(&inner.runtime, &config);
        let call = fetch.call_handle();
        let cycle = Arc::clone(inner);
        let task = inner.runtime.spawn(async move {
            let result = fetch.wait().await;
            cycle.complete_cycle(generation, result);
        });

        core.in_flight = Some(InFlight { generation, task });
        core.transport_call = Some(call);
        core.state = EngineState::Polling;
        debug!(
            event = "core.engine.cycle_started",
            trigger = trigger.as_str(),
            generation
        );
        CycleOutcome::Started { generation }
    }

    /// Apply a finished fetch. Publishing happens under the lock so events
    /// leave in cycle order and never after `stop` or `reconfigure` returns.
    fn complete_cycle(&self, generation: u64, result: Result<StateSnapshot, TransportError>) {
        let mut core = self.lock();

        let current = core
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation);
        if !current {
            debug!(
                event = "core.engine.stale_result_discarded",
                generation,
                current_generation = core.generation
            );
            return;
        }

        core.in_flight = None;
        core.state = EngineState::Idle;

        let event = match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let changes = diff(core.previous.as_deref(), &snapshot);
                core.previous = Some(Arc::clone(&snapshot));
                core.cycles_completed += 1;
                info!(
                    event = "core.engine.cycle_completed",
                    generation,
                    jobs = snapshot.len(),
                    changes = changes.len()
                );
                EngineEvent::SnapshotUpdated { snapshot, changes }
            }
            Err(error) => {
                warn!(
                    event = "core.engine.cycle_failed",
                    generation,
                    kind = %error.kind(),
                    error = %error
                );
                EngineEvent::TransportFailed { error }
            }
        };

        if self.events.send(event).is_err() {
            debug!(
                event = "core.engine.publish_skipped",
                reason = "receiver_dropped"
            );
        }
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(schedule) = core.schedule.take() {
            schedule.cancel();
        }
    }
}

fn spawn_schedule(inner: &Arc<EngineInner>, period: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let engine = Arc::downgrade(inner);

    inner.runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancelled.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(inner) = engine.upgrade() else { break };
                    EngineInner::trigger_cycle(&inner, CycleTrigger::Tick);
                }
            }
        }
        debug!(event = "core.engine.schedule_stopped");
    });

    token
}

/// Fetches on a fixed schedule, diffs each snapshot against the last one,
/// and publishes the result as an [`EngineEvent`].
///
/// Cloning yields another handle to the same engine. All methods are
/// synchronous and safe to call from any thread inside or outside the runtime.
#[derive(Clone)]
pub struct PollingEngine {
    inner: Arc<EngineInner>,
}

impl PollingEngine {
    /// Create a stopped engine. Cycles and the tick schedule run on `runtime`.
    pub fn new(
        source: RemoteJobSource,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let core = EngineCore {
            config: None,
            running: false,
            state: EngineState::Idle,
            generation: 0,
            cycles_completed: 0,
            in_flight: None,
            transport_call: None,
            previous: None,
            schedule: None,
        };
        let engine = Self {
            inner: Arc::new(EngineInner {
                source,
                runtime,
                events,
                core: Mutex::new(core),
            }),
        };
        (engine, receiver)
    }

    /// Validate `config`, poll immediately, and then once every poll interval.
    ///
    /// A rejected configuration leaves the engine `Failed` until a valid
    /// [`Self::reconfigure`]. Calling `start` on a running engine does nothing.
    pub fn start(&self, config: Configuration) -> Result<(), EngineError> {
        {
            let mut core = self.inner.lock();
            if core.running && !core.state.is_failed() {
                debug!(
                    event = "core.engine.start_skipped",
                    reason = "already_running"
                );
                return Ok(());
            }

            core.running = true;
            if let Err(error) = config.validate() {
                core.halt(&error);
                return Err(error.into());
            }

            if core
                .config
                .as_ref()
                .is_some_and(|old| old.targets_other_server(&config))
            {
                core.previous = None;
            }
            core.retire();
            core.state = EngineState::Idle;
            core.schedule = Some(spawn_schedule(&self.inner, config.poll_interval()));

            info!(
                event = "core.engine.start_completed",
                server = %config.server_url,
                interval_secs = config.poll_interval_secs,
                timeout_secs = config.fetch_timeout_secs,
                transport = self.inner.source.transport_name()
            );
            core.config = Some(config);
        }

        EngineInner::trigger_cycle(&self.inner, CycleTrigger::Start);
        Ok(())
    }

    /// Swap in a new configuration.
    ///
    /// Any in-flight cycle is forgotten and, when running, a fresh cycle
    /// starts at once. Pointing at another server drops the previous
    /// snapshot, so the next poll only reports additions.
    pub fn reconfigure(&self, config: Configuration) -> Result<(), EngineError> {
        let running = {
            let mut core = self.inner.lock();
            if let Err(error) = config.validate() {
                core.halt(&error);
                return Err(error.into());
            }

            if core
                .config
                .as_ref()
                .is_some_and(|old| old.targets_other_server(&config))
            {
                info!(
                    event = "core.engine.server_changed",
                    server = %config.server_url
                );
                core.previous = None;
            }

            core.retire();
            core.state = EngineState::Idle;
            if core.running {
                core.schedule = Some(spawn_schedule(&self.inner, config.poll_interval()));
            }

            info!(
                event = "core.engine.reconfigure_completed",
                server = %config.server_url,
                interval_secs = config.poll_interval_secs,
                running = core.running
            );
            core.config = Some(config);
            core.running
        };

        if running {
            EngineInner::trigger_cycle(&self.inner, CycleTrigger::Reconfigure);
        }
        Ok(())
    }

    /// Cancel the schedule. Nothing is published after this returns.
    pub fn stop(&self) {
        let mut core = self.inner.lock();
        if !core.running {
            return;
        }
        core.retire();
        core.running = false;
        core.state = EngineState::Idle;
        info!(
            event = "core.engine.stop_completed",
            cycles_completed = core.cycles_completed
        );
    }

    /// Run a cycle now unless one is already in flight.
    pub fn poll_now(&self) -> CycleOutcome {
        EngineInner::trigger_cycle(&self.inner, CycleTrigger::Manual)
    }

    pub fn state(&self) -> EngineState {
        self.inner.lock().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    /// The snapshot the next cycle will be diffed against.
    pub fn current_snapshot(&self) -> Option<Arc<StateSnapshot>> {
        self.inner.lock().previous.clone()
    }

    pub fn config(&self) -> Option<Configuration> {
        self.inner.lock().config.clone()
    }

    pub fn status(&self) -> EngineStatus {
        let core = self.inner.lock();
        EngineStatus {
            running: core.running,
            state: core.state.clone(),
            generation: core.generation,
            cycles_completed: core.cycles_completed,
            last_snapshot_at: core.previous.as_ref().map(|s| s.captured_at()),
        }
    }
}
