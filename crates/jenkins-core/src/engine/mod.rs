pub mod errors;
pub mod poller;
pub mod types;

pub use errors::EngineError;
pub use poller::PollingEngine;
pub use types::{CycleOutcome, EngineEvent, EngineState, EngineStatus};
