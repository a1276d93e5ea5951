pub mod snapshot;
pub mod types;

pub use snapshot::StateSnapshot;
pub use types::{Build, BuildResult, Job, JobColor, JobHealth, leaf_name};
