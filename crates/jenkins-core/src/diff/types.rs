use serde::Serialize;

use crate::model::{Build, BuildResult};

/// One difference between two consecutive snapshots.
///
/// Jobs that did not change produce no value at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusChange {
    /// Job appeared, or its history was reset (build number went backwards).
    JobAdded { job: String, build: Option<Build> },
    /// Job no longer visible on the server.
    JobRemoved { job: String },
    /// The job's latest build moved to a new number or finished.
    BuildStatusChanged {
        job: String,
        build_number: u64,
        build_url: String,
        /// `None` when the job had never been built before.
        previous: Option<BuildResult>,
        new: BuildResult,
    },
}

impl StatusChange {
    pub fn job_name(&self) -> &str {
        match self {
            StatusChange::JobAdded { job, .. }
            | StatusChange::JobRemoved { job }
            | StatusChange::BuildStatusChanged { job, .. } => job,
        }
    }

    /// A transition into `FAILURE` from anything else. Drives failure notifications.
    pub fn is_new_failure(&self) -> bool {
        matches!(
            self,
            StatusChange::BuildStatusChanged {
                previous,
                new: BuildResult::Failure,
                ..
            } if *previous != Some(BuildResult::Failure)
        )
    }
}
