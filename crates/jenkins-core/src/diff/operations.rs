use tracing::debug;

use crate::diff::types::StatusChange;
use crate::model::{Build, Job, StateSnapshot};

/// Compute the changes between two consecutive snapshots.
///
/// Pure and total. With no previous snapshot every job is reported as
/// `JobAdded`, so the first poll never produces failure notifications.
///
/// Ordering: removals in previous-snapshot order, then additions and
/// transitions in next-snapshot order.
pub fn diff(previous: Option<&StateSnapshot>, next: &StateSnapshot) -> Vec<StatusChange> {
    let Some(previous) = previous else {
        return next.jobs().map(added).collect();
    };

    let mut changes: Vec<StatusChange> = previous
        .names()
        .filter(|name| !next.contains(name))
        .map(|name| StatusChange::JobRemoved {
            job: name.to_string(),
        })
        .collect();

    for job in next.jobs() {
        match previous.get(&job.name) {
            None => changes.push(added(job)),
            Some(before) => {
                if let Some(change) = compare(before, job) {
                    changes.push(change);
                }
            }
        }
    }

    changes
}

fn added(job: &Job) -> StatusChange {
    StatusChange::JobAdded {
        job: job.name.clone(),
        build: job.last_build.clone(),
    }
}

fn transition(job: &Job, before: Option<&Build>, after: &Build) -> StatusChange {
    StatusChange::BuildStatusChanged {
        job: job.name.clone(),
        build_number: after.number,
        build_url: after.url.clone(),
        previous: before.map(|b| b.result),
        new: after.result,
    }
}

/// Classify a job present in both snapshots. `None` means no change.
fn compare(before: &Job, after: &Job) -> Option<StatusChange> {
    match (&before.last_build, &after.last_build) {
        (None, None) => None,
        (None, Some(build)) => Some(transition(after, None, build)),
        (Some(old), None) => {
            debug!(
                event = "core.diff.history_reset",
                job = %after.name,
                previous_number = old.number,
                "Build history disappeared; treating job as new"
            );
            Some(added(after))
        }
        (Some(old), Some(new)) if new.number > old.number => {
            Some(transition(after, Some(old), new))
        }
        (Some(old), Some(new)) if new.number < old.number => {
            debug!(
                event = "core.diff.history_reset",
                job = %after.name,
                previous_number = old.number,
                new_number = new.number,
                "Build number went backwards; treating job as new"
            );
            Some(added(after))
        }
        (Some(old), Some(new)) => {
            // Same build number: only a non-terminal to terminal move counts.
            if !old.result.is_terminal() && new.result.is_terminal() {
                Some(transition(after, Some(old), new))
            } else {
                None
            }
        }
    }
}
