use serde::Serialize;

use crate::diff::StatusChange;

/// Where the host should anchor a failure notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAnchor {
    ToolWindow,
    StatusWidget,
}

/// A build that just moved into `FAILURE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFailure {
    pub job_name: String,
    pub build_number: u64,
    pub build_url: String,
    pub anchor: NotificationAnchor,
}

impl BuildFailure {
    /// `None` unless `change` is a transition into failure.
    pub fn from_change(change: &StatusChange, anchor: NotificationAnchor) -> Option<Self> {
        if !change.is_new_failure() {
            return None;
        }
        match change {
            StatusChange::BuildStatusChanged {
                job,
                build_number,
                build_url,
                ..
            } => Some(Self {
                job_name: job.clone(),
                build_number: *build_number,
                build_url: build_url.clone(),
                anchor,
            }),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        format_failure_message(&self.job_name, self.build_number)
    }
}

/// Notification text for a failed build: `<job>#<number>: FAILED`.
pub fn format_failure_message(job_name: &str, build_number: u64) -> String {
    format!("{}#{}: FAILED", job_name, build_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BuildResult;

    #[test]
    fn test_format_failure_message() {
        assert_eq!(format_failure_message("api", 42), "api#42: FAILED");
        assert_eq!(
            format_failure_message("platform/deploy", 7),
            "platform/deploy#7: FAILED"
        );
    }

    #[test]
    fn test_from_change_only_for_new_failures() {
        let failing = StatusChange::BuildStatusChanged {
            job: "api".to_string(),
            build_number: 4,
            build_url: "https://ci/job/api/4/".to_string(),
            previous: Some(BuildResult::Success),
            new: BuildResult::Failure,
        };
        let failure = BuildFailure::from_change(&failing, NotificationAnchor::ToolWindow).unwrap();
        assert_eq!(failure.message(), "api#4: FAILED");
        assert_eq!(failure.build_url, "https://ci/job/api/4/");

        let fixed = StatusChange::BuildStatusChanged {
            job: "api".to_string(),
            build_number: 5,
            build_url: "https://ci/job/api/5/".to_string(),
            previous: Some(BuildResult::Failure),
            new: BuildResult::Success,
        };
        assert!(BuildFailure::from_change(&fixed, NotificationAnchor::ToolWindow).is_none());

        let removed = StatusChange::JobRemoved {
            job: "api".to_string(),
        };
        assert!(BuildFailure::from_change(&removed, NotificationAnchor::StatusWidget).is_none());
    }
}
