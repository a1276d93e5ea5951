use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
    Success,
    Failure,
    Unstable,
    Aborted,
    Running,
    Unknown,
}

impl BuildResult {
    /// Interpret the `result` string and `building` flag Jenkins reports for a build.
    ///
    /// A build that is still running has no final result yet, whatever the
    /// result field says. `NOT_BUILT`, missing and unrecognised values are `Unknown`.
    pub fn from_jenkins(result: Option<&str>, building: bool) -> Self {
        if building {
            return BuildResult::Running;
        }
        match result.map(str::trim) {
            Some(r) if r.eq_ignore_ascii_case("SUCCESS") => BuildResult::Success,
            Some(r) if r.eq_ignore_ascii_case("FAILURE") => BuildResult::Failure,
            Some(r) if r.eq_ignore_ascii_case("UNSTABLE") => BuildResult::Unstable,
            Some(r) if r.eq_ignore_ascii_case("ABORTED") => BuildResult::Aborted,
            _ => BuildResult::Unknown,
        }
    }

    /// Terminal results never change once published for a build number.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildResult::Success
                | BuildResult::Failure
                | BuildResult::Unstable
                | BuildResult::Aborted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Failure => "FAILURE",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Aborted => "ABORTED",
            BuildResult::Running => "RUNNING",
            BuildResult::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Jenkins "ball" colour summarising a job's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobColor {
    Blue,
    Red,
    Yellow,
    Grey,
    Disabled,
    Aborted,
    NotBuilt,
}

/// Job colour plus whether Jenkins animates it (a build is in progress).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHealth {
    pub color: JobColor,
    pub animated: bool,
}

impl JobHealth {
    /// Parse a Jenkins colour string such as `blue`, `red_anime` or `notbuilt`.
    ///
    /// Unrecognised colours map to `Grey`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_ascii_lowercase();
        let (base, animated) = match raw.strip_suffix("_anime") {
            Some(base) => (base.to_string(), true),
            None => (raw, false),
        };
        let color = match base.as_str() {
            "blue" | "green" => JobColor::Blue,
            "red" => JobColor::Red,
            "yellow" => JobColor::Yellow,
            "disabled" => JobColor::Disabled,
            "aborted" => JobColor::Aborted,
            "notbuilt" | "nobuilt" => JobColor::NotBuilt,
            _ => JobColor::Grey,
        };
        Self { color, animated }
    }
}

impl Default for JobHealth {
    fn default() -> Self {
        Self {
            color: JobColor::Grey,
            animated: false,
        }
    }
}

/// One execution of a job.
///
/// Identity is `(job name, number)`. A terminal `result` for a given number
/// never changes on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub number: u64,
    pub result: BuildResult,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Build {
    pub fn new(number: u64, result: BuildResult, url: impl Into<String>) -> Self {
        Self {
            number,
            result,
            url: url.into(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A job on the server, possibly a folder holding nested jobs.
///
/// `name` is the folder-qualified full name (`platform/deploy`) and is the
/// identity used for diffing. The URL may change between polls; the name may not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub display_name: String,
    pub url: String,
    pub health: JobHealth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_build: Option<Build>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Job>,
}

impl Job {
    /// A job with no builds and no children. Display name defaults to the
    /// last path segment of `name`.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        let display_name = leaf_name(&name).to_string();
        Self {
            name,
            display_name,
            url: url.into(),
            health: JobHealth::default(),
            last_build: None,
            children: Vec::new(),
        }
    }

    pub fn with_last_build(mut self, build: Build) -> Self {
        self.last_build = Some(build);
        self
    }

    pub fn with_children(mut self, children: Vec<Job>) -> Self {
        self.children = children;
        self
    }

    pub fn is_folder(&self) -> bool {
        !self.children.is_empty()
    }

    /// Result of the latest build, if the job has ever been built.
    pub fn last_result(&self) -> Option<BuildResult> {
        self.last_build.as_ref().map(|b| b.result)
    }

    pub fn is_broken(&self) -> bool {
        self.last_result() == Some(BuildResult::Failure)
    }
}

/// Last `/`-separated segment of a full job name.
pub fn leaf_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
