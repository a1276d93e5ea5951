use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use jenkins_core::{Job, RemoteJobSource, StateSnapshot, WatchError};

use super::helpers::{require_curl, resolve_config};
use crate::color;
use crate::table::TableFormatter;

#[derive(Serialize)]
struct StatusReport<'a> {
    server: &'a str,
    captured_at: DateTime<Utc>,
    total: usize,
    broken: usize,
    jobs: &'a [Job],
}

impl<'a> StatusReport<'a> {
    fn new(server: &'a str, snapshot: &'a StateSnapshot) -> Self {
        Self {
            server,
            captured_at: snapshot.captured_at(),
            total: snapshot.len(),
            broken: snapshot.broken_count(),
            jobs: snapshot.roots(),
        }
    }
}

pub(crate) fn handle_status_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let config = resolve_config(matches)?;
    let transport = require_curl()?;

    info!(
        event = "cli.status_started",
        server = %config.server_url,
        json_output = json_output
    );

    // curl's --max-time bounds this call, so no runtime is needed.
    let source = RemoteJobSource::new(Arc::new(transport));
    let snapshot = match source.fetch(&config) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!(
                "{}",
                color::error(&format!("Could not fetch jobs from {}: {}", config.server_url, e))
            );
            error!(
                event = "cli.status_failed",
                error = %e,
                error_code = e.error_code()
            );
            return Err(e.into());
        }
    };

    if json_output {
        let report = StatusReport::new(&config.server_url, &snapshot);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if snapshot.is_empty() {
        println!("No jobs found on {}.", config.server_url);
    } else {
        println!(
            "{} {}",
            color::bold(&config.server_url),
            color::muted(&format!(
                "({} jobs, {} broken)",
                snapshot.len(),
                snapshot.broken_count()
            ))
        );
        TableFormatter::new(&snapshot).print_table();
    }

    info!(
        event = "cli.status_completed",
        jobs = snapshot.len(),
        broken = snapshot.broken_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jenkins_core::{Build, BuildResult};

    #[test]
    fn test_status_report_json_shape() {
        let snapshot = StateSnapshot::now(vec![
            Job::new("api", "https://ci/job/api/").with_last_build(Build::new(
                4,
                BuildResult::Failure,
                "https://ci/job/api/4/",
            )),
            Job::new("docs", "https://ci/job/docs/"),
        ]);
        let report = StatusReport::new("https://ci", &snapshot);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["server"], "https://ci");
        assert_eq!(value["total"], 2);
        assert_eq!(value["broken"], 1);
        assert_eq!(value["jobs"][0]["name"], "api");
        assert_eq!(value["jobs"][0]["last_build"]["result"], "failure");
        assert!(value["jobs"][1].get("last_build").is_none());
    }
}
