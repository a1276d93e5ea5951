use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jenkins_config::Configuration;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::model::{Build, BuildResult, Job, JobHealth, StateSnapshot, leaf_name};
use crate::source::errors::TransportError;
use crate::source::traits::JobTransport;
use crate::source::types::{RawBuild, RawJob, TransportRequest};

/// Turns one transport call into a validated [`StateSnapshot`].
///
/// Holds no state between calls; two fetches with the same configuration are
/// independent and either may be retried.
#[derive(Clone)]
pub struct RemoteJobSource {
    transport: Arc<dyn JobTransport>,
}

impl RemoteJobSource {
    pub fn new(transport: Arc<dyn JobTransport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Blocking fetch. The engine runs it through [`Self::spawn_fetch`].
    pub fn fetch(&self, config: &Configuration) -> Result<StateSnapshot, TransportError> {
        let request = TransportRequest::from_config(config);

        debug!(
            event = "core.source.fetch_started",
            transport = self.transport.name(),
            server = %request.server_url
        );

        let raw = match self.transport.fetch_jobs(&request) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(
                    event = "core.source.fetch_failed",
                    transport = self.transport.name(),
                    kind = %error.kind(),
                    error = %error
                );
                return Err(error);
            }
        };

        let mut roots = raw
            .into_iter()
            .map(|job| convert_job(job, None))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|error| {
                warn!(
                    event = "core.source.conversion_failed",
                    transport = self.transport.name(),
                    error = %error
                );
            })?;

        if let Some(filter) = &request.job_filter {
            roots = apply_filter(roots, filter);
        }

        let snapshot = StateSnapshot::now(roots);
        info!(
            event = "core.source.fetch_completed",
            transport = self.transport.name(),
            jobs = snapshot.len(),
            broken = snapshot.broken_count()
        );
        Ok(snapshot)
    }

    /// Run [`Self::fetch`] on a blocking thread, giving up after the
    /// configured fetch timeout.
    pub async fn fetch_with_timeout(
        &self,
        config: &Configuration,
    ) -> Result<StateSnapshot, TransportError> {
        self.spawn_fetch(&Handle::current(), config).wait().await
    }

    /// Start [`Self::fetch`] on `runtime`'s blocking pool.
    ///
    /// The returned [`PendingFetch`] applies the fetch timeout when awaited.
    pub fn spawn_fetch(&self, runtime: &Handle, config: &Configuration) -> PendingFetch {
        let source = self.clone();
        let request_config = config.clone();
        let task = runtime.spawn_blocking(move || source.fetch(&request_config));
        PendingFetch {
            transport: self.transport.name(),
            timeout: config.fetch_timeout(),
            task,
        }
    }
}

/// A transport call running on the blocking pool.
///
/// A blocking call cannot be cancelled. Once the timeout expires the thread
/// keeps running until the transport returns, and [`Self::call_handle`] is
/// the only way to tell when it has.
pub struct PendingFetch {
    transport: &'static str,
    timeout: Duration,
    task: JoinHandle<Result<StateSnapshot, TransportError>>,
}

impl PendingFetch {
    /// Handle whose `is_finished()` reports when the transport call returned.
    pub fn call_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }

    /// Wait for the result. An expired timeout is reported as `Unreachable`
    /// and the late result is dropped.
    pub async fn wait(self) -> Result<StateSnapshot, TransportError> {
        match tokio::time::timeout(self.timeout, self.task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(TransportError::unreachable(format!(
                "fetch task failed: {}",
                join_error
            ))),
            Err(_) => {
                warn!(
                    event = "core.source.fetch_timed_out",
                    transport = self.transport,
                    timeout_secs = self.timeout.as_secs()
                );
                Err(TransportError::unreachable(format!(
                    "no response within {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

fn convert_job(raw: RawJob, parent: Option<&str>) -> Result<Job, TransportError> {
    let short = raw.name.trim();
    if short.is_empty() {
        return Err(TransportError::parse_failure(format!(
            "job at '{}' has an empty name",
            raw.url
        )));
    }

    let name = match (raw.full_name.as_deref().map(str::trim), parent) {
        (Some(full), _) if !full.is_empty() => full.to_string(),
        (_, Some(parent)) => format!("{}/{}", parent, short),
        (_, None) => short.to_string(),
    };

    let last_build = raw
        .last_build
        .map(|build| convert_build(build, &name))
        .transpose()?;

    let children = raw
        .jobs
        .into_iter()
        .map(|child| convert_job(child, Some(&name)))
        .collect::<Result<Vec<_>, _>>()?;

    let display_name = raw
        .display_name
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| leaf_name(&name).to_string());

    Ok(Job {
        name,
        display_name,
        url: raw.url,
        health: raw.color.as_deref().map(JobHealth::parse).unwrap_or_default(),
        last_build,
        children,
    })
}

fn convert_build(raw: RawBuild, job_name: &str) -> Result<Build, TransportError> {
    let number = u64::try_from(raw.number)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            TransportError::parse_failure(format!(
                "job '{}' reports invalid build number {}",
                job_name, raw.number
            ))
        })?;

    let mut build = Build::new(
        number,
        BuildResult::from_jenkins(raw.result.as_deref(), raw.building),
        raw.url,
    );
    if let Some(timestamp) = raw.timestamp_ms.and_then(DateTime::<Utc>::from_timestamp_millis) {
        build = build.with_timestamp(timestamp);
    }
    Ok(build)
}

/// Keep jobs named in `filter` by full or short name. A matching folder is
/// kept whole; otherwise a folder survives only with its matching descendants.
fn apply_filter(jobs: Vec<Job>, filter: &BTreeSet<String>) -> Vec<Job> {
    jobs.into_iter()
        .filter_map(|job| filter_job(job, filter))
        .collect()
}

fn filter_job(job: Job, filter: &BTreeSet<String>) -> Option<Job> {
    if filter.contains(&job.name) || filter.contains(leaf_name(&job.name)) {
        return Some(job);
    }
    let children = apply_filter(job.children, filter);
    if children.is_empty() {
        None
    } else {
        Some(Job { children, ..job })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedTransport {
        response: Mutex<Result<Vec<RawJob>, TransportError>>,
        seen: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        fn new(response: Result<Vec<RawJob>, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(response),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl JobTransport for ScriptedTransport {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn fetch_jobs(&self, request: &TransportRequest) -> Result<Vec<RawJob>, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.lock().unwrap().clone()
        }
    }

    fn raw_job(name: &str, number: i64, result: &str) -> RawJob {
        RawJob {
            name: name.to_string(),
            url: format!("https://ci/job/{}/", name),
            color: Some("blue".to_string()),
            last_build: Some(RawBuild {
                number,
                result: Some(result.to_string()),
                building: false,
                url: format!("https://ci/job/{}/{}/", name, number),
                timestamp_ms: Some(1_700_000_000_000),
            }),
            ..Default::default()
        }
    }

    fn folder(name: &str, jobs: Vec<RawJob>) -> RawJob {
        RawJob {
            name: name.to_string(),
            url: format!("https://ci/job/{}/", name),
            jobs,
            ..Default::default()
        }
    }

    fn config() -> Configuration {
        let mut config = Configuration::for_server("https://ci.example.com");
        config.auth_token = Some("secret".to_string());
        config
    }

    #[test]
    fn test_fetch_converts_jobs() {
        let transport = ScriptedTransport::new(Ok(vec![
            raw_job("api", 4, "FAILURE"),
            RawJob {
                name: "docs".to_string(),
                url: "https://ci/job/docs/".to_string(),
                ..Default::default()
            },
        ]));
        let source = RemoteJobSource::new(transport.clone());

        let snapshot = source.fetch(&config()).unwrap();
        assert_eq!(snapshot.len(), 2);

        let api = snapshot.get("api").unwrap();
        let build = api.last_build.as_ref().unwrap();
        assert_eq!(build.number, 4);
        assert_eq!(build.result, BuildResult::Failure);
        assert!(build.timestamp.is_some());
        assert_eq!(api.display_name, "api");
        assert!(snapshot.get("docs").unwrap().last_build.is_none());

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].server_url, "https://ci.example.com");
        assert_eq!(seen[0].auth_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_nested_names_are_qualified() {
        let transport = ScriptedTransport::new(Ok(vec![folder(
            "platform",
            vec![raw_job("deploy", 2, "SUCCESS")],
        )]));
        let snapshot = RemoteJobSource::new(transport).fetch(&config()).unwrap();

        assert!(snapshot.contains("platform"));
        let deploy = snapshot.get("platform/deploy").unwrap();
        assert_eq!(deploy.display_name, "deploy");
    }

    #[test]
    fn test_full_name_from_server_wins() {
        let mut job = raw_job("deploy", 2, "SUCCESS");
        job.full_name = Some("org/platform/deploy".to_string());
        let transport = ScriptedTransport::new(Ok(vec![folder("platform", vec![job])]));
        let snapshot = RemoteJobSource::new(transport).fetch(&config()).unwrap();
        assert!(snapshot.contains("org/platform/deploy"));
    }

    #[test]
    fn test_building_job_is_running() {
        let mut job = raw_job("api", 7, "SUCCESS");
        if let Some(build) = job.last_build.as_mut() {
            build.result = None;
            build.building = true;
        }
        let transport = ScriptedTransport::new(Ok(vec![job]));
        let snapshot = RemoteJobSource::new(transport).fetch(&config()).unwrap();
        assert_eq!(
            snapshot.get("api").unwrap().last_result(),
            Some(BuildResult::Running)
        );
    }

    #[test]
    fn test_empty_name_is_parse_failure() {
        let transport = ScriptedTransport::new(Ok(vec![raw_job("  ", 1, "SUCCESS")]));
        let error = RemoteJobSource::new(transport)
            .fetch(&config())
            .unwrap_err();
        assert!(matches!(error, TransportError::ParseFailure { .. }));
    }

    #[test]
    fn test_invalid_build_number_is_parse_failure() {
        let transport = ScriptedTransport::new(Ok(vec![raw_job("api", 0, "SUCCESS")]));
        let error = RemoteJobSource::new(transport)
            .fetch(&config())
            .unwrap_err();
        assert!(error.to_string().contains("invalid build number 0"));
    }

    #[test]
    fn test_transport_error_is_propagated() {
        let transport = ScriptedTransport::new(Err(TransportError::ServerRejected {
            status: 503,
            message: "Service Unavailable".to_string(),
        }));
        let error = RemoteJobSource::new(transport)
            .fetch(&config())
            .unwrap_err();
        assert_eq!(error.kind(), crate::source::TransportErrorKind::ServerRejected);
    }

    #[test]
    fn test_filter_keeps_named_jobs() {
        let transport = ScriptedTransport::new(Ok(vec![
            raw_job("api", 1, "SUCCESS"),
            raw_job("web", 1, "SUCCESS"),
            folder(
                "platform",
                vec![raw_job("deploy", 1, "SUCCESS"), raw_job("infra", 1, "SUCCESS")],
            ),
        ]));
        let mut config = config();
        config.job_filter = Some(["api".to_string(), "deploy".to_string()].into());

        let snapshot = RemoteJobSource::new(transport).fetch(&config).unwrap();
        let mut names: Vec<&str> = snapshot.names().collect();
        names.sort();
        assert_eq!(names, vec!["api", "platform", "platform/deploy"]);
    }

    #[test]
    fn test_filter_on_folder_keeps_it_whole() {
        let transport = ScriptedTransport::new(Ok(vec![folder(
            "platform",
            vec![raw_job("deploy", 1, "SUCCESS"), raw_job("infra", 1, "SUCCESS")],
        )]));
        let mut config = config();
        config.job_filter = Some(["platform".to_string()].into());

        let snapshot = RemoteJobSource::new(transport).fetch(&config).unwrap();
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_filter_matching_nothing_is_empty_snapshot() {
        let transport = ScriptedTransport::new(Ok(vec![raw_job("api", 1, "SUCCESS")]));
        let mut config = config();
        config.job_filter = Some(["missing".to_string()].into());
        let snapshot = RemoteJobSource::new(transport).fetch(&config).unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_with_timeout_returns_result() {
        let transport = ScriptedTransport::new(Ok(vec![raw_job("api", 1, "SUCCESS")]));
        let snapshot = RemoteJobSource::new(transport)
            .fetch_with_timeout(&config())
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    struct SlowTransport;

    impl JobTransport for SlowTransport {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn fetch_jobs(&self, _request: &TransportRequest) -> Result<Vec<RawJob>, TransportError> {
            std::thread::sleep(std::time::Duration::from_millis(1500));
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_fetch_with_timeout_expires() {
        let mut config = config();
        config.fetch_timeout_secs = 1;
        let error = RemoteJobSource::new(Arc::new(SlowTransport))
            .fetch_with_timeout(&config)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), crate::source::TransportErrorKind::Unreachable);
        assert!(error.to_string().contains("no response within 1s"));
    }

    #[tokio::test]
    async fn test_call_handle_outlives_timeout() {
        let mut config = config();
        config.fetch_timeout_secs = 1;
        let pending =
            RemoteJobSource::new(Arc::new(SlowTransport)).spawn_fetch(&Handle::current(), &config);
        let call = pending.call_handle();

        assert!(pending.wait().await.is_err());
        assert!(!call.is_finished());

        tokio::time::sleep(std::time::Duration::from_millis(1000)).await;
        assert!(call.is_finished());
    }
}
