//! Jenkins REST transport that shells out to `curl`.

use std::io::Write;
use std::process::{Child, Command, Stdio};

use serde::Deserialize;
use tracing::{debug, warn};

use jenkins_core::{JobTransport, RawBuild, RawJob, TransportError, TransportRequest};

/// Folder levels requested in one call. Folders at the last level arrive
/// without their children; see [`folders_beyond_depth`].
const TREE_DEPTH: usize = 3;

/// Fields requested for every job, excluding nested `jobs`.
const JOB_FIELDS: &str =
    "name,fullName,displayName,url,color,lastBuild[number,result,building,url,timestamp]";

/// Separates the body from the status code appended by `--write-out`.
const STATUS_MARKER: &str = "\n__JENKINS_WATCH_HTTP_STATUS__:";

pub struct CurlTransport;

impl CurlTransport {
    pub fn is_available(&self) -> bool {
        which::which("curl").is_ok()
    }
}

impl JobTransport for CurlTransport {
    fn name(&self) -> &'static str {
        "curl"
    }

    fn fetch_jobs(&self, request: &TransportRequest) -> Result<Vec<RawJob>, TransportError> {
        if !self.is_available() {
            return Err(TransportError::unreachable("curl not found on PATH"));
        }

        let url = jobs_url(&request.server_url);
        debug!(event = "cli.transport.request_started", url = %url);

        // Credentials go through stdin so they never show up in `ps`.
        let mut child = Command::new("curl")
            .args(["--silent", "--show-error", "--globoff", "--location"])
            .arg("--max-time")
            .arg(request.timeout.as_secs().max(1).to_string())
            .arg("--write-out")
            .arg(format!("{}%{{http_code}}", STATUS_MARKER))
            .args(["--config", "-"])
            .arg(&url)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TransportError::unreachable(format!("failed to run curl: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let config = curl_auth_config(request.auth_token.as_deref());
            if let Err(e) = stdin.write_all(config.as_bytes()) {
                reap(&mut child);
                return Err(TransportError::unreachable(format!(
                    "failed to pass credentials to curl: {}",
                    e
                )));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| TransportError::unreachable(format!("curl did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            warn!(
                event = "cli.transport.request_failed",
                exit_code = code,
                stderr = %stderr.trim()
            );
            return Err(curl_failure(code, stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (body, status) = split_status(&stdout)?;
        if status >= 400 {
            return Err(TransportError::ServerRejected {
                status,
                message: rejection_message(status),
            });
        }

        let jobs = parse_jobs(body)?;
        debug!(
            event = "cli.transport.request_completed",
            status,
            root_jobs = jobs.len()
        );
        Ok(jobs)
    }
}

/// Kill and wait on a curl process we are giving up on.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(event = "cli.transport.kill_failed", error = %e);
    }
    if let Err(e) = child.wait() {
        warn!(event = "cli.transport.wait_failed", error = %e);
    }
}

fn jobs_url(server_url: &str) -> String {
    format!(
        "{}/api/json?tree={}",
        server_url.trim_end_matches('/'),
        tree_query(TREE_DEPTH)
    )
}

/// `jobs[<fields>,jobs[<fields>,...]]` nested `depth` levels.
fn tree_query(depth: usize) -> String {
    let mut query = format!("jobs[{}]", JOB_FIELDS);
    for _ in 1..depth {
        query = format!("jobs[{},{}]", JOB_FIELDS, query);
    }
    query
}

/// A token of the form `user:apitoken` is sent as basic auth; anything
/// else as a bearer token.
fn curl_auth_config(token: Option<&str>) -> String {
    match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) if token.contains(':') => format!("user = \"{}\"\n", escape_config(token)),
        Some(token) => format!(
            "header = \"Authorization: Bearer {}\"\n",
            escape_config(token)
        ),
        None => String::new(),
    }
}

fn escape_config(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn curl_failure(exit_code: i32, stderr: &str) -> TransportError {
    let reason = match exit_code {
        6 => "could not resolve host",
        7 => "connection refused",
        28 => "request timed out",
        35 | 60 => "TLS handshake failed",
        52 => "empty reply from server",
        56 => "connection reset",
        _ => "request failed",
    };
    let message = if stderr.is_empty() {
        format!("{} (curl exit {})", reason, exit_code)
    } else {
        format!("{} (curl exit {}): {}", reason, exit_code, stderr)
    };
    TransportError::unreachable(message)
}

fn rejection_message(status: u16) -> String {
    match status {
        401 => "authentication required; check the auth token".to_string(),
        403 => "access denied for the configured credentials".to_string(),
        404 => "no Jenkins API at this URL".to_string(),
        500..=599 => "server error".to_string(),
        _ => "request rejected".to_string(),
    }
}

fn split_status(output: &str) -> Result<(&str, u16), TransportError> {
    let (body, status) = output
        .rsplit_once(STATUS_MARKER)
        .ok_or_else(|| TransportError::parse_failure("curl output has no HTTP status"))?;
    let status = status.trim().parse::<u16>().map_err(|_| {
        TransportError::parse_failure(format!("unexpected HTTP status '{}'", status.trim()))
    })?;
    Ok((body, status))
}

#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    jobs: Vec<ApiJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiJob {
    #[serde(rename = "_class")]
    class: Option<String>,
    name: String,
    full_name: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    url: String,
    color: Option<String>,
    last_build: Option<ApiBuild>,
    #[serde(default)]
    jobs: Vec<ApiJob>,
}

#[derive(Debug, Deserialize)]
struct ApiBuild {
    number: i64,
    result: Option<String>,
    #[serde(default)]
    building: bool,
    #[serde(default)]
    url: String,
    timestamp: Option<i64>,
}

impl ApiJob {
    /// Folders, organization folders and multibranch projects hold jobs.
    fn is_container(&self) -> bool {
        self.class
            .as_deref()
            .is_some_and(|class| class.ends_with("Folder") || class.contains("MultiBranch"))
    }
}

/// Containers at level `max_depth` whose children were not requested.
fn folders_beyond_depth(jobs: &[ApiJob], max_depth: usize) -> Vec<String> {
    fn walk(jobs: &[ApiJob], level: usize, max_depth: usize, found: &mut Vec<String>) {
        for job in jobs {
            if level == max_depth {
                if job.is_container() {
                    found.push(job.full_name.clone().unwrap_or_else(|| job.name.clone()));
                }
            } else {
                walk(&job.jobs, level + 1, max_depth, found);
            }
        }
    }

    let mut found = Vec::new();
    walk(jobs, 1, max_depth, &mut found);
    found
}

impl From<ApiJob> for RawJob {
    fn from(job: ApiJob) -> Self {
        RawJob {
            name: job.name,
            full_name: job.full_name,
            display_name: job.display_name,
            url: job.url,
            color: job.color,
            last_build: job.last_build.map(RawBuild::from),
            jobs: job.jobs.into_iter().map(RawJob::from).collect(),
        }
    }
}

impl From<ApiBuild> for RawBuild {
    fn from(build: ApiBuild) -> Self {
        RawBuild {
            number: build.number,
            result: build.result,
            building: build.building,
            url: build.url,
            timestamp_ms: build.timestamp,
        }
    }
}

fn parse_jobs(body: &str) -> Result<Vec<RawJob>, TransportError> {
    let root: ApiRoot = serde_json::from_str(body)
        .map_err(|e| TransportError::parse_failure(format!("invalid Jenkins JSON: {}", e)))?;

    let truncated = folders_beyond_depth(&root.jobs, TREE_DEPTH);
    if !truncated.is_empty() {
        warn!(
            event = "cli.transport.tree_truncated",
            depth = TREE_DEPTH,
            folders = %truncated.join(", ")
        );
    }

    Ok(root.jobs.into_iter().map(RawJob::from).collect())
}
