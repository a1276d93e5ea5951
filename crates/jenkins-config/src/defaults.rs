/// Poll interval used when no config file or flag sets one.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Hard timeout for a single fetch when none is configured.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Environment variable consulted for the auth token when no config file sets one.
pub const TOKEN_ENV_VAR: &str = "JENKINS_WATCH_TOKEN";
