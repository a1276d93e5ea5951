use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const CRATE_TARGETS: [&str; 3] = ["jenkins_core", "jenkins_config", "jenkins_watch"];

/// Initialize logging with optional quiet mode.
///
/// A valid `RUST_LOG` replaces the defaults entirely. Otherwise our crates log
/// at error level when `quiet` and at info level when not, and everything else
/// at error level.
pub fn init_logging(quiet: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(build_filter(quiet, rust_log.as_deref()))
        .try_init();
}

fn build_filter(quiet: bool, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.map(str::trim).filter(|d| !d.is_empty())
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return filter;
    }

    let level = if quiet { "error" } else { "info" };
    let directives = CRATE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(format!("error,{}", directives))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_with(filter: EnvFilter, level: Level) -> bool {
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            if level == Level::DEBUG {
                tracing::enabled!(target: "jenkins_core::engine", Level::DEBUG)
            } else if level == Level::INFO {
                tracing::enabled!(target: "jenkins_core::engine", Level::INFO)
            } else {
                tracing::enabled!(target: "jenkins_core::engine", Level::ERROR)
            }
        })
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(true);
        init_logging(false);
    }

    #[test]
    fn test_rust_log_enables_debug_for_our_crates() {
        let filter = build_filter(false, Some("jenkins_core=debug"));
        assert!(enabled_with(filter, Level::DEBUG));
    }

    #[test]
    fn test_rust_log_overrides_quiet() {
        let filter = build_filter(true, Some("jenkins_core=info"));
        assert!(enabled_with(filter, Level::INFO));
    }

    #[test]
    fn test_defaults_without_rust_log() {
        assert!(enabled_with(build_filter(false, None), Level::INFO));
        assert!(!enabled_with(build_filter(false, None), Level::DEBUG));
        assert!(!enabled_with(build_filter(true, None), Level::INFO));
        assert!(enabled_with(build_filter(true, None), Level::ERROR));
    }

    #[test]
    fn test_blank_rust_log_uses_defaults() {
        assert!(enabled_with(build_filter(false, Some("  ")), Level::INFO));
        assert!(!enabled_with(build_filter(false, Some("  ")), Level::DEBUG));
    }
}
