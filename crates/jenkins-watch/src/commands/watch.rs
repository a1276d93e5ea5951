use std::sync::Arc;

use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use jenkins_core::{EventPump, LayoutStrategy, PollingEngine, RemoteJobSource, WatchError};

use super::helpers::{require_curl, resolve_config};
use crate::color;
use crate::console::{ConsoleNotifier, ConsoleProjector, ConsoleWidget};

pub(crate) fn handle_watch_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(matches)?;
    let transport = require_curl()?;

    info!(
        event = "cli.watch_started",
        server = %config.server_url,
        interval_secs = config.poll_interval_secs,
        layout = %config.layout
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let source = RemoteJobSource::new(Arc::new(transport));
        let (engine, events) = PollingEngine::new(source, tokio::runtime::Handle::current());

        let layout = LayoutStrategy::for_layout(
            config.layout,
            Box::new(ConsoleNotifier),
            Box::new(ConsoleWidget::default()),
        );
        let pump = EventPump::new(events, layout, Box::new(ConsoleProjector));
        let shutdown = CancellationToken::new();
        let pump_task = tokio::spawn(pump.run(shutdown.clone()));

        if let Err(e) = engine.start(config.clone()) {
            eprintln!("{}", color::error(&format!("Could not start polling: {}", e)));
            error!(
                event = "cli.watch_failed",
                error = %e,
                error_code = e.error_code()
            );
            shutdown.cancel();
            let _ = pump_task.await;
            return Err(e.into());
        }

        println!(
            "Watching {} every {}s ({} layout). Press Ctrl-C to stop.",
            color::bold(&config.server_url),
            config.poll_interval_secs,
            config.layout
        );

        wait_for_shutdown_signal().await;

        engine.stop();
        shutdown.cancel();
        if let Err(e) = pump_task.await {
            warn!(event = "cli.watch.pump_join_failed", error = %e);
        }

        info!(
            event = "cli.watch_completed",
            cycles_completed = engine.status().cycles_completed
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Wait for SIGINT (Ctrl-C) or, on unix, SIGTERM.
async fn wait_for_shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {
                        info!(event = "cli.watch.signal_received", signal = "SIGINT");
                    }
                    _ = sigterm.recv() => {
                        info!(event = "cli.watch.signal_received", signal = "SIGTERM");
                    }
                }
                return;
            }
            Err(e) => {
                warn!(event = "cli.watch.sigterm_register_failed", error = %e);
            }
        }
    }

    if let Err(e) = ctrl_c.await {
        warn!(event = "cli.watch.signal_wait_failed", error = %e);
    }
    info!(event = "cli.watch.signal_received", signal = "SIGINT");
}
