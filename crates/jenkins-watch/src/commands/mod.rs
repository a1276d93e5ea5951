use clap::ArgMatches;
use tracing::error;

use jenkins_core::events;

mod helpers;
mod status;
mod watch;

pub(crate) fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let command = matches.subcommand_name().unwrap_or("none");
    events::log_app_startup(command);

    let result = match matches.subcommand() {
        Some(("watch", sub_matches)) => watch::handle_watch_command(sub_matches),
        Some(("status", sub_matches)) => status::handle_status_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    match &result {
        Ok(()) => events::log_app_shutdown(command),
        Err(e) => events::log_app_error(command, e.as_ref()),
    }
    result
}
