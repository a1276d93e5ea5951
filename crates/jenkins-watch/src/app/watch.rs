use clap::{Arg, ArgAction, Command};

/// Flags shared by every command that talks to a server.
fn server_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("server")
                .long("server")
                .short('s')
                .help("Jenkins base URL (overrides server.url from config)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Seconds to wait for the server before giving up")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("job")
                .long("job")
                .short('j')
                .help("Only watch this job, by full or short name (repeatable)")
                .action(ArgAction::Append),
        )
}

pub fn watch_command() -> Command {
    server_args(Command::new("watch").about("Poll continuously and report status changes"))
        .arg(
            Arg::new("interval")
                .long("interval")
                .short('i')
                .help("Seconds between polls")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .help("Notification layout")
                .value_parser(["single", "split"]),
        )
}

pub fn status_command() -> Command {
    server_args(Command::new("status").about("Fetch once and print the current job table")).arg(
        Arg::new("json")
            .long("json")
            .help("Output in JSON format")
            .action(ArgAction::SetTrue),
    )
}
