use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("jenkins-watch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch Jenkins jobs and report newly failing builds")
        .long_about("jenkins-watch polls a Jenkins server on a fixed interval, compares each result with the previous poll, and prints a notification whenever a build moves into FAILURE. Settings come from ~/.jenkins-watch/config.toml, ./.jenkins-watch/config.toml, and the flags below.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
