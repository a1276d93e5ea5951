use jenkins_core::init_logging;

mod app;
pub(crate) mod color;
mod commands;
mod console;
mod table;
mod transport;

fn main() {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Handle --no-color before any output
    if matches.get_flag("no-color") {
        color::set_no_color();
    }

    let verbose = matches.get_flag("verbose");
    init_logging(!verbose);

    if let Err(e) = commands::run_command(&matches) {
        // Already reported on stderr by the command handler.
        drop(e);
        std::process::exit(1);
    }
}
