//! Terminal implementations of the dispatch collaborators.

use std::sync::Arc;

use chrono::Local;
use jenkins_core::{
    BuildFailure, NotificationDispatcher, StateSnapshot, StatusWidget, TransportErrorKind,
    ViewModelProjector,
};

use crate::color;

fn clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub struct ConsoleNotifier;

impl NotificationDispatcher for ConsoleNotifier {
    fn on_build_failed(&mut self, failure: &BuildFailure) {
        println!(
            "{} {} {}",
            color::muted(&clock()),
            color::red(&failure.message()),
            color::muted(&failure.build_url)
        );
    }

    fn on_transport_error(&mut self, kind: TransportErrorKind, message: &str) {
        eprintln!(
            "{} {}",
            color::warning(&format!("Poll failed ({}):", kind)),
            message
        );
        if kind == TransportErrorKind::ServerRejected {
            eprintln!(
                "{}",
                color::hint("Tip: check server.url and the auth token in your config.")
            );
        }
    }
}

/// Prints a one-line summary per snapshot.
pub struct ConsoleProjector;

impl ViewModelProjector for ConsoleProjector {
    fn on_snapshot_updated(&mut self, snapshot: Arc<StateSnapshot>) {
        let broken = snapshot.broken_count();
        let summary = format!("{} jobs, {} broken", snapshot.len(), broken);
        let summary = if broken > 0 {
            color::red(&summary)
        } else {
            color::blue(&summary)
        };
        println!("{} {}", color::muted(&clock()), summary);
    }
}

/// Broken-build counter for the split layout. Prints only when the count moves.
#[derive(Default)]
pub struct ConsoleWidget {
    last: Option<usize>,
}

impl ConsoleWidget {
    fn changed(&mut self, broken: usize) -> bool {
        let changed = self.last != Some(broken);
        self.last = Some(broken);
        changed
    }
}

impl StatusWidget for ConsoleWidget {
    fn update_broken_count(&mut self, broken: usize) {
        if self.changed(broken) {
            let label = format!("[broken: {}]", broken);
            let label = if broken > 0 {
                color::red(&label)
            } else {
                color::blue(&label)
            };
            println!("{}", color::bold(&label));
        }
    }
}
