use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

use jenkins_core::{Job, StateSnapshot};

use crate::color;

/// One printable row, precomputed so widths and output agree.
struct Row<'a> {
    job: &'a Job,
    result: String,
    build: String,
    finished: String,
}

impl<'a> Row<'a> {
    fn new(job: &'a Job) -> Self {
        let (result, build, finished) = match &job.last_build {
            Some(build) => (
                build.result.to_string(),
                format!("#{}", build.number),
                build.timestamp.map_or("-".to_string(), format_timestamp),
            ),
            None if job.is_folder() => ("folder".to_string(), "-".to_string(), "-".to_string()),
            None => ("never built".to_string(), "-".to_string(), "-".to_string()),
        };
        Self {
            job,
            result,
            build,
            finished,
        }
    }
}

pub struct TableFormatter<'a> {
    rows: Vec<Row<'a>>,
    job_width: usize,
    result_width: usize,
    build_width: usize,
    finished_width: usize,
}

impl<'a> TableFormatter<'a> {
    pub fn new(snapshot: &'a StateSnapshot) -> Self {
        let rows: Vec<Row<'a>> = snapshot.jobs().map(Row::new).collect();

        // Minimum widths = header label lengths
        let mut job_width = "Job".len();
        let mut result_width = "Result".len();
        let mut build_width = "Build".len();
        let mut finished_width = "Started".len();

        for row in &rows {
            job_width = job_width.max(display_width(&row.job.name));
            result_width = result_width.max(display_width(&row.result));
            build_width = build_width.max(display_width(&row.build));
            finished_width = finished_width.max(display_width(&row.finished));
        }

        Self {
            rows,
            job_width,
            result_width,
            build_width,
            finished_width,
        }
    }

    pub fn print_table(&self) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!("{}", self.header_row());
        println!("{}", self.border('├', '┼', '┤'));
        for row in &self.rows {
            println!("{}", self.format_row(row));
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn border(&self, left: char, middle: char, right: char) -> String {
        color::muted(&format!(
            "{left}{}{middle}{}{middle}{}{middle}{}{right}",
            "─".repeat(self.job_width + 2),
            "─".repeat(self.result_width + 2),
            "─".repeat(self.build_width + 2),
            "─".repeat(self.finished_width + 2),
        ))
    }

    fn header_row(&self) -> String {
        let sep = color::muted("│");
        format!(
            "{sep} {} {sep} {} {sep} {} {sep} {} {sep}",
            color::bold(&pad("Job", self.job_width)),
            color::bold(&pad("Result", self.result_width)),
            color::bold(&pad("Build", self.build_width)),
            color::bold(&pad("Started", self.finished_width)),
        )
    }

    fn format_row(&self, row: &Row<'_>) -> String {
        let sep = color::muted("│");
        // Pad before coloring; escape codes have no display width.
        let result = pad(&row.result, self.result_width);
        let result = match row.job.last_result() {
            Some(r) => color::result(r, &result),
            None => color::muted(&result),
        };
        format!(
            "{sep} {} {sep} {} {sep} {} {sep} {} {sep}",
            color::job(row.job.health.color, &pad(&row.job.name, self.job_width)),
            result,
            pad(&row.build, self.build_width),
            color::muted(&pad(&row.finished, self.finished_width)),
        )
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Compute the terminal display width of a string.
///
/// Wide characters (CJK, emoji) count as 2 columns.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad a string to a minimum display width without truncating.
pub(crate) fn pad(s: &str, min_width: usize) -> String {
    let width = display_width(s);
    if width >= min_width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(min_width - width))
    }
}
