//! Terminal colors keyed to Jenkins ball colors.
//!
//! Every function respects `NO_COLOR`, `FORCE_COLOR`, and TTY detection via
//! `owo-colors`' `if_supports_color()`. The `--no-color` flag sets an
//! in-process flag that skips owo-colors entirely.

use std::sync::atomic::{AtomicBool, Ordering};

use jenkins_core::{BuildResult, JobColor};
use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

const BLUE: Rgb = Rgb::from_hex(0x4A90D9); // Success
const RED: Rgb = Rgb::from_hex(0xD9534F); // Failure
const YELLOW: Rgb = Rgb::from_hex(0xE0B040); // Unstable
const GREY: Rgb = Rgb::from_hex(0x8A8F98); // Aborted, not built, secondary text

fn no_color() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

fn paint(text: &str, stream: owo_colors::Stream, rgb: Rgb) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(stream, |t| t.truecolor(rgb.r, rgb.g, rgb.b))
        .to_string()
}

pub fn blue(text: &str) -> String {
    paint(text, Stdout, BLUE)
}

pub fn red(text: &str) -> String {
    paint(text, Stdout, RED)
}

pub fn yellow(text: &str) -> String {
    paint(text, Stdout, YELLOW)
}

/// Secondary info, borders, hints.
pub fn muted(text: &str) -> String {
    paint(text, Stdout, GREY)
}

pub fn bold(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Color a build result the way Jenkins colors its ball.
pub fn result(result: BuildResult, text: &str) -> String {
    match result {
        BuildResult::Success => blue(text),
        BuildResult::Failure => red(text),
        BuildResult::Unstable => yellow(text),
        BuildResult::Running => bold(text),
        BuildResult::Aborted | BuildResult::Unknown => muted(text),
    }
}

pub fn job(color: JobColor, text: &str) -> String {
    match color {
        JobColor::Blue => blue(text),
        JobColor::Red => red(text),
        JobColor::Yellow => yellow(text),
        JobColor::Grey | JobColor::Disabled | JobColor::Aborted | JobColor::NotBuilt => {
            muted(text)
        }
    }
}

/// Error styling for stderr messages.
pub fn error(text: &str) -> String {
    paint(text, Stderr, RED)
}

/// Warning styling for stderr messages.
pub fn warning(text: &str) -> String {
    paint(text, Stderr, YELLOW)
}

/// Hint styling for stderr messages.
pub fn hint(text: &str) -> String {
    paint(text, Stderr, GREY)
}
