use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::error::IgtokenError;
use crate::graph::{CheckOutcome, Overall};
use crate::types::TokenStatus;

pub fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Apply `style` only when writing to a terminal.
pub fn paint(text: &str, is_tty: bool, style: fn(&str) -> ColoredString) -> String {
    if is_tty {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

pub fn status_label(status: &TokenStatus, is_tty: bool) -> String {
    let text = status.to_string();
    match status {
        TokenStatus::Valid { .. } => paint(&text, is_tty, |s| s.green()),
        TokenStatus::ExpiringSoon { .. } => paint(&text, is_tty, |s| s.yellow()),
        TokenStatus::Expired => paint(&text, is_tty, |s| s.red()),
    }
}

pub fn check_label(outcome: CheckOutcome, is_tty: bool) -> String {
    match outcome {
        CheckOutcome::Passed => paint("PASS", is_tty, |s| s.green()),
        CheckOutcome::Warning => paint("WARN", is_tty, |s| s.yellow()),
        CheckOutcome::Failed => paint("FAIL", is_tty, |s| s.red()),
    }
}

pub fn overall_label(overall: Overall, is_tty: bool) -> String {
    match overall {
        Overall::Passed => paint("All checks passed", is_tty, |s| s.green().bold()),
        Overall::Partial => paint("Some checks failed", is_tty, |s| s.yellow().bold()),
        Overall::Failed => paint("All checks failed", is_tty, |s| s.red().bold()),
    }
}

pub fn heading(text: &str, is_tty: bool) -> String {
    paint(text, is_tty, |s| s.cyan().bold())
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

pub fn print_error(err: &IgtokenError, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&err.to_json()).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
    }
}
