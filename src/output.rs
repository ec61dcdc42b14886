//! Colored console output and progress reporting.
//!
//! Uses owo-colors for terminal colors and indicatif for progress bars.
//! In CI mode the same calls emit TeamCity service messages instead: blocks
//! become `blockOpened`/`blockClosed` pairs, errors become `buildProblem`,
//! and progress bars are hidden.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::OnceLock;
use std::time::Duration;

static CI_MODE: OnceLock<bool> = OnceLock::new();

/// Select the output mode once at startup. Later calls are ignored.
pub fn init(ci: bool) {
    let _ = CI_MODE.set(ci);
}

fn ci() -> bool {
    *CI_MODE.get().unwrap_or(&false)
}

/// Escape TeamCity service message metacharacters.
fn tc_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            _ => out.push(c),
        }
    }
    out
}

/// Open a named block of work.
/// Example: "==> SDK - Setup: Start install package"
pub fn block_start(name: &str, message: &str) {
    if ci() {
        println!("##teamcity[blockOpened name='{}']", tc_escape(name));
        println!("{message}");
    } else {
        println!("{} {}: {}", "==>".blue().bold(), name.bold(), message);
    }
}

/// Close a named block of work.
pub fn block_end(name: &str, message: &str) {
    if ci() {
        println!("{message}");
        println!("##teamcity[blockClosed name='{}']", tc_escape(name));
    } else {
        println!("{} {}: {}", "==>".blue().bold(), name.bold(), message);
    }
}

/// Print a detail line (dimmed prefix)
/// Example: "     downloading assimp-5.0.0.rc1.7z"
pub fn detail(message: &str) {
    if ci() {
        println!("{message}");
    } else {
        println!("     {}", message.dimmed());
    }
}

/// Print a success message (green)
pub fn success(message: &str) {
    if ci() {
        println!("{message}");
    } else {
        println!("{} {}", "==>".green().bold(), message.green());
    }
}

/// Print a skip message (dimmed)
/// Example: "==> Boost-1.72.0 already installed, skipping"
pub fn skip(message: &str) {
    if ci() {
        println!("{message}");
    } else {
        println!("{} {}", "==>".dimmed(), message.dimmed());
    }
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    if ci() {
        println!(
            "##teamcity[message text='{}' status='WARNING']",
            tc_escape(message)
        );
    } else {
        eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
    }
}

/// Print an error message (red). In CI mode this marks the build as failed.
pub fn error(message: &str) {
    if ci() {
        println!("##teamcity[buildProblem description='{}']", tc_escape(message));
    } else {
        eprintln!("{} {}", "error:".red().bold(), message.red());
    }
}

/// Create a download progress bar
pub fn download_progress(total_size: u64) -> ProgressBar {
    if ci() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("━╸━"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a simple spinner for operations of unknown length
pub fn spinner(message: &str) -> ProgressBar {
    if ci() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("     {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
