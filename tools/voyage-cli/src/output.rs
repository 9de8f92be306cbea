//! Output formatting for the CLI.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Severity of a human-readable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Success,
    Warn,
    Debug,
}

/// Output handler for CLI messages.
///
/// Human output goes to the terminal; with `--json` only [`Output::json`]
/// and errors are printed, so stdout stays machine-readable.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    fn line(&self, level: Level, msg: &str) {
        if self.json || (level == Level::Debug && !self.verbose) {
            return;
        }
        match level {
            Level::Info => println!("{} {}", style("ℹ").blue(), msg),
            Level::Success => println!("{} {}", style("✓").green(), msg),
            Level::Warn => eprintln!("{} {}", style("⚠").yellow(), msg),
            Level::Debug => eprintln!("{} {}", style("→").dim(), style(msg).dim()),
        }
    }

    pub fn info(&self, msg: &str) {
        self.line(Level::Info, msg);
    }

    pub fn success(&self, msg: &str) {
        self.line(Level::Success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.line(Level::Warn, msg);
    }

    /// Only shown with `--verbose`.
    pub fn debug(&self, msg: &str) {
        self.line(Level::Debug, msg);
    }

    /// Errors are printed in both modes; as `{"error": ...}` under `--json`.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.json {
            println!("\n{}", style(msg).bold().underlined());
        }
    }

    /// `[n/total] msg`
    pub fn step(&self, num: usize, total: usize, msg: &str) {
        if !self.json {
            println!("{} {}", style(format!("[{}/{}]", num, total)).dim(), msg);
        }
    }

    /// Pretty-printed JSON on stdout, regardless of mode.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if !self.json {
            println!("  {}: {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if !self.json {
            println!("    {} {}", style("•").dim(), item);
        }
    }

    /// Print columns padded to `widths`.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let row = cols
            .iter()
            .zip(widths)
            .map(|(col, width)| pad(col, *width))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", row.trim_end());
    }

    /// Bar over a known number of steps; hidden under `--json`.
    pub fn progress(&self, len: u64, msg: &str) -> ProgressBar {
        let pb = if self.json {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(len)
        };
        if let Ok(bar) = ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(bar.progress_chars("=> "));
        }
        pb.set_message(msg.to_string());
        pb
    }

    /// Spinner for work of unknown length; hidden under `--json`.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})") {
            pb.set_style(spinner);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Pad to `width` visible columns, ignoring ANSI styling.
fn pad(col: &str, width: usize) -> String {
    let visible = console::measure_text_width(col);
    format!("{}{}", col, " ".repeat(width.saturating_sub(visible)))
}

/// Colored badge for a hydration outcome or route kind.
pub fn status_badge(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "attached" | "ok" => style(status).green().to_string(),
        "rebuilt" | "catch-all" => style(status).yellow().to_string(),
        "failed" | "error" => style(status).red().to_string(),
        _ => status.to_string(),
    }
}

/// Format bytes as human-readable size.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a duration as a short human-readable string.
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_ignores_styling() {
        let badge = status_badge("rebuilt");
        assert_eq!(console::measure_text_width(&pad(&badge, 10)), 10);
        assert_eq!(pad("toolong", 3), "toolong");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }
}
