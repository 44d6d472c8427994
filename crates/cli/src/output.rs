//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Colour is applied only when
//! the target stream supports it, and `owo_colors::set_override` wins over
//! detection.

use owo_colors::{OwoColorize, Stream, Style};
use whitelabel_core::error::Error;
use whitelabel_core::validation::ValidationResult;

/// `text` styled for `stream`, or plain when colour is off
fn paint(text: &str, stream: Stream, style: Style) -> String {
    text.if_supports_color(stream, |t| t.style(style)).to_string()
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", paint("✓", Stream::Stdout, Style::new().green()), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", paint("✗", Stream::Stderr, Style::new().red()), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", paint("⚠", Stream::Stderr, Style::new().yellow()), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", paint("ℹ", Stream::Stdout, Style::new().blue()), message);
    }

    /// Print an indented list entry
    pub fn item(label: &str, value: &str) {
        println!(
            "  {} {}",
            paint(&format!("{label}:"), Stream::Stdout, Style::new().dimmed()),
            value
        );
    }
}

/// Print errors and warnings of a validation run.
///
/// Errors go to stderr, warnings to stderr as well so stdout stays clean for
/// rendered output.
pub fn print_validation(subject: &str, result: &ValidationResult) {
    for error in result.errors() {
        Status::error(&format!("{subject}: {error}"));
        if let Some(actual) = &error.actual {
            eprintln!(
                "    {} {}",
                paint("found:", Stream::Stderr, Style::new().dimmed()),
                actual
            );
        }
    }
    for warning in result.warnings() {
        Status::warning(&format!("{subject}: {warning}"));
    }
}

/// Print a coded error with its context and suggestion
pub fn print_error(error: &Error) {
    let dim = Style::new().dimmed();
    Status::error(&format!(
        "{} {}",
        paint(&error.code.to_string(), Stream::Stderr, dim),
        error.message
    ));
    if let Some(context) = &error.context {
        eprintln!("    {}", paint(context, Stream::Stderr, dim));
    }
    if let Some(suggestion) = &error.suggestion {
        eprintln!(
            "    {} {}",
            paint("hint:", Stream::Stderr, Style::new().cyan()),
            suggestion
        );
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a byte count for display
pub fn format_size(bytes: u64) -> String {
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

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_paint_respects_override() {
        owo_colors::set_override(true);
        assert!(paint("✓", Stream::Stdout, Style::new().green()).contains('\x1b'));

        owo_colors::set_override(false);
        assert_eq!(paint("✓", Stream::Stdout, Style::new().green()), "✓");

        owo_colors::unset_override();
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration(Duration::from_secs_f32(5.5)), "5.5s");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1, "script", "scripts"), "1 script");
        assert_eq!(format_count(3, "script", "scripts"), "3 scripts");
    }
}
