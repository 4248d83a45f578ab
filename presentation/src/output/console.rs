//! Console output formatter for capture reports

use colored::Colorize;
use livelog_application::CaptureReport;
use serde_json::json;

/// Formats capture reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Multi-line human-readable summary
    pub fn format(report: &CaptureReport) -> String {
        let stats = &report.stats;
        let mut output = String::new();

        let status = if report.is_clean() {
            "capture complete".green().bold()
        } else {
            "capture complete with losses".yellow().bold()
        };
        output.push_str(&format!(
            "{} {} {}\n",
            "livelog:".cyan().bold(),
            status,
            format!("({:.2?})", report.elapsed).dimmed()
        ));

        output.push_str(&format!("  {:<10} {}\n", "sink".cyan(), report.sink));
        output.push_str(&format!("  {:<10} {}\n", "captured".cyan(), stats.captured));
        output.push_str(&format!("  {:<10} {}\n", "written".cyan(), stats.written));

        if stats.dropped() > 0 {
            output.push_str(&format!(
                "  {:<10} {}\n",
                "dropped".red(),
                stats.dropped()
            ));
            for (reason, count) in [
                ("queue full", stats.dropped_queue_full),
                ("sink error", stats.dropped_sink_error),
                ("after close", stats.dropped_after_close),
                ("on shutdown", stats.dropped_on_shutdown),
            ] {
                if count > 0 {
                    output.push_str(&format!("    {}: {}\n", reason, count));
                }
            }
        }

        if stats.sink_errors > 0 {
            output.push_str(&format!(
                "  {:<10} {}\n",
                "errors".red(),
                stats.sink_errors
            ));
        }

        if let Some(timeout) = &report.shutdown_timeout {
            output.push_str(&format!("  {} {}\n", "warning:".yellow().bold(), timeout));
        }

        output
    }

    /// Single-line JSON summary
    pub fn format_json(report: &CaptureReport) -> String {
        let value = json!({
            "sink": report.sink,
            "elapsed_ms": report.elapsed.as_millis() as u64,
            "stats": report.stats,
            "dropped": report.stats.dropped(),
            "shutdown_timeout": report.shutdown_timeout.as_ref().map(|t| t.to_string()),
            "clean": report.is_clean(),
        });
        value.to_string()
    }
}
