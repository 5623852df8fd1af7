//! Plain-text rendering of a finished run.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Utc};
use unicode_truncate::UnicodeTruncateStr;

use crate::pool::RunOutcome;

const TARGET_WIDTH: usize = 40;

fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

fn format_latency(latency: Duration) -> String {
    format!("{:.2}ms", latency.as_secs_f64() * 1000.0)
}

/// Write the result table followed by the summary.
///
/// An empty run still gets the header and a zero-valued summary.
pub fn render<W: Write>(out: &mut W, outcome: &RunOutcome, started_at: DateTime<Utc>) -> io::Result<()> {
    writeln!(out, "Check started at {}", started_at.to_rfc3339())?;
    writeln!(
        out,
        "{} | {:>6} | {:>10} | ERROR",
        to_fixed_width("URL", TARGET_WIDTH),
        "STATUS",
        "LATENCY"
    )?;
    writeln!(out, "{}", "-".repeat(TARGET_WIDTH + 32))?;

    for result in &outcome.results {
        let target = to_fixed_width(&result.target, TARGET_WIDTH);
        match (&result.error, result.status_code) {
            (Some(err), _) => writeln!(
                out,
                "{target} | {:>6} | {:>10} | ❌ [{}] {err}",
                "N/A",
                format_latency(result.latency),
                err.kind()
            )?,
            (None, Some(status)) => writeln!(
                out,
                "{target} | {:>6} | {:>10} | ✅",
                status,
                format_latency(result.latency)
            )?,
            (None, None) => writeln!(out, "{target} | {:>6} | {:>10} |", "N/A", "N/A")?,
        }
    }

    let stats = &outcome.stats;
    writeln!(out)?;
    writeln!(out, "--- Summary ---")?;
    writeln!(out, "Total:     {}", stats.total)?;
    writeln!(out, "Succeeded: {}", stats.succeeded)?;
    writeln!(out, "Failed:    {}", stats.failed)?;
    if let Some(avg) = stats.average_latency() {
        writeln!(out, "Average:   {}", format_latency(avg))?;
    }
    if !outcome.is_complete() {
        writeln!(
            out,
            "Warning:   {} of {} results missing",
            outcome.expected.saturating_sub(stats.total),
            outcome.expected
        )?;
    }
    Ok(())
}
