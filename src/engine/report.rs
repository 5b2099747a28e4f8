// src/engine/report.rs

//! Text sent to the operator.

use std::borrow::Cow;

use crate::exec::ExecutionResult;

/// Longest log excerpt (in characters) sent in reply to `log`.
pub const MAX_LOG_CHARS: usize = 4000;

pub const TRUNCATION_MARKER: &str = "...(truncated)";

pub const NO_OUTPUT: &str = "(no output)";

pub const REPLY_HINT: &str = "Reply with: retry | log | kill";

/// `SUCCESS` iff the exit code is exactly zero.
pub fn status_label(result: &ExecutionResult) -> &'static str {
    if result.success() { "SUCCESS" } else { "FAILED" }
}

/// Seconds with one decimal, e.g. `1.5`.
pub fn format_duration(duration_ms: u64) -> String {
    format!("{:.1}", duration_ms as f64 / 1000.0)
}

/// The notification sent after each run.
pub fn summary_text(command: &str, result: &ExecutionResult) -> String {
    [
        format!("{}: `{}`", status_label(result), command),
        format!("Exit code: {}", result.exit_code),
        format!("Duration: {}s", format_duration(result.duration_ms)),
        String::new(),
        REPLY_HINT.to_string(),
    ]
    .join("\n")
}

/// The follow-up sent for a `log` reply.
///
/// Prefers stdout, then stderr, then a fixed marker. Only the tail is kept
/// when the output is long.
pub fn log_text(result: &ExecutionResult) -> String {
    let output = if !result.stdout.is_empty() {
        result.stdout_text()
    } else if !result.stderr.is_empty() {
        result.stderr_text()
    } else {
        Cow::Borrowed(NO_OUTPUT)
    };

    format!("Output:\n```\n{}\n```", tail_chars(&output, MAX_LOG_CHARS))
}

/// Keep the last `max` characters of `text`, prefixed with
/// [`TRUNCATION_MARKER`] on its own line when anything was dropped.
pub fn tail_chars(text: &str, max: usize) -> Cow<'_, str> {
    let total = text.chars().count();
    if total <= max {
        return Cow::Borrowed(text);
    }

    let start = text
        .char_indices()
        .nth(total - max)
        .map_or(text.len(), |(idx, _)| idx);
    Cow::Owned(format!("{TRUNCATION_MARKER}\n{}", &text[start..]))
}
