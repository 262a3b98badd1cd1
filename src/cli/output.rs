//! CLI output formatting

use crate::core::registry::Step;
use crate::diff::{DiffSpan, SpanKind};
use crate::executor::ChangeEntry;
use crate::history::HistoryRecord;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static PEN: Emoji<'_, '_> = Emoji("✏️  ", "> ");

/// Create a progress bar over the pipeline's steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a step for the catalog listing
pub fn format_step(step: &Step) -> String {
    format!(
        "  {}. {} {} {}",
        style(step.number).cyan(),
        style(&step.name).bold(),
        style(format!("[{}]", step.tool_label)).dim(),
        step.description
    )
}

/// Render diff spans with terminal colors: deletions struck through in
/// red, insertions in green.
pub fn render_spans(spans: &[DiffSpan]) -> String {
    let mut parts = Vec::new();
    for span in spans {
        let text = span.tokens.join(" ");
        let styled = match span.kind {
            SpanKind::Unchanged => text,
            SpanKind::Deleted => style(text).red().strikethrough().to_string(),
            SpanKind::Inserted => style(text).green().to_string(),
        };
        parts.push(styled);
    }
    parts.join(" ")
}

/// One-line summary of a history record
pub fn format_record_summary(record: &HistoryRecord) -> String {
    format!(
        "{} {} - {} - {} change(s) - {}",
        PEN,
        style(record.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
        style(&record.label).bold(),
        record.changes.len(),
        style(&record.tools_used).cyan()
    )
}

/// Format a change list, one line per edit
pub fn format_changes(changes: &[ChangeEntry]) -> String {
    changes
        .iter()
        .map(|c| {
            format!(
                "    {} → {} {}",
                style(&c.original).red(),
                style(&c.corrected).green(),
                style(format!("({})", c.reason)).dim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format step output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
