// Colored terminal output for summaries.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::summary::assembler::Summary;

/// Print a summary. With `show_details`, also print which candidate
/// sentences were selected.
pub fn display_summary(summary: &Summary, show_details: bool) {
    if summary.text.is_empty() {
        println!(
            "{}",
            "No sentences within the length bounds; the summary is empty.".yellow()
        );
        return;
    }

    println!("{}", summary.text);

    if show_details {
        println!();
        println!(
            "{}",
            format!(
                "Selected {} of {} sentences: {}",
                summary.selected.len(),
                summary.candidate_count,
                format_indices(&summary.selected)
            )
            .dimmed()
        );
    }
}

/// Print a summary as pretty JSON: text, selected indices, candidate count.
pub fn display_summary_json(summary: &Summary) -> Result<()> {
    println!("{}", summary_json(summary)?);
    Ok(())
}

fn summary_json(summary: &Summary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("Failed to serialize summary")
}

fn format_indices(indices: &[usize]) -> String {
    let parts: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
