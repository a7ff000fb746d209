//! Change rendering - per-pipeline diff blocks and the change summary

use colored::Colorize;
use stepdiff::{Aggregation, ChangeEntry};

use crate::ui;

/// Render one pipeline's changes:
///
/// ```text
/// api changes:
///   command:
///     Old: old.sh
///     New: run.sh
/// ```
pub fn change_block(slug: &str, entries: &[ChangeEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() * 3 + 1);
    lines.push(format!("{slug} changes:"));
    for entry in entries {
        lines.push(format!("  {}:", entry.key));
        lines.push(format!("    Old: {}", entry.old_display().red()));
        lines.push(format!("    New: {}", entry.new_display().green()));
    }
    lines.join("\n")
}

/// Full confirmation prompt for one pipeline
pub fn step_diff_message(slug: &str, entries: &[ChangeEntry]) -> String {
    format!(
        "\n{}\nThere are changes to {slug}, do you wish to update it?",
        change_block(slug, entries)
    )
}

/// Print how many pipelines and fields differ
pub fn display_summary(agg: &Aggregation, scanned: usize) {
    ui::header("Step changes");
    println!(
        "  {} of {} differ ({})",
        ui::plural(agg.changes.len(), "pipeline").bold(),
        scanned,
        ui::plural(agg.total_changes(), "field change")
    );
}

/// Print every pipeline's change block (dry run)
pub fn display_changes(agg: &Aggregation) {
    for (slug, entries) in &agg.changes {
        println!();
        println!("{}", change_block(slug, entries));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries() -> Vec<ChangeEntry> {
        vec![
            ChangeEntry {
                key: "command".into(),
                old: Some(json!("old.sh")),
                new: json!("run.sh"),
            },
            ChangeEntry {
                key: "timeout_in_minutes".into(),
                old: None,
                new: json!(30),
            },
        ]
    }

    #[test]
    fn test_change_block_layout() {
        let block = change_block("api", &entries());
        let lines: Vec<_> = block.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "api changes:");
        assert_eq!(lines[1], "  command:");
        assert!(lines[2].starts_with("    Old: ") && lines[2].contains("old.sh"));
        assert!(lines[3].starts_with("    New: ") && lines[3].contains("run.sh"));
        assert_eq!(lines[4], "  timeout_in_minutes:");
        assert!(lines[5].contains("Not Set"));
        assert!(lines[6].contains("30"));
    }

    #[test]
    fn test_step_diff_message_frames_block() {
        let msg = step_diff_message("api", &entries());

        assert!(msg.starts_with("\napi changes:\n"));
        assert!(msg.ends_with("There are changes to api, do you wish to update it?"));
    }
}
