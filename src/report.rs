use colored::Colorize;
use std::path::Path;

use crate::batch::{BatchReport, Outcome, PreviewEntry};
use crate::emoji::{FileOutcome, StripReport};

// =============================================================================
// Operator-facing output
// =============================================================================

pub fn format_batch(report: &BatchReport, document: &Path) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{}\n{}\n",
        format!("Block insertion into {}", document.display()).bold(),
        "=".repeat(60)
    ));

    for (record, outcome) in &report.entries {
        let line = match outcome {
            Outcome::Inserted => format!("  {} {}", "[+]".green(), record),
            Outcome::NotFound => format!("  {} {} (not found)", "[!]".red(), record),
            Outcome::Ambiguous(reason) => {
                format!("  {} {} (ambiguous: {})", "[?]".yellow(), record, reason)
            }
        };
        output.push_str(&line);
        output.push('\n');
    }

    output.push_str(&format_batch_summary(report));
    output
}

pub fn format_batch_summary(report: &BatchReport) -> String {
    let summary = format!(
        "Summary: {} inserted, {} not found, {} ambiguous ({} total)",
        report.inserted(),
        report.not_found(),
        report.ambiguous(),
        report.total()
    );
    if report.is_clean() {
        format!("{}\n", summary.green())
    } else {
        format!("{}\n", summary.yellow())
    }
}

pub fn format_preview(entries: &[PreviewEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        output.push_str(&format!("\n## {}:\n", entry.record.bold()));
        if let Some(current) = &entry.current {
            output.push_str(&format!("{} {}\n", "after:".dimmed(), current));
        }
        match &entry.block {
            Ok(block) => {
                output.push_str(block.as_str());
                output.push('\n');
            }
            Err(err) => output.push_str(&format!("{}\n", err.to_string().red())),
        }
    }
    output
}

pub fn format_strip(report: &StripReport) -> String {
    let mut output = String::new();
    for (path, outcome) in &report.entries {
        let line = match outcome {
            FileOutcome::Changed => format!("{} Removed emojis from {}", "[+]".green(), path.display()),
            FileOutcome::Unchanged => format!("[ ] No emojis found in {}", path.display()),
            FileOutcome::Missing => format!("{} File not found: {}", "[!]".red(), path.display()),
            FileOutcome::Failed(reason) => {
                format!("{} Failed: {}: {}", "[!]".red(), path.display(), reason)
            }
        };
        output.push_str(&line);
        output.push('\n');
    }
    output.push_str(&format!(
        "\n{} Complete! Updated {} files.\n",
        "[+]".green(),
        report.updated()
    ));
    if report.failed() > 0 {
        output.push_str(&format!(
            "{}\n",
            format!("{} files could not be processed.", report.failed()).red()
        ));
    }
    output
}

/// Honour `NO_COLOR` for everything rendered through `colored`.
pub fn configure_colors() {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{LocateError, Locator, RecordLayout};
    use crate::batch::preview;
    use crate::insert::ContentPayload;
    use std::path::PathBuf;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn batch_report_lists_every_record() {
        plain();
        let report = BatchReport {
            entries: vec![
                ("kiddush-guide".into(), Outcome::Inserted),
                ("missing".into(), Outcome::NotFound),
                ("dup".into(), Outcome::Ambiguous("record id occurs 2 times".into())),
            ],
        };
        let text = format_batch(&report, Path::new("src/lib/content/guides.ts"));
        assert!(text.contains("guides.ts"));
        assert!(text.contains("[+] kiddush-guide"));
        assert!(text.contains("[!] missing (not found)"));
        assert!(text.contains("[?] dup (ambiguous: record id occurs 2 times)"));
        assert!(text.contains("Summary: 1 inserted, 1 not found, 1 ambiguous (3 total)"));
    }

    #[test]
    fn strip_report_counts_updates() {
        plain();
        let report = StripReport {
            entries: vec![
                (PathBuf::from("a.tsx"), FileOutcome::Changed),
                (PathBuf::from("b.tsx"), FileOutcome::Unchanged),
                (PathBuf::from("c.tsx"), FileOutcome::Missing),
                (
                    PathBuf::from("d.tsx"),
                    FileOutcome::Failed("stream did not contain valid UTF-8".into()),
                ),
            ],
        };
        let text = format_strip(&report);
        assert!(text.contains("[!] Failed: d.tsx: stream did not contain valid UTF-8"));
        assert!(text.contains("1 files could not be processed."));
        assert!(text.contains("[+] Removed emojis from a.tsx"));
        assert!(text.contains("[ ] No emojis found in b.tsx"));
        assert!(text.contains("[!] File not found: c.tsx"));
        assert!(text.contains("Updated 1 files."));
    }

    #[test]
    fn preview_shows_blocks_and_errors() {
        plain();
        let entries = vec![PreviewEntry {
            record: "a".to_string(),
            current: None,
            block: Err(LocateError::NotFound("a".into())),
        }];
        let text = format_preview(&entries);
        assert!(text.contains("## a:"));
        assert!(text.contains("record 'a' not found"));
        assert!(!text.contains("after:"));
    }

    #[test]
    fn preview_shows_current_end_field() {
        plain();
        let doc = "id: 'x', summary: 'it\\'s short', whenRelevant: true";
        let locator = Locator::new(RecordLayout::default()).unwrap();
        let payload = ContentPayload::new().with_field("a", "foo");
        let text = format_preview(&preview(doc, [("x", &payload)], &locator));
        assert!(text.contains("after: it's short"));
        assert!(text.contains(" a: 'foo',"));
    }
}
