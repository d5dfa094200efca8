// src/report.rs
// =============================================================================
// This module presents a RunReport to humans and machines.
//
// - print_report: table of broken links plus a summary
// - print_json: the whole report as pretty JSON on stdout
// - broken_links_json: just the broken entries, for `urls --json`
// - write_report: the same JSON saved to a file (link-check-report.json)
// =============================================================================

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::model::{BrokenLink, RunReport, SkipReason, VerificationOutcome};

/// Default file name for the saved report.
pub const DEFAULT_REPORT_PATH: &str = "link-check-report.json";

/// Prints results as a human-readable table in the terminal.
pub fn print_report(report: &RunReport) {
    if report.broken_links.is_empty() {
        println!("🎉 All links are working!");
    } else {
        println!("❌ Found {} broken link(s):\n", report.total_broken_links);
        print_broken_table(&report.broken_links);
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Files: {}", report.total_files);
    println!("   🔗 Links: {} ({} unique)", report.total_links, report.unique_links);
    println!("   🚫 Excluded: {}", report.excluded_links);
    println!("   🔐 Skipped: {}", report.skipped_links);
    println!("   ✅ Not broken: {}", report.ignored_links);
    println!("   ❌ Broken: {}", report.total_broken_links);
}

/// Prints broken links as `URL STATUS LOCATION` rows.
pub fn print_broken_table(links: &[BrokenLink]) {
    println!("{:<60} {:<20} {:<30}", "URL", "STATUS", "LOCATION");
    println!("{}", "=".repeat(110));

    for link in links {
        println!(
            "{:<60} {:<20} {:<30}",
            truncate(&link.url, 57),
            link.status.to_string(),
            link.location().to_string()
        );
    }
}

/// One line describing a single-URL check.
pub fn describe_outcome(outcome: &VerificationOutcome) -> String {
    match outcome {
        VerificationOutcome::Broken(link) => format!("❌ BROKEN ({}) {}", link.status, link.url),
        VerificationOutcome::Skipped {
            url,
            reason: SkipReason::ExcludedByPolicy,
        } => format!("🚫 EXCLUDED {}", url),
        VerificationOutcome::Skipped { url, reason } => format!("🔐 SKIPPED ({}) {}", reason, url),
        VerificationOutcome::Ignored { url } => format!("✅ OK {}", url),
    }
}

/// The broken entries alone, as a pretty JSON array.
pub fn broken_links_json(links: &[BrokenLink]) -> Result<String> {
    Ok(serde_json::to_string_pretty(links)?)
}

pub fn print_json(report: &RunReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    println!("{}", json_output);
    Ok(())
}

/// Saves the report as pretty JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
    Ok(())
}

// Truncate URL if too long for display
fn truncate(url: &str, max_chars: usize) -> String {
    if url.chars().count() > max_chars {
        let head: String = url.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BrokenStatus, SourceLocation};
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_report() -> RunReport {
        let broken = vec![BrokenLink::new(
            "https://dead.example/a".to_string(),
            BrokenStatus::DnsError,
            SourceLocation::new("README.md", 12),
        )];
        RunReport {
            timestamp: Utc::now(),
            total_files: 1,
            total_links: 3,
            unique_links: 2,
            excluded_links: 1,
            skipped_links: 0,
            ignored_links: 0,
            total_broken_links: 1,
            broken_links: broken,
            success: false,
        }
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("https://a.dev", 57), "https://a.dev");
        assert_eq!(truncate("https://例え.jp/ページ", 10), "https://例え...");
    }

    #[test]
    fn test_write_report_round_trips_key_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REPORT_PATH);
        write_report(&sample_report(), &path).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["totalBrokenLinks"], 1);
        assert_eq!(saved["brokenLinks"][0]["status"], "DNS_ERROR");
        assert_eq!(saved["brokenLinks"][0]["line"], 12);
        assert_eq!(saved["success"], false);
    }

    #[test]
    fn test_broken_links_json_is_a_bare_array() {
        let json = broken_links_json(&sample_report().broken_links).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["url"], "https://dead.example/a");
        assert_eq!(parsed[0]["status"], "DNS_ERROR");

        let empty: serde_json::Value = serde_json::from_str(&broken_links_json(&[]).unwrap()).unwrap();
        assert_eq!(empty, serde_json::json!([]));
    }

    #[test]
    fn test_describe_outcome() {
        let excluded = VerificationOutcome::Skipped {
            url: "mailto:a@b.c".to_string(),
            reason: SkipReason::ExcludedByPolicy,
        };
        assert_eq!(describe_outcome(&excluded), "🚫 EXCLUDED mailto:a@b.c");

        let ok = VerificationOutcome::Ignored {
            url: "https://a.dev".to_string(),
        };
        assert_eq!(describe_outcome(&ok), "✅ OK https://a.dev");
    }
}
