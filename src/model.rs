// src/model.rs
// =============================================================================
// The data model shared by every stage of the pipeline.
//
// Flow of values:
//   SourceLine (text + where it came from)
//     -> LinkTask (one per unique URL)
//     -> VerificationOutcome (Broken / Skipped / Ignored)
//     -> RunReport (only the Broken ones survive)
//
// Rust concepts:
// - Enums with data: each outcome variant carries exactly what it needs
// - serde: the report is written to disk as JSON
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Pseudo-file name used for URLs handed to the checker directly.
pub const PROGRAMMATIC_SOURCE: &str = "programmatic";

/// Where a URL was first seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location for the n-th (1-based) URL of a programmatic list.
    pub fn programmatic(index: usize) -> Self {
        Self::new(PROGRAMMATIC_SOURCE, index)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// One line of input text, as handed over by the traversal layer.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub text: String,
    pub location: SourceLocation,
}

impl SourceLine {
    pub fn new(text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }
}

/// A unique URL waiting to be verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTask {
    pub url: String,
    pub location: SourceLocation,
}

/// Why a link counts as dead.
///
/// Serialized the way the report consumers expect: the HTTP status as a
/// number, network failures as an upper-case token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrokenStatus {
    Http(u16),
    DnsError,
    ConnectionRefused,
}

impl BrokenStatus {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BrokenStatus::Http(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for BrokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenStatus::Http(code) => write!(f, "{}", code),
            BrokenStatus::DnsError => f.write_str("DNS_ERROR"),
            BrokenStatus::ConnectionRefused => f.write_str("CONNECTION_REFUSED"),
        }
    }
}

impl Serialize for BrokenStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BrokenStatus::Http(code) => serializer.serialize_u16(*code),
            other => serializer.collect_str(other),
        }
    }
}

/// A confirmed-broken link, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub url: String,
    pub status: BrokenStatus,
    pub file: PathBuf,
    pub line: usize,
}

impl BrokenLink {
    pub fn new(url: String, status: BrokenStatus, location: SourceLocation) -> Self {
        Self {
            url,
            status,
            file: location.file,
            line: location.line,
        }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Matched an exclusion rule; never sent over the network.
    ExcludedByPolicy,
    /// Looks like a login-gated page on an auth-walled platform.
    AuthWall,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ExcludedByPolicy => f.write_str("excluded by policy"),
            SkipReason::AuthWall => f.write_str("behind an auth wall"),
        }
    }
}

/// Terminal state of one URL check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Broken(BrokenLink),
    Skipped { url: String, reason: SkipReason },
    Ignored { url: String },
}

impl VerificationOutcome {
    pub fn url(&self) -> &str {
        match self {
            VerificationOutcome::Broken(link) => &link.url,
            VerificationOutcome::Skipped { url, .. } => url,
            VerificationOutcome::Ignored { url } => url,
        }
    }

    pub fn is_broken(&self) -> bool {
        matches!(self, VerificationOutcome::Broken(_))
    }
}

/// The final result of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub total_files: usize,
    /// Links found before deduplication
    pub total_links: usize,
    pub unique_links: usize,
    pub excluded_links: usize,
    pub skipped_links: usize,
    pub ignored_links: usize,
    pub total_broken_links: usize,
    pub broken_links: Vec<BrokenLink>,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_status_serializes_as_number_or_token() {
        assert_eq!(serde_json::to_string(&BrokenStatus::Http(404)).unwrap(), "404");
        assert_eq!(
            serde_json::to_string(&BrokenStatus::DnsError).unwrap(),
            "\"DNS_ERROR\""
        );
        assert_eq!(
            serde_json::to_string(&BrokenStatus::ConnectionRefused).unwrap(),
            "\"CONNECTION_REFUSED\""
        );
    }

    #[test]
    fn test_report_uses_camel_case_keys() {
        let report = RunReport {
            timestamp: Utc::now(),
            total_files: 1,
            total_links: 2,
            unique_links: 2,
            excluded_links: 0,
            skipped_links: 0,
            ignored_links: 1,
            total_broken_links: 1,
            broken_links: vec![BrokenLink::new(
                "https://dead.example/a".to_string(),
                BrokenStatus::Http(410),
                SourceLocation::new("docs/a.md", 3),
            )],
            success: false,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["totalBrokenLinks"], 1);
        assert_eq!(value["brokenLinks"][0]["status"], 410);
        assert_eq!(value["brokenLinks"][0]["file"], "docs/a.md");
        assert_eq!(value["brokenLinks"][0]["line"], 3);
    }

    #[test]
    fn test_programmatic_location() {
        let location = SourceLocation::programmatic(4);
        assert_eq!(location.to_string(), "programmatic:4");
    }
}
