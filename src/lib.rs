// src/lib.rs
// =============================================================================
// md-link-guardian: finds confirmed-broken links in Markdown documentation.
//
// Modules, leaves first:
// - model: the values passed between stages
// - extract: link candidates from lines of text, cleaned up
// - policy: which URLs never get checked, which failures are auth walls
// - checker: HTTP requests, retries, and the per-URL verdict
// - coordinator: dedup, work distribution, the final report
// - source: reads Markdown files from disk
// - report: prints / saves the report
// - config, error: settings and the errors that stop a run
// =============================================================================

pub mod checker;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod model;
pub mod policy;
pub mod report;
pub mod source;

pub use config::CheckerConfig;
pub use coordinator::LinkChecker;
pub use error::{ConfigError, CoordinatorError};
pub use model::{
    BrokenLink, BrokenStatus, LinkTask, RunReport, SkipReason, SourceLine, SourceLocation,
    VerificationOutcome,
};
