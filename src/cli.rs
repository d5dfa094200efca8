// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - check: scan a directory or Markdown file (the main use)
// - url:   check one URL
// - urls:  check a list of URLs
//
// Flags that mirror config options override whatever the --config file says.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use md_link_guardian::CheckerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "md-link-guardian",
    version,
    about = "Find confirmed-broken links in Markdown documentation",
    long_about = "md-link-guardian scans Markdown files for links and reports the ones that are \
                  really dead (404, 410, unknown host, connection refused). Rate limits, \
                  server errors, timeouts and access restrictions are not reported, so it is \
                  safe to run in CI."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory (recursively) or a single Markdown file
    ///
    /// Example: md-link-guardian check ./docs --ignore-github-auth
    Check {
        /// Directory or file to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Where to save the report when broken links are found
        #[arg(long, default_value = md_link_guardian::report::DEFAULT_REPORT_PATH)]
        report: PathBuf,

        #[command(flatten)]
        options: CheckOptions,
    },

    /// Check a single URL
    ///
    /// Example: md-link-guardian url https://www.rust-lang.org
    Url {
        url: String,

        #[command(flatten)]
        options: CheckOptions,
    },

    /// Check a list of URLs directly, without scanning any files
    ///
    /// Example: md-link-guardian urls https://a.dev https://b.dev
    Urls {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: CheckOptions,
    },
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckOptions {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Treat login-gated GitHub pages (org/team/settings, 403/404) as skipped
    #[arg(long)]
    pub ignore_github_auth: bool,

    /// Only check links written as links ([text](url), <a href>, <img src>)
    #[arg(long)]
    pub explicit_links_only: bool,

    /// Also strip script fragments (</script>, ;// comments) from URLs
    #[arg(long)]
    pub script_aware: bool,

    /// Maximum number of execution units
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Retries after a network error
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Concurrent requests for small runs
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl CheckOptions {
    /// Applies command-line overrides on top of `config`.
    pub fn apply(&self, mut config: CheckerConfig) -> CheckerConfig {
        // Boolean flags can only switch features on
        config.ignore_auth_walls |= self.ignore_github_auth;
        config.explicit_links_only |= self.explicit_links_only;
        config.script_aware |= self.script_aware;

        if let Some(n) = self.max_workers {
            config.max_workers = Some(n);
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(n) = self.max_retries {
            config.max_retries = n;
        }
        if let Some(n) = self.batch_size {
            config.batch_size = n;
        }
        config
    }
}
