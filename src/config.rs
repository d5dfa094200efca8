// src/config.rs
// =============================================================================
// Checker configuration.
//
// Every option has a default, so an empty config is a valid config. Values
// can come from a TOML file (camelCase keys) and are then overridden by
// command-line flags.
//
// Example file:
//
//   requestTimeoutMs = 8000
//   maxRetries = 3
//   ignoreAuthWalls = true
//   additionalExclusionRules = [
//     { kind = "substring", value = "intranet.corp" },
//   ]
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::checker::{ProbeSettings, RetryPolicy};
use crate::error::ConfigError;
use crate::extract::NormalizeMode;
use crate::policy::ExclusionRule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerConfig {
    /// Execution-unit cap; `None` = derived from available cores
    pub max_workers: Option<usize>,
    /// Per-request timeout
    pub request_timeout_ms: u64,
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Base unit of the linear retry delay
    pub retry_delay_ms: u64,
    /// Concurrent requests for small runs
    pub batch_size: usize,
    /// Concurrent requests inside each execution unit for large runs
    pub unit_concurrency: usize,
    /// Treat login-gated GitHub pages as skipped instead of broken
    pub ignore_auth_walls: bool,
    /// Only collect links written as links, not bare URLs in prose
    pub explicit_links_only: bool,
    /// Also strip script fragments when cleaning URLs
    pub script_aware: bool,
    /// Rules appended to the built-in exclusion list
    pub additional_exclusion_rules: Vec<ExclusionRule>,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            request_timeout_ms: 15_000,
            max_retries: 2,
            retry_delay_ms: 1_000,
            batch_size: 100,
            unit_concurrency: 20,
            ignore_auth_walls: false,
            explicit_links_only: false,
            script_aware: false,
            additional_exclusion_rules: Vec::new(),
            user_agent: "Link-Checker/1.0".to_string(),
            max_redirects: 10,
        }
    }
}

impl CheckerConfig {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &display)
    }

    /// Rejects values that would stall or break a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("batchSize", self.batch_size as u64),
            ("unitConcurrency", self.unit_concurrency as u64),
            ("requestTimeoutMs", self.request_timeout_ms),
        ];
        for (option, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    option,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.max_workers == Some(0) {
            return Err(ConfigError::InvalidValue {
                option: "maxWorkers",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            timeout: self.request_timeout(),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn normalize_mode(&self) -> NormalizeMode {
        if self.script_aware {
            NormalizeMode::ScriptAware
        } else {
            NormalizeMode::Standard
        }
    }
}
