// src/policy/exclusion.rs
// =============================================================================
// This module decides which URLs are never worth a network request.
//
// Documentation is full of links that were never meant to resolve:
// mailto:/tel: links, localhost demos, example.com, template placeholders
// like {{host}} or your-project-id, and tutorial filler such as
// https://xxxx.github.io/リポジトリ名. Checking them only produces noise.
//
// The policy is plain data: a list of rules, each one a prefix, substring,
// host or regex. A URL is excluded as soon as any rule matches; there is no
// precedence between rules.
//
// Rust concepts:
// - serde tagged enums: rules can be written in the TOML config as
//   { kind = "substring", value = "internal.corp" }
// =============================================================================

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// One exclusion predicate, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExclusionRule {
    /// URL starts with this text
    Prefix(String),
    /// URL contains this text anywhere
    Substring(String),
    /// URL parses and its host equals this (case-insensitive)
    Host(String),
    /// URL matches this regular expression
    Pattern(String),
}

// Rule ready for matching (regexes compiled)
#[derive(Debug, Clone)]
enum Matcher {
    Prefix(String),
    Substring(String),
    Host(String),
    Pattern(Regex),
}

impl Matcher {
    fn compile(rule: ExclusionRule) -> Result<Self, ConfigError> {
        Ok(match rule {
            ExclusionRule::Prefix(p) => Matcher::Prefix(p),
            ExclusionRule::Substring(s) => Matcher::Substring(s),
            ExclusionRule::Host(h) => Matcher::Host(h.to_ascii_lowercase()),
            ExclusionRule::Pattern(p) => {
                let re = Regex::new(&p)
                    .map_err(|source| ConfigError::InvalidPattern { pattern: p, source })?;
                Matcher::Pattern(re)
            }
        })
    }

    fn matches(&self, url: &str) -> bool {
        match self {
            Matcher::Prefix(p) => url.starts_with(p.as_str()),
            Matcher::Substring(s) => url.contains(s.as_str()),
            Matcher::Host(h) => Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|host| host.eq_ignore_ascii_case(h)))
                .unwrap_or(false),
            Matcher::Pattern(re) => re.is_match(url),
        }
    }
}

/// The built-in rule set.
pub fn default_rules() -> Vec<ExclusionRule> {
    use ExclusionRule::*;

    let prefixes = ["mailto:", "tel:", "#", "javascript:"];
    let hosts = ["localhost", "127.0.0.1", "[::1]"];
    let substrings = [
        // placeholder domains
        "example.com",
        "example.org",
        "example.net",
        "hoge.com",
        "xxxx.github.io",
        "xxxxx",
        "hook.us1.make.com/xxxxx",
        "APP_PATH",
        // Japanese tutorial filler ("your user name", "repository name", "here")
        "GitHubユーザー名",
        "ユーザー名.github.io",
        "<ココ>",
        "[ユーザー名]",
        "[リポジトリ名]",
    ];
    let patterns = [
        r"your-.*-id",
        r"\{\{.*\}\}",
        r"github\.io.*リポジトリ名",
        r"your-[\w-]+",
        r"\{[\w-]+\}",
        r"\[[\w\s]+\]",
    ];

    prefixes
        .iter()
        .map(|p| Prefix(p.to_string()))
        .chain(hosts.iter().map(|h| Host(h.to_string())))
        .chain(substrings.iter().map(|s| Substring(s.to_string())))
        .chain(patterns.iter().map(|p| Pattern(p.to_string())))
        .collect()
}

/// A compiled set of exclusion rules.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    matchers: Vec<Matcher>,
}

impl ExclusionPolicy {
    /// Compiles the given rules. Fails on the first invalid regex.
    pub fn new<I>(rules: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ExclusionRule>,
    {
        let matchers = rules
            .into_iter()
            .map(Matcher::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// Built-in rules plus `additional` ones from configuration.
    pub fn with_additional<I>(additional: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ExclusionRule>,
    {
        Self::new(default_rules().into_iter().chain(additional))
    }

    /// A policy that excludes nothing.
    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True if any rule matches.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(url))
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        // The built-in patterns are constants; test_default_rules_compile
        // guards against typos.
        Self::new(default_rules()).unwrap()
    }
}
