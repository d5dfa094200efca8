// src/extract/patterns.rs
// =============================================================================
// This module finds link candidates in a single line of text.
//
// Documentation in the wild is messy. A line can hold Markdown links, raw
// <a>/<img> tags, bare URLs, and the occasional authoring mistake such as
// [label](first](second). We run five independent surface patterns over the
// same line and union what they find:
//
//   1. [label](target)              -> target
//   2. [label](target1](target2)    -> target1 only
//   3. <img ... src="...">          -> src
//   4. bare http(s)://...           -> the URL, unless it is the very
//                                      URL that 1/2/3/5 captured
//   5. <a ... href="...">           -> href
//
// Tags are located with a regex and then handed to `scraper`, which reads the
// attribute the way a browser would (quote styles, &amp; entities, casing).
//
// Rust concepts:
// - byte offsets of explicit captures, used to skip a bare URL that is
//   the same text an explicit pattern already read
// - HashSet: line-level deduplication
// =============================================================================

use regex::{Match, Regex};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::normalize::{is_http_url, Normalizer};
use crate::model::{LinkTask, SourceLine};

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").unwrap());

static DOUBLE_TARGET_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\]\(([^)]+)\)").unwrap());

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\s[^>]*>").unwrap());

static ANCHOR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a\s[^>]*>").unwrap());

// Up to the first character of an attribute value, quote included
static SRC_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\ssrc\s*=\s*["']?"#).unwrap());

static HREF_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\shref\s*=\s*["']?"#).unwrap());

// Ends at whitespace or an unescaped ')'
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://(?:\\\)|[^\s)])+").unwrap());

/// Pulls link candidates out of lines of text.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    normalizer: Normalizer,
    explicit_links_only: bool,
}

impl Extractor {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            explicit_links_only: false,
        }
    }

    /// Only collect links written as links (Markdown syntax, <a>, <img>);
    /// bare URLs in prose are left alone.
    pub fn explicit_links_only(mut self, enabled: bool) -> Self {
        self.explicit_links_only = enabled;
        self
    }

    /// Extracts the distinct normalized URLs of one line.
    ///
    /// Example:
    ///   "See [Rust](https://www.rust-lang.org) or https://crates.io."
    ///   -> ["https://www.rust-lang.org", "https://crates.io"]
    pub fn extract_line(&self, line: &str) -> Vec<String> {
        let mut links = Vec::new();
        // Offsets where an accepted explicit URL begins
        let mut claimed: Vec<usize> = Vec::new();

        // Patterns 1 and 2: Markdown links, the target is capture group 2
        for re in [&*MARKDOWN_LINK, &*DOUBLE_TARGET_LINK] {
            for caps in re.captures_iter(line) {
                let Some(target) = caps.get(2) else {
                    continue;
                };
                if let Some(url) = self.keep_explicit(target.as_str()) {
                    claimed.push(target_start(&target));
                    links.push(url);
                }
            }
        }

        // Patterns 3 and 5: tag attributes
        for (re, selector, attr, value_start) in [
            (&*IMG_TAG, "img[src]", "src", &*SRC_VALUE),
            (&*ANCHOR_TAG, "a[href]", "href", &*HREF_VALUE),
        ] {
            for tag in re.find_iter(line) {
                let Some(value) = read_attribute(tag.as_str(), selector, attr) else {
                    continue;
                };
                if let Some(url) = self.keep_explicit(&value) {
                    if let Some(m) = value_start.find(tag.as_str()) {
                        claimed.push(tag.start() + m.end());
                    }
                    links.push(url);
                }
            }
        }

        // Pattern 4: bare URLs, skipped in explicit-only mode. A bare match
        // is dropped only when it starts exactly where an explicit URL does;
        // URLs in labels, titles or anchor text are kept.
        if !self.explicit_links_only {
            for m in BARE_URL.find_iter(line) {
                if claimed.contains(&m.start()) {
                    continue;
                }
                let raw = m.as_str().replace("\\)", ")");
                let url = self.normalizer.normalize(&raw);
                if !url.is_empty() {
                    links.push(url);
                }
            }
        }

        dedup_preserving_order(links)
    }

    /// Runs `extract_line` over every line, attaching each line's location.
    ///
    /// Returns one task per occurrence; run-wide deduplication is the
    /// coordinator's job.
    pub fn extract_tasks<'a, I>(&self, lines: I) -> Vec<LinkTask>
    where
        I: IntoIterator<Item = &'a SourceLine>,
    {
        let mut tasks = Vec::new();
        for line in lines {
            for url in self.extract_line(&line.text) {
                tasks.push(LinkTask {
                    url,
                    location: line.location.clone(),
                });
            }
        }
        tasks
    }

    // Normalizes an explicit capture and keeps it only if it is http(s)
    fn keep_explicit(&self, raw: &str) -> Option<String> {
        let url = self.normalizer.normalize(raw);
        is_http_url(&url).then_some(url)
    }
}

// Where the URL itself begins inside a Markdown target like "( <url> ...)"
fn target_start(target: &Match<'_>) -> usize {
    let text = target.as_str();
    let skipped = text.len() - text.trim_start_matches(|c: char| c.is_whitespace() || c == '<').len();
    target.start() + skipped
}

// Parses a lone tag as an HTML fragment and reads one attribute from it.
// The selectors are constants, so unwrap() is safe.
fn read_attribute(tag: &str, selector: &str, attr: &str) -> Option<String> {
    let fragment = Html::parse_fragment(tag);
    let selector = Selector::parse(selector).unwrap();
    let element = fragment.select(&selector).next()?;
    element.value().attr(attr).map(str::to_string)
}

fn dedup_preserving_order(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
