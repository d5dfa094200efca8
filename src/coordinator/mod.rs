// src/coordinator/mod.rs
// =============================================================================
// This module ties the pipeline together.
//
//   lines -> extract -> dedup (first location wins) -> exclusion filter
//         -> small run:  one bounded pool of requests
//            large run:  chunks over a pool of execution units
//         -> RunReport
//
// Deduplication happens exactly once, before any work is handed out, so the
// report can never list the same URL twice no matter how many units run.
//
// LinkChecker is the public entry point. Besides the full pipeline it can
// check a single URL or a plain list of URLs.
// =============================================================================

mod pool;

pub use pool::{chunk_size, resolve_workers, run_bounded, run_pool, BatchSummary, MAX_WORKERS};

use chrono::Utc;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::checker::{HttpProbe, ReqwestProbe, Verifier};
use crate::config::CheckerConfig;
use crate::error::CoordinatorError;
use crate::extract::{Extractor, Normalizer};
use crate::model::{
    BrokenLink, LinkTask, RunReport, SkipReason, SourceLine, SourceLocation, VerificationOutcome,
};
use crate::policy::{AuthHeuristic, ExclusionPolicy};
use crate::source::Corpus;

/// Runs at or below this size skip the execution-unit pool.
pub const POOL_THRESHOLD: usize = 50;

/// Keeps the first task for every URL.
pub fn dedup_tasks(tasks: Vec<LinkTask>) -> Vec<LinkTask> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| seen.insert(task.url.clone()))
        .collect()
}

/// The link verification pipeline.
pub struct LinkChecker {
    config: CheckerConfig,
    extractor: Extractor,
    exclusions: ExclusionPolicy,
    verifier: Arc<Verifier>,
}

impl LinkChecker {
    /// Checker using the real network.
    pub fn new(config: CheckerConfig) -> Result<Self, CoordinatorError> {
        let probe = ReqwestProbe::new(&config.probe_settings())?;
        Self::with_probe(config, Arc::new(probe))
    }

    /// Checker using the given transport.
    pub fn with_probe(
        config: CheckerConfig,
        probe: Arc<dyn HttpProbe>,
    ) -> Result<Self, CoordinatorError> {
        config.validate()?;
        let exclusions =
            ExclusionPolicy::with_additional(config.additional_exclusion_rules.iter().cloned())?;
        let extractor = Extractor::new(Normalizer::new(config.normalize_mode()))
            .explicit_links_only(config.explicit_links_only);

        let mut verifier = Verifier::new(probe, config.retry_policy(), config.request_timeout());
        if config.ignore_auth_walls {
            verifier = verifier.with_auth_heuristic(AuthHeuristic::github());
        }

        Ok(Self {
            config,
            extractor,
            exclusions,
            verifier: Arc::new(verifier),
        })
    }

    /// Replaces the exclusion policy (built-in rules included).
    pub fn with_exclusions(mut self, exclusions: ExclusionPolicy) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Checks one URL, for ad hoc use. Excluded URLs are not requested.
    pub async fn check_url(&self, url: &str) -> VerificationOutcome {
        if self.exclusions.is_excluded(url) {
            return VerificationOutcome::Skipped {
                url: url.to_string(),
                reason: SkipReason::ExcludedByPolicy,
            };
        }
        let task = LinkTask {
            url: url.to_string(),
            location: SourceLocation::programmatic(1),
        };
        self.verifier.verify(&task).await
    }

    /// Checks an explicit URL list, bypassing extraction.
    ///
    /// Each URL's location is its 1-based position in the list.
    pub async fn check_urls(&self, urls: &[String]) -> Result<Vec<BrokenLink>, CoordinatorError> {
        let tasks = urls
            .iter()
            .enumerate()
            .map(|(i, url)| LinkTask {
                url: url.clone(),
                location: SourceLocation::programmatic(i + 1),
            })
            .collect();
        let (summary, _) = self.verify_tasks(dedup_tasks(tasks)).await?;
        Ok(summary.broken)
    }

    /// Full pipeline over a loaded corpus.
    pub async fn check_corpus(&self, corpus: &Corpus) -> Result<RunReport, CoordinatorError> {
        let mut report = self.check_lines(&corpus.lines).await?;
        report.total_files = corpus.files.len();
        Ok(report)
    }

    /// Full pipeline over `(text, location)` lines.
    pub async fn check_lines(&self, lines: &[SourceLine]) -> Result<RunReport, CoordinatorError> {
        let files: BTreeSet<&PathBuf> = lines.iter().map(|l| &l.location.file).collect();

        let all_tasks = self.extractor.extract_tasks(lines);
        let total_links = all_tasks.len();
        let unique = dedup_tasks(all_tasks);
        let unique_links = unique.len();

        info!(total_links, unique_links, "Collected links");

        let (summary, excluded) = self.verify_tasks(unique).await?;
        let broken_links = summary.broken;

        Ok(RunReport {
            timestamp: Utc::now(),
            total_files: files.len(),
            total_links,
            unique_links,
            excluded_links: excluded,
            skipped_links: summary.skipped,
            ignored_links: summary.ignored,
            total_broken_links: broken_links.len(),
            success: broken_links.is_empty(),
            broken_links,
        })
    }

    // Filters out excluded URLs, then picks a strategy by volume.
    // Returns the summary and the number of excluded tasks.
    async fn verify_tasks(
        &self,
        tasks: Vec<LinkTask>,
    ) -> Result<(BatchSummary, usize), CoordinatorError> {
        let before = tasks.len();
        let tasks: Vec<LinkTask> = tasks
            .into_iter()
            .filter(|task| !self.exclusions.is_excluded(&task.url))
            .collect();
        let excluded = before - tasks.len();

        let summary = if tasks.len() <= POOL_THRESHOLD {
            info!(
                tasks = tasks.len(),
                excluded,
                batch_size = self.config.batch_size,
                "Checking links in a single pool"
            );
            run_bounded(self.verifier.clone(), tasks, self.config.batch_size).await
        } else {
            let workers = resolve_workers(self.config.max_workers);
            info!(tasks = tasks.len(), excluded, workers, "Checking links with execution units");
            run_pool(
                self.verifier.clone(),
                tasks,
                workers,
                self.config.unit_concurrency,
            )
            .await?
        };

        info!(
            broken = summary.broken.len(),
            skipped = summary.skipped,
            ignored = summary.ignored,
            "Link check completed"
        );
        Ok((summary, excluded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(url: &str, file: &str, line: usize) -> LinkTask {
        LinkTask {
            url: url.to_string(),
            location: SourceLocation::new(file, line),
        }
    }

    #[test]
    fn test_dedup_keeps_first_location() {
        let tasks = vec![
            task("https://a.dev/x", "a.md", 3),
            task("https://a.dev/y", "a.md", 4),
            task("https://a.dev/x", "b.md", 1),
        ];
        let unique = dedup_tasks(tasks);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].location, SourceLocation::new("a.md", 3));
    }
}
