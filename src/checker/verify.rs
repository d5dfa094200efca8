// src/checker/verify.rs
// =============================================================================
// This module decides whether one URL is broken.
//
// Per-URL state machine:
//
//   Pending
//     -> HEAD request
//        success or 405?  -> use it
//        otherwise        -> GET request, use that instead
//     -> auth-wall heuristic (optional)   -> Skipped
//     -> 404 / 410                        -> Broken
//     -> any other status                 -> Ignored
//
//   No HTTP response at all? Retry with a growing delay. Once the retries
//   are used up:
//     DNS failure         -> Broken(DNS_ERROR)
//     connection refused  -> Broken(CONNECTION_REFUSED)
//     anything else       -> Ignored
//
// 403, 429 and 5xx are never reported as broken.
//
// Nothing in here returns an error: every failure ends up as an outcome.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::probe::{HttpProbe, Method, ProbeError};
use super::retry::RetryPolicy;
use crate::model::{BrokenLink, BrokenStatus, LinkTask, SkipReason, VerificationOutcome};
use crate::policy::AuthHeuristic;

const METHOD_NOT_ALLOWED: u16 = 405;

/// Transient state of one request, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckAttempt {
    pub method: Method,
    /// 0 for the first try
    pub attempt_number: u32,
    pub timeout: Duration,
}

/// Runs the per-URL state machine against an `HttpProbe`.
pub struct Verifier {
    probe: Arc<dyn HttpProbe>,
    retry: RetryPolicy,
    timeout: Duration,
    auth: Option<AuthHeuristic>,
}

impl Verifier {
    pub fn new(probe: Arc<dyn HttpProbe>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            probe,
            retry,
            timeout,
            auth: None,
        }
    }

    /// Enables the auth-wall heuristic.
    pub fn with_auth_heuristic(mut self, heuristic: AuthHeuristic) -> Self {
        self.auth = Some(heuristic);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Checks one link, retrying transient failures.
    pub async fn verify(&self, task: &LinkTask) -> VerificationOutcome {
        let mut attempt_number = 0;
        loop {
            match self.attempt(&task.url, attempt_number).await {
                Ok(status) => return self.classify_status(task, status),
                Err(error) if self.retry.can_retry_after(attempt_number) => {
                    attempt_number += 1;
                    let delay = self.retry.delay_before_retry(attempt_number);
                    warn!(
                        url = %task.url,
                        retry = attempt_number,
                        max_retries = self.retry.max_retries(),
                        error = %error,
                        "Retrying after network error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return classify_failure(task, error),
            }
        }
    }

    // One HEAD, plus a GET when the HEAD answer is not usable
    async fn attempt(&self, url: &str, attempt_number: u32) -> Result<u16, ProbeError> {
        let head = CheckAttempt {
            method: Method::Head,
            attempt_number,
            timeout: self.timeout,
        };
        debug!(url, ?head, "Requesting");
        let status = self.probe.probe(Method::Head, url).await?;

        if is_success(status) || status == METHOD_NOT_ALLOWED {
            return Ok(status);
        }

        let get = CheckAttempt {
            method: Method::Get,
            ..head
        };
        debug!(url, head_status = status, ?get, "HEAD not usable, falling back to GET");
        self.probe.probe(Method::Get, url).await
    }

    fn classify_status(&self, task: &LinkTask, status: u16) -> VerificationOutcome {
        if let Some(auth) = &self.auth {
            if auth.should_skip(&task.url, status) {
                debug!(url = %task.url, status, "Skipping auth-walled page");
                return VerificationOutcome::Skipped {
                    url: task.url.clone(),
                    reason: SkipReason::AuthWall,
                };
            }
        }

        match status {
            404 | 410 => broken(task, BrokenStatus::Http(status)),
            _ => {
                debug!(url = %task.url, status, "Not broken");
                VerificationOutcome::Ignored {
                    url: task.url.clone(),
                }
            }
        }
    }
}

fn classify_failure(task: &LinkTask, error: ProbeError) -> VerificationOutcome {
    match error {
        ProbeError::Dns(_) => broken(task, BrokenStatus::DnsError),
        ProbeError::ConnectionRefused(_) => broken(task, BrokenStatus::ConnectionRefused),
        other => {
            debug!(url = %task.url, error = %other, "Giving up, treating as not broken");
            VerificationOutcome::Ignored {
                url: task.url.clone(),
            }
        }
    }
}

fn broken(task: &LinkTask, status: BrokenStatus) -> VerificationOutcome {
    VerificationOutcome::Broken(BrokenLink::new(
        task.url.clone(),
        status,
        task.location.clone(),
    ))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceLocation;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Scripted network: answers per (method, url), records every call
    #[derive(Default)]
    struct ScriptedProbe {
        answers: HashMap<(Method, String), Result<u16, ProbeError>>,
        calls: Mutex<Vec<Method>>,
    }

    impl ScriptedProbe {
        fn answer(mut self, method: Method, url: &str, result: Result<u16, ProbeError>) -> Self {
            self.answers.insert((method, url.to_string()), result);
            self
        }

        fn calls(&self) -> Vec<Method> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpProbe for ScriptedProbe {
        async fn probe(&self, method: Method, url: &str) -> Result<u16, ProbeError> {
            self.calls.lock().unwrap().push(method);
            self.answers
                .get(&(method, url.to_string()))
                .cloned()
                .unwrap_or(Ok(200))
        }
    }

    const URL: &str = "https://dead.example/a";

    fn task() -> LinkTask {
        LinkTask {
            url: URL.to_string(),
            location: SourceLocation::new("docs/a.md", 7),
        }
    }

    fn verifier(probe: Arc<ScriptedProbe>) -> Verifier {
        Verifier::new(probe, RetryPolicy::new(2, Duration::ZERO), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_successful_head_skips_get() {
        let probe = Arc::new(ScriptedProbe::default());
        let outcome = verifier(probe.clone()).verify(&task()).await;
        assert!(matches!(outcome, VerificationOutcome::Ignored { .. }));
        assert_eq!(probe.calls(), vec![Method::Head]);
    }

    #[tokio::test]
    async fn test_404_is_broken_after_get_fallback() {
        let probe = Arc::new(
            ScriptedProbe::default()
                .answer(Method::Head, URL, Ok(404))
                .answer(Method::Get, URL, Ok(404)),
        );
        let outcome = verifier(probe.clone()).verify(&task()).await;
        match outcome {
            VerificationOutcome::Broken(link) => {
                assert_eq!(link.status, BrokenStatus::Http(404));
                assert_eq!(link.location(), SourceLocation::new("docs/a.md", 7));
            }
            other => panic!("expected broken, got {other:?}"),
        }
        assert_eq!(probe.calls(), vec![Method::Head, Method::Get]);
    }

    #[tokio::test]
    async fn test_get_answer_wins_over_head() {
        // Some servers reject HEAD with 404 but serve GET fine
        let probe = Arc::new(
            ScriptedProbe::default()
                .answer(Method::Head, URL, Ok(404))
                .answer(Method::Get, URL, Ok(200)),
        );
        let outcome = verifier(probe).verify(&task()).await;
        assert!(matches!(outcome, VerificationOutcome::Ignored { .. }));
    }

    #[tokio::test]
    async fn test_405_on_head_does_not_fall_back() {
        let probe = Arc::new(ScriptedProbe::default().answer(Method::Head, URL, Ok(405)));
        let outcome = verifier(probe.clone()).verify(&task()).await;
        assert!(matches!(outcome, VerificationOutcome::Ignored { .. }));
        assert_eq!(probe.calls(), vec![Method::Head]);
    }

    #[tokio::test]
    async fn test_410_is_broken() {
        let probe = Arc::new(
            ScriptedProbe::default()
                .answer(Method::Head, URL, Ok(410))
                .answer(Method::Get, URL, Ok(410)),
        );
        let outcome = verifier(probe).verify(&task()).await;
        assert!(
            matches!(outcome, VerificationOutcome::Broken(ref l) if l.status == BrokenStatus::Http(410))
        );
    }

    #[tokio::test]
    async fn test_forbidden_rate_limited_and_server_errors_are_ignored() {
        for status in [403, 429, 500, 503] {
            let probe = Arc::new(
                ScriptedProbe::default()
                    .answer(Method::Head, URL, Ok(status))
                    .answer(Method::Get, URL, Ok(status)),
            );
            let outcome = verifier(probe).verify(&task()).await;
            assert!(
                matches!(outcome, VerificationOutcome::Ignored { .. }),
                "status {status} should be ignored"
            );
        }
    }

    #[tokio::test]
    async fn test_timeouts_on_every_attempt_are_ignored() {
        let probe = Arc::new(
            ScriptedProbe::default().answer(Method::Head, URL, Err(ProbeError::Timeout)),
        );
        let outcome = verifier(probe.clone()).verify(&task()).await;
        assert!(matches!(outcome, VerificationOutcome::Ignored { .. }));
        // First try plus two retries
        assert_eq!(probe.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_dns_failure_is_broken_after_retries() {
        let probe = Arc::new(ScriptedProbe::default().answer(
            Method::Head,
            URL,
            Err(ProbeError::Dns("no such host".to_string())),
        ));
        let outcome = verifier(probe.clone()).verify(&task()).await;
        assert!(
            matches!(outcome, VerificationOutcome::Broken(ref l) if l.status == BrokenStatus::DnsError)
        );
        assert_eq!(probe.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_is_broken() {
        let probe = Arc::new(ScriptedProbe::default().answer(
            Method::Head,
            URL,
            Err(ProbeError::ConnectionRefused("refused".to_string())),
        ));
        let outcome = verifier(probe).verify(&task()).await;
        assert!(matches!(
            outcome,
            VerificationOutcome::Broken(ref l) if l.status == BrokenStatus::ConnectionRefused
        ));
    }

    #[tokio::test]
    async fn test_network_error_on_get_fallback_is_retried() {
        let probe = Arc::new(
            ScriptedProbe::default()
                .answer(Method::Head, URL, Ok(404))
                .answer(Method::Get, URL, Err(ProbeError::Other("reset".to_string()))),
        );
        let outcome = verifier(probe.clone()).verify(&task()).await;
        assert!(matches!(outcome, VerificationOutcome::Ignored { .. }));
        assert_eq!(probe.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_auth_wall_is_skipped_when_enabled() {
        let url = "https://github.com/orgs/acme/teams/core/settings";
        let task = LinkTask {
            url: url.to_string(),
            location: SourceLocation::new("README.md", 1),
        };
        let probe = Arc::new(
            ScriptedProbe::default()
                .answer(Method::Head, url, Ok(404))
                .answer(Method::Get, url, Ok(404)),
        );

        let plain = verifier(probe.clone()).verify(&task).await;
        assert!(plain.is_broken());

        let with_auth = verifier(probe)
            .with_auth_heuristic(AuthHeuristic::github())
            .verify(&task)
            .await;
        assert_eq!(
            with_auth,
            VerificationOutcome::Skipped {
                url: url.to_string(),
                reason: SkipReason::AuthWall,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_grow_linearly() {
        let probe = Arc::new(
            ScriptedProbe::default().answer(Method::Head, URL, Err(ProbeError::Timeout)),
        );
        let verifier = Verifier::new(
            probe,
            RetryPolicy::new(2, Duration::from_secs(1)),
            Duration::from_secs(1),
        );

        let started = tokio::time::Instant::now();
        verifier.verify(&task()).await;
        // 1s before the first retry, 2s before the second
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }
}
