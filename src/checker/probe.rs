// src/checker/probe.rs
// =============================================================================
// This module makes the actual HTTP requests.
//
// The verifier does not talk to reqwest directly. It talks to the HttpProbe
// trait, which answers one question: "what status code did this URL give
// for this method?" That seam lets the tests swap in a fake network that
// times out, fails DNS, or refuses connections on demand.
//
// ReqwestProbe is the real implementation:
// - one shared Client (connection pooling across all checks)
// - bounded timeout per request
// - redirects followed automatically, up to a limit
// - the response body is never read
//
// Rust concepts:
// - async_trait: lets us put async fns in a trait used as `dyn HttpProbe`
// - Error::source(): walking the cause chain to find the real I/O error
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::time::Duration;

/// HTTP method used for a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Head,
    Get,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Head => f.write_str("HEAD"),
            Method::Get => f.write_str("GET"),
        }
    }
}

/// Why a request produced no HTTP response at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Could not resolve hostname
    Dns(String),
    /// Host answered with a TCP reset / nobody listening
    ConnectionRefused(String),
    /// Request timed out
    Timeout,
    /// Anything else: TLS, too many redirects, connection reset, ...
    Other(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Dns(msg) => write!(f, "could not resolve hostname: {}", msg),
            ProbeError::ConnectionRefused(msg) => write!(f, "connection refused: {}", msg),
            ProbeError::Timeout => f.write_str("request timed out"),
            ProbeError::Other(msg) => f.write_str(msg),
        }
    }
}

impl StdError for ProbeError {}

/// Issues one request and reports the final status code.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn probe(&self, method: Method, url: &str) -> Result<u16, ProbeError>;
}

/// Settings for the real HTTP client.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_redirects: 10,
            user_agent: "Link-Checker/1.0".to_string(),
        }
    }
}

/// `HttpProbe` backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new(settings: &ProbeSettings) -> Result<Self, reqwest::Error> {
        // Reused for every request (connection pooling)
        let client = Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn probe(&self, method: Method, url: &str) -> Result<u16, ProbeError> {
        let request = match method {
            Method::Head => self.client.head(url),
            Method::Get => self.client.get(url),
        };

        // Only the status matters; the body is dropped unread
        match request.send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) => Err(categorize_error(e)),
        }
    }
}

// Categorizes reqwest errors into the handful of cases the verifier cares
// about. DNS failures and refused connections are recognized by walking the
// error's cause chain.
fn categorize_error(error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        return ProbeError::Timeout;
    }

    let error_string = error.to_string();
    if error.is_connect() {
        let mut source = error.source();
        while let Some(cause) = source {
            if let Some(io_error) = cause.downcast_ref::<io::Error>() {
                if io_error.kind() == io::ErrorKind::ConnectionRefused {
                    return ProbeError::ConnectionRefused(io_error.to_string());
                }
                if io_error.kind() == io::ErrorKind::TimedOut {
                    return ProbeError::Timeout;
                }
            }
            if looks_like_dns_failure(&cause.to_string()) {
                return ProbeError::Dns(cause.to_string());
            }
            source = cause.source();
        }
    }

    if looks_like_dns_failure(&error_string) {
        ProbeError::Dns(error_string)
    } else {
        ProbeError::Other(error_string)
    }
}

fn looks_like_dns_failure(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("dns error")
        || message.contains("failed to lookup address")
        || message.contains("name or service not known")
        || message.contains("no such host")
        || message.contains("nodename nor servname")
}
