// src/error.rs
// =============================================================================
// Error types for the library.
//
// Per-URL problems are never errors: the verifier turns them into outcome
// values. What is left here is the short list of things that really stop a
// run: bad configuration, an HTTP client that cannot be built, and a
// worker pool that falls over.
// =============================================================================

use thiserror::Error;

/// Problems with the checker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An exclusion rule whose regex does not compile
    #[error("invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A numeric option outside its allowed range
    #[error("invalid value for {option}: {reason}")]
    InvalidValue {
        option: &'static str,
        reason: String,
    },

    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures that abort a whole run.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("could not start the execution-unit pool: {0}")]
    PoolInit(String),

    /// An execution unit reported a failure instead of a chunk result
    #[error("execution unit {unit} failed on chunk {chunk}: {message}")]
    ChunkFailed {
        unit: usize,
        chunk: usize,
        message: String,
    },

    /// An execution unit died without reporting back
    #[error("execution unit {unit} stopped unexpectedly: {message}")]
    UnitLost { unit: usize, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
