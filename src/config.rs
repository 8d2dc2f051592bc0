// src/config.rs
// =============================================================================
// The validated crawl configuration consumed by the engine.
//
// The CLI (src/cli.rs) collects raw values from the user; this module turns
// them into a CrawlConfig and rejects anything the engine can't work with
// before a single request is sent.
//
// Rust concepts:
// - thiserror: Derive std::error::Error for our own error enum
// - Builder-style methods: `with_*` methods that take and return `self`
// - Duration: Typed time spans instead of raw integers
// =============================================================================

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default number of link hops followed from the seed.
pub const DEFAULT_MAX_DEPTH: usize = 2;
/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Default wall-clock budget for the whole crawl.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);
/// Default upper bound of the random delay before each request.
pub const DEFAULT_JITTER: Duration = Duration::from_millis(50);
/// Status codes at or above this value are reported as errors.
pub const DEFAULT_ERROR_THRESHOLD: u16 = 203;
/// Response bodies are truncated after this many bytes.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;
/// Browser-like user agent; some servers refuse unknown clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:101.0) Gecko/20100101 Firefox/101.0";

/// Which discovered URLs are eligible for crawling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    /// Any URL on the seed's host
    Host,
    /// Only URLs at or below the seed's path
    Endpoint,
}

/// What to do with URLs found in `src` attributes (images, scripts, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResourcePolicy {
    /// Treat them exactly like hyperlinks: fetch and expand
    Expand,
    /// Fetch and record them, but never follow links inside them
    Leaf,
}

/// Reasons a configuration is refused before crawling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid seed URL '{url}': {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("seed URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("seed URL has no host: {0}")]
    MissingHost(String),

    #[error("worker count must be greater than 0")]
    NoWorkers,

    #[error("{0} must be greater than 0")]
    ZeroDuration(&'static str),

    #[error("error threshold must be a valid HTTP status code (100-999), got {0}")]
    InvalidThreshold(u16),

    #[error("max body size must be greater than 0")]
    ZeroBodySize,
}

/// Everything the crawl engine needs to know about one run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: Url,
    pub max_depth: usize,
    pub scope: ScopePolicy,
    pub resources: ResourcePolicy,
    pub workers: usize,
    pub request_timeout: Duration,
    pub deadline: Duration,
    pub jitter: Duration,
    pub error_threshold: u16,
    pub max_body_size: usize,
    pub user_agent: String,
}

impl CrawlConfig {
    /// Parses the seed and fills every other field with its default.
    pub fn new(seed: &str) -> Result<Self, ConfigError> {
        let seed = Url::parse(seed).map_err(|source| ConfigError::InvalidSeed {
            url: seed.to_string(),
            source,
        })?;

        Ok(Self {
            seed,
            max_depth: DEFAULT_MAX_DEPTH,
            scope: ScopePolicy::Host,
            resources: ResourcePolicy::Expand,
            workers: default_workers(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            deadline: DEFAULT_DEADLINE,
            jitter: DEFAULT_JITTER,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_scope(mut self, scope: ScopePolicy) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_resources(mut self, resources: ResourcePolicy) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_error_threshold(mut self, threshold: u16) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Checks the whole configuration, returning it unchanged if it's usable.
    ///
    /// A zero jitter is allowed (no delay); a zero max depth is allowed
    /// (only the seed is checked).
    pub fn validate(self) -> Result<Self, ConfigError> {
        match self.seed.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if self.seed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingHost(self.seed.to_string()));
        }

        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }

        if self.deadline.is_zero() {
            return Err(ConfigError::ZeroDuration("crawl deadline"));
        }

        if !(100..=999).contains(&self.error_threshold) {
            return Err(ConfigError::InvalidThreshold(self.error_threshold));
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::ZeroBodySize);
        }

        Ok(self)
    }
}

/// Half of the available processors, but never fewer than one worker.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CrawlConfig::new("https://example.com/").unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.scope, ScopePolicy::Host);
        assert_eq!(config.resources, ResourcePolicy::Expand);
        assert!(config.workers >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_seed() {
        let err = CrawlConfig::new("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeed { .. }));
    }

    #[test]
    fn test_rejects_non_http_seed() {
        let err = CrawlConfig::new("ftp://example.com/")
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[test]
    fn test_rejects_zero_workers() {
        let err = CrawlConfig::new("https://example.com/")
            .unwrap()
            .with_workers(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoWorkers));
    }

    #[test]
    fn test_rejects_zero_deadline() {
        let err = CrawlConfig::new("https://example.com/")
            .unwrap()
            .with_deadline(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration("crawl deadline")));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let err = CrawlConfig::new("https://example.com/")
            .unwrap()
            .with_error_threshold(42)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(42)));
    }

    #[test]
    fn test_zero_depth_and_jitter_allowed() {
        let config = CrawlConfig::new("http://example.test/")
            .unwrap()
            .with_max_depth(0)
            .with_jitter(Duration::ZERO)
            .validate();
        assert!(config.is_ok());
    }
}
