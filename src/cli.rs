// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things). Every option has a
// default, so `link-spider https://example.com` is a complete command.
//
// The raw values collected here are turned into a validated CrawlConfig by
// Cli::crawl_config(); the engine never sees the Cli struct.
// =============================================================================

use crate::config::{
    self, ConfigError, CrawlConfig, ResourcePolicy, ScopePolicy, DEFAULT_ERROR_THRESHOLD,
    DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_DEPTH, DEFAULT_USER_AGENT,
};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "link-spider",
    version,
    about = "Crawl a website and check every link reachable from a seed URL",
    long_about = "link-spider starts at a seed URL, follows links on the same host up to a \
                  maximum depth, requests every page and resource it finds, and writes one \
                  line per URL with its HTTP status to a report file."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com/)
    pub seed: String,

    /// How many link hops to follow from the seed
    ///
    /// 0 = just the seed, 1 = the seed and everything it links to, etc.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Which discovered URLs may be crawled
    ///
    /// host: anything on the seed's host.
    /// endpoint: only URLs at or below the seed's path.
    #[arg(long, value_enum, default_value_t = ScopePolicy::Host)]
    pub scope: ScopePolicy,

    /// What to do with images, scripts and other `src` resources
    ///
    /// expand: treat them like pages and follow links inside them.
    /// leaf: check them, but never follow links inside them.
    #[arg(long, value_enum, default_value_t = ResourcePolicy::Expand)]
    pub resources: ResourcePolicy,

    /// Maximum number of requests in flight (default: half the CPUs)
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Stop the whole crawl after this many seconds
    #[arg(long, default_value_t = 60)]
    pub deadline: u64,

    /// Upper bound of the random delay before each request, in milliseconds
    #[arg(long, default_value_t = 50)]
    pub jitter_ms: u64,

    /// Status codes at or above this are reported as errors
    #[arg(long, default_value_t = DEFAULT_ERROR_THRESHOLD)]
    pub error_threshold: u16,

    /// Stop reading a response body after this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// File the report is written to
    #[arg(long, short = 'o', default_value = "results.txt")]
    pub output: PathBuf,

    /// Print results as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// More log output: -v info, -vv debug, -vvv trace
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds and validates the engine configuration from the parsed flags.
    pub fn crawl_config(&self) -> Result<CrawlConfig, ConfigError> {
        CrawlConfig::new(&self.seed)?
            .with_max_depth(self.max_depth)
            .with_scope(self.scope)
            .with_resources(self.resources)
            .with_workers(self.workers.unwrap_or_else(config::default_workers))
            .with_request_timeout(Duration::from_secs(self.timeout))
            .with_deadline(Duration::from_secs(self.deadline))
            .with_jitter(Duration::from_millis(self.jitter_ms))
            .with_error_threshold(self.error_threshold)
            .with_max_body_size(self.max_body_size)
            .with_user_agent(self.user_agent.as_str())
            .validate()
    }

    /// Warnings only by default; each -v shows one more level.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
