// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling from a seed URL with a cap on parallel requests
// - Host-wide or path-prefixed scope (never leaves the seed's host)
// - Configurable depth limit
// - Each URL visited at most once, even when many pages link to it
// - Polite crawling with a random delay before each request
// - A global deadline that stops the whole crawl cleanly
//
// Submodules, leaves first:
// - scope: Which URLs are in bounds
// - frontier: Which URLs were admitted, at what depth
// - deadline: The crawl-wide cancellation signal
// - results: Per-URL outcomes and the final ordered report
// - engine: The worker pool tying it all together
// =============================================================================

mod deadline;
mod engine;
mod frontier;
mod results;
mod scope;

pub use deadline::Deadline;
pub use engine::{CrawlSummary, Crawler};
pub use results::{Outcome, ResultEntry};
pub use scope::ScopeFilter;
