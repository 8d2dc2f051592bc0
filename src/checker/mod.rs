// src/checker/mod.rs
// =============================================================================
// This module is everything the crawler needs from the network.
//
// Submodules:
// - fetch: The Fetcher trait the crawl engine talks to, plus its error types
// - http: The reqwest-backed Fetcher used by the real binary
// - html: Extracts href/src values from HTML pages
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod fetch;
mod html;
mod http;

// Re-export public items from submodules
// This lets users write `checker::HttpFetcher` instead of
// `checker::http::HttpFetcher`
pub use fetch::{FetchError, FetchedPage, Fetcher, TransportError};
pub use html::{ExtractedLink, LinkKind};
pub use http::HttpFetcher;
