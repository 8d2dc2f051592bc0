// src/checker/fetch.rs
// =============================================================================
// The boundary between the crawl engine and the network.
//
// The engine only knows the Fetcher trait: give it a URL, a timeout and the
// crawl deadline, get back a status plus the raw links on the page (or a
// reason the request failed). HttpFetcher (src/checker/http.rs) is the real
// implementation; tests plug in scripted fetchers instead.
// =============================================================================

use super::ExtractedLink;
use crate::crawl::Deadline;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A response, reduced to what the crawler cares about.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status_code: u16,
    pub status_text: String,
    /// URL that relative links on this page resolve against
    /// (the final URL after redirects, or the page's `<base href>`)
    pub base: Url,
    pub links: Vec<ExtractedLink>,
}

/// Why a request produced no response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("Could not resolve hostname")]
    Dns,
    #[error("Connection failed")]
    Connect,
    #[error("SSL certificate error")]
    Tls,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed; this is a terminal outcome for the URL
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The crawl deadline fired while the request was in flight
    #[error("crawl deadline reached")]
    Cancelled,
}

/// Fetches one URL and extracts its links.
///
/// Implementations must give up once `timeout` elapses, and should check
/// `deadline.expired()` as soon as response headers arrive so that a
/// cancelled crawl doesn't wait for a full body download.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
        deadline: &Deadline,
    ) -> Result<FetchedPage, FetchError>;
}
