// src/checker/http.rs
// =============================================================================
// This module fetches pages over HTTP with reqwest.
//
// Key functionality:
// - One shared Client (connection pooling) with a browser-like user agent
// - Per-request timeout, redirects followed up to a limit and only while
//   they stay in scope (an off-scope hop is reported as the redirect itself)
// - Aborts right after the headers if the crawl deadline has passed
// - Reads at most `max_body_size` bytes of each body
// - Parses error pages too (a 500 page can still link somewhere useful)
// - Sorts failures into timeout / DNS / TLS / ... categories
//
// Rust concepts:
// - async_trait: Lets us implement the async Fetcher trait
// - Error source chains: walking `source()` to find the root cause
// =============================================================================

use super::fetch::{FetchError, FetchedPage, Fetcher, TransportError};
use super::html::parse_page;
use crate::config::CrawlConfig;
use crate::crawl::{Deadline, ScopeFilter};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::{Action, Attempt, Policy};
use reqwest::{Client, Response};
use std::error::Error as _;
use std::time::Duration;
use url::Url;

/// Redirect hops followed before giving up on a URL.
const MAX_REDIRECTS: usize = 10;

pub struct HttpFetcher {
    client: Client,
    max_body_size: usize,
}

impl HttpFetcher {
    /// Builds a fetcher whose redirects never leave `scope`.
    pub fn new(
        user_agent: &str,
        max_body_size: usize,
        scope: ScopeFilter,
    ) -> Result<Self, reqwest::Error> {
        let policy = Policy::custom(move |attempt| scoped_redirect(attempt, &scope));
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(policy)
            .build()?;

        Ok(Self {
            client,
            max_body_size,
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let scope = ScopeFilter::new(&config.seed, config.scope);
        Self::new(&config.user_agent, config.max_body_size, scope)
    }
}

// Same hop limit as Policy::limited, plus the scope check. Stopping hands the
// 3xx response back as-is, so the URL is recorded with the redirect status
// and nothing from the other side is downloaded.
fn scoped_redirect(attempt: Attempt, scope: &ScopeFilter) -> Action {
    if attempt.previous().len() >= MAX_REDIRECTS {
        attempt.error("too many redirects")
    } else if !scope.in_scope(attempt.url()) {
        debug!("not following redirect out of scope: {}", attempt.url());
        attempt.stop()
    } else {
        attempt.follow()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
        deadline: &Deadline,
    ) -> Result<FetchedPage, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| categorize_error(&e))?;

        // Headers are in. Dropping `response` here closes the connection
        // without downloading the body.
        if deadline.expired() {
            debug!("deadline passed after headers for {}, aborting", url);
            return Err(FetchError::Cancelled);
        }

        let status = response.status();
        let mut base = response.url().clone();

        let links = if is_html(&response) {
            match read_body(&mut response, self.max_body_size).await {
                Ok(body) => {
                    let page = parse_page(&String::from_utf8_lossy(&body));
                    if let Some(href) = page.base_href {
                        if let Ok(joined) = base.join(&href) {
                            base = joined;
                        }
                    }
                    page.links
                }
                Err(e) => {
                    // The status line already arrived, so the URL still gets
                    // its outcome; we just can't look for links in it
                    debug!("failed to read body of {}: {}", url, e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(FetchedPage {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            base,
            links,
        })
    }
}

// Only HTML can contain links we understand. A missing Content-Type is
// given the benefit of the doubt.
fn is_html(response: &Response) -> bool {
    match response.headers().get(CONTENT_TYPE) {
        Some(value) => value
            .to_str()
            .map(|ct| ct.to_ascii_lowercase().contains("html"))
            .unwrap_or(false),
        None => true,
    }
}

// Reads the body chunk by chunk, stopping once `limit` bytes are collected
async fn read_body(response: &mut Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

// Categorizes different error types from reqwest
//
// reqwest's own Display often just says "error sending request"; the useful
// part (DNS failure, certificate problem) lives further down the source
// chain, so we flatten the whole chain before looking at it.
fn categorize_error(error: &reqwest::Error) -> TransportError {
    let chain = error_chain(error).to_lowercase();

    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_redirect() {
        TransportError::TooManyRedirects
    } else if chain.contains("certificate") || chain.contains("tls") || chain.contains("ssl") {
        TransportError::Tls
    } else if error.is_connect() {
        if chain.contains("dns") || chain.contains("resolve") || chain.contains("lookup") {
            TransportError::Dns
        } else {
            TransportError::Connect
        }
    } else {
        TransportError::Other(error_chain(error))
    }
}

fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
