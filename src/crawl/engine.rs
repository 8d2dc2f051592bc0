// src/crawl/engine.rs
// =============================================================================
// This module drives the crawl: it fetches admitted URLs concurrently and
// feeds the links they contain back into the frontier.
//
// How it works:
// 1. Admit the seed at depth 0 and spawn a worker task for it
// 2. Each worker waits for a permit (at most `workers` fetches run at once),
//    sleeps a random jitter, fetches the page and records the outcome
// 3. The worker resolves every link on the page, keeps the in-scope ones,
//    and admits them at depth + 1; the winners are handed back to the loop
// 4. The loop spawns a new worker for each winner
// 5. When the JoinSet is empty, nothing is running or queued: we're done
//
// Cancellation:
// - Workers check the deadline before fetching, and race the jitter sleep
//   and the fetch itself against it
// - URLs abandoned this way stay Pending and are left out of the report
//
// Rust concepts:
// - Arc: One CrawlSession shared by every worker task
// - JoinSet: A set of spawned tasks we can wait on one by one
// - Semaphore: Caps how many workers fetch at the same time
// - tokio::select!: Whichever future finishes first wins, the other is dropped
// =============================================================================

use super::deadline::Deadline;
use super::frontier::{Frontier, FrontierEntry};
use super::results::{aggregate, Outcome, ResultEntry, ResultStore};
use super::scope::ScopeFilter;
use crate::checker::{FetchError, FetchedPage, Fetcher, LinkKind, TransportError};
use crate::config::{CrawlConfig, ResourcePolicy};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// What a finished crawl hands back.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Completed URLs, sorted by descending status code
    pub entries: Vec<ResultEntry>,
    /// Number of URLs admitted to the frontier
    pub admitted: usize,
    /// Admitted URLs that never got an outcome (deadline or Ctrl-C)
    pub abandoned: usize,
    /// True if the deadline fired (or the crawl was cancelled) before the end
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_error).count()
    }
}

// Everything one crawl run shares between its workers
struct CrawlSession<F> {
    config: CrawlConfig,
    fetcher: Arc<F>,
    scope: ScopeFilter,
    frontier: Frontier,
    results: ResultStore,
    deadline: Deadline,
    permits: Semaphore,
}

impl<F> CrawlSession<F> {
    // Admits a URL to the frontier and reserves its result slot.
    // Only the caller that wins the admission gets an entry back.
    fn admit(&self, url: &str, depth: usize, kind: LinkKind) -> Option<FrontierEntry> {
        if !self.frontier.try_admit(url, depth, kind) {
            return None;
        }
        self.results.reserve(url);

        Some(FrontierEntry {
            url: url.to_string(),
            depth,
            kind,
        })
    }

    fn should_expand(&self, entry: &FrontierEntry) -> bool {
        if entry.depth >= self.frontier.max_depth() {
            return false;
        }
        !(entry.kind == LinkKind::Resource && self.config.resources == ResourcePolicy::Leaf)
    }
}

/// One crawl run. Build it, grab the deadline if you want to cancel early,
/// then call run().
pub struct Crawler<F> {
    session: Arc<CrawlSession<F>>,
}

impl<F: Fetcher + 'static> Crawler<F> {
    /// Creates the crawl session. The deadline clock starts here.
    pub fn new(config: CrawlConfig, fetcher: Arc<F>) -> Self {
        let scope = ScopeFilter::new(&config.seed, config.scope);
        let frontier = Frontier::new(config.max_depth);
        let deadline = Deadline::start(config.deadline);
        let permits = Semaphore::new(config.workers);

        Self {
            session: Arc::new(CrawlSession {
                config,
                fetcher,
                scope,
                frontier,
                results: ResultStore::new(),
                deadline,
                permits,
            }),
        }
    }

    /// Handle to the crawl-wide deadline; call `cancel()` on it to stop early.
    pub fn deadline(&self) -> Deadline {
        self.session.deadline.clone()
    }

    /// Crawls until no work is left or the deadline fires.
    pub async fn run(self) -> CrawlSummary {
        let session = self.session;

        let mut seed = session.config.seed.clone();
        seed.set_fragment(None);

        let mut workers = JoinSet::new();
        if let Some(entry) = session.admit(seed.as_str(), 0, LinkKind::Hyperlink) {
            workers.spawn(visit(Arc::clone(&session), entry));
        }

        // The join over every spawned worker is the end-of-crawl barrier:
        // new work can only come from a worker that is still in this set
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(discovered) => {
                    for entry in discovered {
                        workers.spawn(visit(Arc::clone(&session), entry));
                    }
                }
                Err(e) => warn!("crawl worker failed: {}", e),
            }
        }

        let entries = aggregate(&session.results);
        let summary = CrawlSummary {
            admitted: session.frontier.len(),
            abandoned: session.results.pending(),
            cancelled: session.deadline.expired(),
            elapsed: session.deadline.elapsed(),
            entries,
        };

        info!(
            "crawl finished: {} admitted, {} completed, {} abandoned in {:.2?}",
            summary.admitted,
            summary.entries.len(),
            summary.abandoned,
            summary.elapsed
        );

        summary
    }
}

// One unit of work: fetch one URL, record it, return the newly admitted links
async fn visit<F: Fetcher>(session: Arc<CrawlSession<F>>, entry: FrontierEntry) -> Vec<FrontierEntry> {
    let deadline = &session.deadline;

    // Held until this function returns, so jitter counts against the ceiling
    let _permit = tokio::select! {
        permit = session.permits.acquire() => match permit {
            Ok(permit) => permit,
            Err(_) => return Vec::new(),
        },
        _ = deadline.cancelled() => return Vec::new(),
    };

    if deadline.expired() {
        debug!("deadline reached, skipping {}", entry.url);
        return Vec::new();
    }

    let jitter = random_jitter(session.config.jitter);
    if !jitter.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(jitter) => {}
            _ = deadline.cancelled() => return Vec::new(),
        }
    }

    // Last checkpoint before the request goes out
    if deadline.expired() {
        debug!("deadline reached, skipping {}", entry.url);
        return Vec::new();
    }

    let url = match Url::parse(&entry.url) {
        Ok(url) => url,
        Err(e) => {
            let error = TransportError::Other(format!("invalid URL: {}", e));
            session.results.complete(&entry.url, Outcome::from_transport(&error));
            return Vec::new();
        }
    };

    info!("Crawling [depth {}]: {}", entry.depth, entry.url);

    let fetched = tokio::select! {
        result = session.fetcher.fetch(&url, session.config.request_timeout, deadline) => result,
        _ = deadline.cancelled() => Err(FetchError::Cancelled),
    };

    let page = match fetched {
        Ok(page) => page,
        Err(FetchError::Cancelled) => {
            debug!("abandoned in-flight request for {}", entry.url);
            return Vec::new();
        }
        Err(FetchError::Transport(error)) => {
            debug!("request for {} failed: {}", entry.url, error);
            session.results.complete(&entry.url, Outcome::from_transport(&error));
            return Vec::new();
        }
    };

    let outcome = Outcome::from_status(
        page.status_code,
        page.status_text.clone(),
        session.config.error_threshold,
    );
    debug!("{} -> {} {}", entry.url, outcome.status_code, outcome.status_text);
    session.results.complete(&entry.url, outcome);

    if !session.should_expand(&entry) {
        return Vec::new();
    }

    discover(&session, &page, entry.depth + 1)
}

// Resolves, scope-checks and admits every link on a page
fn discover<F>(session: &CrawlSession<F>, page: &FetchedPage, depth: usize) -> Vec<FrontierEntry> {
    let mut admitted = Vec::new();

    for link in &page.links {
        let Some(candidate) = resolve_link(&page.base, &link.raw) else {
            continue;
        };

        if !session.scope.in_scope(&candidate) {
            continue;
        }

        if let Some(entry) = session.admit(candidate.as_str(), depth, link.kind) {
            admitted.push(entry);
        }
    }

    admitted
}

// Resolves a link (possibly relative) to an absolute, fragment-free URL
fn resolve_link(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();

    // Skip empty values, anchors and special protocols
    if raw.is_empty()
        || raw.starts_with('#')
        || raw.starts_with("mailto:")
        || raw.starts_with("tel:")
        || raw.starts_with("javascript:")
        || raw.starts_with("data:")
    {
        return None;
    }

    let mut url = base.join(raw).ok()?;
    url.set_fragment(None);
    Some(url)
}

// Uniform random delay in [0, max)
fn random_jitter(max: Duration) -> Duration {
    let max_micros = u64::try_from(max.as_micros()).unwrap_or(u64::MAX);
    if max_micros == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rand::rng().random_range(0..max_micros))
}
