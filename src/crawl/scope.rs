// src/crawl/scope.rs
// =============================================================================
// Decides which discovered URLs the crawler is allowed to visit.
//
// Two policies:
// - Host: any http(s) URL on the seed's host
// - Endpoint: only URLs at or below the seed's path
//
// Hosts are compared as whole values and paths on segment boundaries, so
// "example.com.evil.net" never passes for "example.com" and "/docsearch"
// never passes for "/docs".
// =============================================================================

use crate::config::ScopePolicy;
use url::Url;

/// Scope check configured once from the seed URL.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    policy: ScopePolicy,
    seed: Url,
}

impl ScopeFilter {
    pub fn new(seed: &Url, policy: ScopePolicy) -> Self {
        Self {
            policy,
            seed: seed.clone(),
        }
    }

    /// Returns true if `candidate` may be admitted to the frontier.
    pub fn in_scope(&self, candidate: &Url) -> bool {
        if !matches!(candidate.scheme(), "http" | "https") {
            return false;
        }

        let same_host = match (candidate.host_str(), self.seed.host_str()) {
            (Some(candidate_host), Some(seed_host)) => candidate_host == seed_host,
            _ => false,
        };
        if !same_host {
            return false;
        }

        match self.policy {
            ScopePolicy::Host => true,
            ScopePolicy::Endpoint => {
                candidate.scheme() == self.seed.scheme()
                    && candidate.port_or_known_default() == self.seed.port_or_known_default()
                    && is_path_under(self.seed.path(), candidate.path())
            }
        }
    }
}

// Prefix match that only succeeds on a '/' boundary
//
// Examples with base "/docs":
//   "/docs"      -> true
//   "/docs/"     -> true
//   "/docs/a"    -> true
//   "/docsearch" -> false
fn is_path_under(base: &str, path: &str) -> bool {
    if base.ends_with('/') {
        return path.starts_with(base);
    }

    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
