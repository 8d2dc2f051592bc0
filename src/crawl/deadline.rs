// src/crawl/deadline.rs
// =============================================================================
// One wall-clock deadline shared by every worker in a crawl.
//
// Workers poll expired() at their checkpoints and race in-flight requests
// against cancelled(). A manual cancel() (Ctrl-C) trips the same signal.
//
// Cloning a Deadline is cheap: the clones share one CancellationToken.
// =============================================================================

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// Stand-in expiry for budgets too large to add to an Instant (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    expires_at: Instant,
    token: CancellationToken,
}

impl Deadline {
    /// Starts the clock now; the deadline fires `budget` from now.
    ///
    /// A budget that overflows the clock is treated as "never".
    pub fn start(budget: Duration) -> Self {
        let started = Instant::now();
        let expires_at = started
            .checked_add(budget)
            .unwrap_or_else(|| started + FAR_FUTURE);
        Self {
            started,
            expires_at,
            token: CancellationToken::new(),
        }
    }

    /// Non-blocking check, safe to call from any worker at any time.
    pub fn expired(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        if Instant::now() >= self.expires_at {
            self.token.cancel();
            return true;
        }
        false
    }

    /// Resolves once the deadline passes or cancel() is called.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = tokio::time::sleep_until(self.expires_at) => self.token.cancel(),
        }
    }

    /// Ends the crawl early.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
