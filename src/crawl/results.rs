// src/crawl/results.rs
// =============================================================================
// Where workers record what happened to each URL, and the pass that turns
// those records into the final ordered report.
//
// Lifecycle of one URL:
//   reserve()   -> Slot { state: Pending }      (at admission)
//   complete()  -> Slot { state: Completed(..) } (after the fetch)
//
// URLs still Pending when the crawl stops (deadline, Ctrl-C) are dropped by
// aggregate(). Pending is its own variant, so a status code of 0 from a
// transport failure is never mistaken for "not done yet".
// =============================================================================

use crate::checker::TransportError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::warn;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// The terminal result of fetching one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// HTTP status code, or 0 when no response was received
    pub status_code: u16,
    pub status_text: String,
    pub is_error: bool,
}

impl Outcome {
    /// Builds the outcome for an HTTP response.
    ///
    /// Anything at or above `error_threshold` counts as an error.
    pub fn from_status(status_code: u16, status_text: impl Into<String>, error_threshold: u16) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            is_error: status_code >= error_threshold,
        }
    }

    /// Builds the outcome for a request that never got a response.
    pub fn from_transport(error: &TransportError) -> Self {
        Self {
            status_code: 0,
            status_text: error.to_string(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Completed(Outcome),
}

#[derive(Debug, Clone)]
struct Slot {
    /// Admission order, used to keep the report sort stable
    seq: u64,
    state: SlotState,
}

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub url: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Concurrency-safe URL -> outcome mapping shared by every worker.
#[derive(Debug, Default)]
pub struct ResultStore {
    slots: DashMap<String, Slot>,
    next_seq: AtomicU64,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a freshly admitted URL as pending. Reserving twice is a no-op.
    pub fn reserve(&self, url: &str) {
        if let Entry::Vacant(slot) = self.slots.entry(url.to_string()) {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            slot.insert(Slot {
                seq,
                state: SlotState::Pending,
            });
        }
    }

    /// Records the outcome for a reserved URL.
    ///
    /// Returns false (and changes nothing) if the URL was never reserved or
    /// already has an outcome.
    pub fn complete(&self, url: &str, outcome: Outcome) -> bool {
        match self.slots.get_mut(url) {
            Some(mut slot) => {
                if slot.state != SlotState::Pending {
                    warn!("ignoring second outcome for {}", url);
                    return false;
                }
                slot.state = SlotState::Completed(outcome);
                true
            }
            None => {
                warn!("ignoring outcome for unadmitted URL {}", url);
                false
            }
        }
    }

    #[cfg(test)]
    pub fn state(&self, url: &str) -> Option<SlotState> {
        self.slots.get(url).map(|slot| slot.state.clone())
    }

    /// Number of URLs reserved but never completed.
    pub fn pending(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Pending)
            .count()
    }
}

/// Turns a quiesced store into the ordered report.
///
/// Pending slots are dropped. Entries are sorted by descending status code;
/// equal codes keep admission order. Only call this after every worker has
/// finished, otherwise the snapshot may be mid-mutation.
pub fn aggregate(store: &ResultStore) -> Vec<ResultEntry> {
    let mut completed: Vec<(u64, ResultEntry)> = store
        .slots
        .iter()
        .filter_map(|item| match &item.state {
            SlotState::Pending => None,
            SlotState::Completed(outcome) => Some((
                item.seq,
                ResultEntry {
                    url: item.key().clone(),
                    outcome: outcome.clone(),
                },
            )),
        })
        .collect();

    // DashMap iteration order is arbitrary; restore admission order first so
    // the stable sort below breaks ties the same way every time
    completed.sort_by_key(|(seq, _)| *seq);
    completed.sort_by(|(_, a), (_, b)| b.outcome.status_code.cmp(&a.outcome.status_code));

    completed.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(code: u16) -> Outcome {
        Outcome::from_status(code, "", 400)
    }

    #[test]
    fn test_threshold_classification() {
        assert!(!Outcome::from_status(200, "OK", 203).is_error);
        assert!(Outcome::from_status(203, "Non Authoritative Information", 203).is_error);
        assert!(Outcome::from_status(500, "Internal Server Error", 203).is_error);
        assert!(!Outcome::from_status(301, "Moved Permanently", 400).is_error);
    }

    #[test]
    fn test_transport_failure_is_error_with_zero_code() {
        let outcome = Outcome::from_transport(&TransportError::Timeout);
        assert_eq!(outcome.status_code, 0);
        assert!(outcome.is_error);
        assert_eq!(outcome.status_text, "Request timed out");
    }

    #[test]
    fn test_complete_requires_reservation() {
        let store = ResultStore::new();
        assert!(!store.complete("http://example.test/", ok(200)));
        assert_eq!(store.state("http://example.test/"), None);
    }

    #[test]
    fn test_complete_only_once() {
        let store = ResultStore::new();
        store.reserve("http://example.test/");
        assert!(store.complete("http://example.test/", ok(200)));
        assert!(!store.complete("http://example.test/", ok(500)));
        assert_eq!(
            store.state("http://example.test/"),
            Some(SlotState::Completed(ok(200)))
        );
    }

    #[test]
    fn test_aggregate_drops_pending() {
        let store = ResultStore::new();
        store.reserve("http://example.test/");
        store.reserve("http://example.test/never");
        store.complete("http://example.test/", ok(200));

        let report = aggregate(&store);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].url, "http://example.test/");
        assert_eq!(store.pending(), 1);
    }

    #[test]
    fn test_aggregate_keeps_zero_status_transport_failures() {
        let store = ResultStore::new();
        store.reserve("http://example.test/down");
        store.complete(
            "http://example.test/down",
            Outcome::from_transport(&TransportError::Connect),
        );
        let report = aggregate(&store);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].outcome.status_code, 0);
    }

    #[test]
    fn test_aggregate_orders_by_status_then_admission() {
        let store = ResultStore::new();
        let urls = ["/a", "/b", "/c", "/d", "/e"];
        let codes = [200, 404, 200, 500, 404];
        for url in urls {
            store.reserve(url);
        }
        // complete in reverse to show completion order doesn't matter
        for (url, code) in urls.iter().zip(codes).rev() {
            store.complete(url, ok(code));
        }

        let order: Vec<_> = aggregate(&store).into_iter().map(|e| e.url).collect();
        assert_eq!(order, vec!["/d", "/b", "/e", "/a", "/c"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let store = ResultStore::new();
        for (i, code) in [301, 200, 404, 200].into_iter().enumerate() {
            let url = format!("/page{}", i);
            store.reserve(&url);
            store.complete(&url, ok(code));
        }
        assert_eq!(aggregate(&store), aggregate(&store));
    }
}
