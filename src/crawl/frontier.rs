// src/crawl/frontier.rs
// =============================================================================
// The set of every URL admitted for crawling in this run, with its depth.
//
// try_admit() is the one place where duplicate visits are prevented. Several
// workers may discover the same link at the same moment; DashMap's entry API
// makes the membership check and the insert a single step under one shard
// lock, so exactly one caller wins.
// =============================================================================

use crate::checker::LinkKind;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// A URL admitted for crawling. Created once, at first discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
    /// How the URL was discovered (the seed counts as a hyperlink)
    pub kind: LinkKind,
}

#[derive(Debug)]
pub struct Frontier {
    max_depth: usize,
    admitted: DashMap<String, FrontierEntry>,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            admitted: DashMap::new(),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Atomically admits `url` unless it was admitted before or lies deeper
    /// than the max depth. Returns true only to the caller that won.
    pub fn try_admit(&self, url: &str, depth: usize, kind: LinkKind) -> bool {
        if depth > self.max_depth {
            return false;
        }

        match self.admitted.entry(url.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(FrontierEntry {
                    url: url.to_string(),
                    depth,
                    kind,
                });
                true
            }
        }
    }

    #[cfg(test)]
    pub fn depth_of(&self, url: &str) -> Option<usize> {
        self.admitted.get(url).map(|entry| entry.depth)
    }

    pub fn len(&self) -> usize {
        self.admitted.len()
    }
}
