//! Worker statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for routing and cache maintenance
#[derive(Debug, Default)]
pub struct WorkerStats {
    requests: AtomicU64,
    navigations: AtomicU64,
    cache_hits: AtomicU64,
    network_responses: AtomicU64,
    network_failures: AtomicU64,
    offline_pages: AtomicU64,
    not_found_pages: AtomicU64,
    placeholders: AtomicU64,
    empty_responses: AtomicU64,
    priority_stored: AtomicU64,
    background_stored: AtomicU64,
    background_failures: AtomicU64,
    namespaces_collected: AtomicU64,
    collection_failures: AtomicU64,
}

/// Point-in-time copy of [`WorkerStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerStatsSnapshot {
    pub requests: u64,
    pub navigations: u64,
    pub cache_hits: u64,
    pub network_responses: u64,
    pub network_failures: u64,
    pub offline_pages: u64,
    pub not_found_pages: u64,
    pub placeholders: u64,
    pub empty_responses: u64,
    pub priority_stored: u64,
    pub background_stored: u64,
    pub background_failures: u64,
    pub namespaces_collected: u64,
    pub collection_failures: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

fn add(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
}

impl WorkerStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self, navigational: bool) {
        bump(&self.requests);
        if navigational {
            bump(&self.navigations);
        }
    }

    pub(crate) fn record_cache_hit(&self) {
        bump(&self.cache_hits);
    }

    pub(crate) fn record_network_response(&self) {
        bump(&self.network_responses);
    }

    pub(crate) fn record_network_failure(&self) {
        bump(&self.network_failures);
    }

    pub(crate) fn record_offline_page(&self) {
        bump(&self.offline_pages);
    }

    pub(crate) fn record_not_found_page(&self) {
        bump(&self.not_found_pages);
    }

    pub(crate) fn record_placeholder(&self) {
        bump(&self.placeholders);
    }

    pub(crate) fn record_empty_response(&self) {
        bump(&self.empty_responses);
    }

    pub(crate) fn record_priority_stored(&self, n: usize) {
        add(&self.priority_stored, n as u64);
    }

    pub(crate) fn record_background_stored(&self, n: usize) {
        add(&self.background_stored, n as u64);
    }

    pub(crate) fn record_background_failure(&self) {
        bump(&self.background_failures);
    }

    pub(crate) fn record_collected(&self, n: usize) {
        add(&self.namespaces_collected, n as u64);
    }

    pub(crate) fn record_collection_failures(&self, n: usize) {
        add(&self.collection_failures, n as u64);
    }

    /// Failed background population runs
    pub fn background_failures(&self) -> u64 {
        self.background_failures.load(Ordering::Relaxed)
    }

    /// Responses served straight from the cache
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Fetches that failed to reach the network
    pub fn network_failures(&self) -> u64 {
        self.network_failures.load(Ordering::Relaxed)
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        WorkerStatsSnapshot {
            requests: load(&self.requests),
            navigations: load(&self.navigations),
            cache_hits: load(&self.cache_hits),
            network_responses: load(&self.network_responses),
            network_failures: load(&self.network_failures),
            offline_pages: load(&self.offline_pages),
            not_found_pages: load(&self.not_found_pages),
            placeholders: load(&self.placeholders),
            empty_responses: load(&self.empty_responses),
            priority_stored: load(&self.priority_stored),
            background_stored: load(&self.background_stored),
            background_failures: load(&self.background_failures),
            namespaces_collected: load(&self.namespaces_collected),
            collection_failures: load(&self.collection_failures),
        }
    }
}
