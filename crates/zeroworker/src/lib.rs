//! # zeroworker
//!
//! Offline caching worker for the zero proxy.
//!
//! ## Architecture
//! - **Populator**: on install, caches the priority manifest (awaited) and
//!   the background manifest (detached, best effort)
//! - **GarbageCollector**: on activate, deletes every namespace but the
//!   current one
//! - **Router**: on fetch, network-first for navigations, cache-first for
//!   everything else, with offline/404 pages and degraded responses as
//!   fallbacks
//! - **ServiceWorker**: lifecycle state machine tying the three together
//!
//! The cache store and the network are injected as [`zerostore::CacheStore`]
//! and [`Fetcher`] trait objects.

mod config;
mod fetch;
mod gc;
mod lifecycle;
mod populate;
mod router;
mod stats;
mod task;

#[cfg(test)]
mod testing;

pub use config::WorkerConfig;
pub use fetch::Fetcher;
pub use gc::{GarbageCollector, GcReport};
pub use lifecycle::{ServiceWorker, WorkerState};
pub use populate::{add_all, Populator};
pub use router::{
    cache_busted, classify, placeholder_image, Classification, Router, CACHE_BUST_PARAM,
    PLACEHOLDER_CONTENT_TYPE, PLACEHOLDER_SVG,
};
pub use stats::{WorkerStats, WorkerStatsSnapshot};
pub use task::KeepAlive;
