//! Stale namespace collection

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};
use zerostore::{CacheStore, Error, Namespace, Result};

use crate::config::WorkerConfig;
use crate::stats::WorkerStats;

/// Outcome of one collection run
#[derive(Debug, Clone, PartialEq)]
pub struct GcReport {
    /// The namespace that was kept
    pub current: Namespace,
    /// Stale namespaces that were removed
    pub deleted: Vec<Namespace>,
    /// Stale namespaces that could not be removed
    pub failures: Vec<(Namespace, Error)>,
}

impl GcReport {
    /// True when every stale namespace was removed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deletes every namespace except the current one
pub struct GarbageCollector {
    config: Arc<WorkerConfig>,
    store: Arc<dyn CacheStore>,
    stats: Arc<WorkerStats>,
}

impl GarbageCollector {
    /// Create a collector over `store`
    pub fn new(
        config: Arc<WorkerConfig>,
        store: Arc<dyn CacheStore>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            config,
            store,
            stats,
        }
    }

    /// Delete all stale namespaces concurrently
    ///
    /// Opens the current namespace first, so it exists afterwards. Each
    /// deletion fails on its own: a failed deletion is reported in
    /// [`GcReport::failures`] and does not stop the others. Only a failure to
    /// list the namespaces fails the whole run.
    pub async fn collect_garbage(&self) -> Result<GcReport> {
        let current = self.config.namespace();
        self.store.open(&current).await?;

        let stale: Vec<Namespace> = self
            .store
            .namespaces()
            .await?
            .into_iter()
            .filter(|ns| *ns != current)
            .collect();

        let outcomes = join_all(stale.into_iter().map(|ns| async move {
            let outcome = self.store.delete(&ns).await;
            (ns, outcome)
        }))
        .await;

        let mut report = GcReport {
            current,
            deleted: Vec::new(),
            failures: Vec::new(),
        };
        for (ns, outcome) in outcomes {
            match outcome {
                Ok(true) => report.deleted.push(ns),
                Ok(false) => debug!("Namespace {} already gone", ns),
                Err(e) => {
                    warn!("Failed to delete stale namespace {}: {}", ns, e);
                    report.failures.push((ns, e));
                }
            }
        }

        self.stats.record_collected(report.deleted.len());
        self.stats.record_collection_failures(report.failures.len());
        info!(
            "Collected {} stale namespaces, kept {}",
            report.deleted.len(),
            report.current
        );

        Ok(report)
    }
}
