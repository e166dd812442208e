//! Worker lifecycle: install, activate, fetch
//!
//! ```text
//! Parsed ─install─► Installing ─ok──► Installed ─activate─► Activating ─► Activated
//!                        │
//!                        └─err─► Redundant
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{error, info, warn};
use zerostore::{CacheStore, Error, Request, Response, Result};

use crate::config::WorkerConfig;
use crate::fetch::Fetcher;
use crate::gc::{GarbageCollector, GcReport};
use crate::populate::Populator;
use crate::router::Router;
use crate::stats::WorkerStats;
use crate::task::KeepAlive;

/// Where the worker is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Constructed, nothing cached yet
    Parsed,
    /// Priority files are being cached
    Installing,
    /// Cache is ready, waiting for activation
    Installed,
    /// Stale namespaces are being collected
    Activating,
    /// Intercepting requests
    Activated,
    /// Installation failed; the caching layer never becomes active
    Redundant,
}

/// The offline caching worker as seen by its host
///
/// The host drives it with three signals: [`install`](Self::install),
/// [`activate`](Self::activate) and [`fetch`](Self::fetch).
pub struct ServiceWorker {
    config: Arc<WorkerConfig>,
    fetcher: Arc<dyn Fetcher>,
    populator: Arc<Populator>,
    collector: Arc<GarbageCollector>,
    router: Router,
    stats: Arc<WorkerStats>,
    state: Arc<RwLock<WorkerState>>,
}

impl ServiceWorker {
    /// Wire a worker over `store` and `fetcher`
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let config = Arc::new(config);
        let stats = Arc::new(WorkerStats::new());

        let populator = Populator::new(
            Arc::clone(&config),
            Arc::clone(&store),
            Arc::clone(&fetcher),
            Arc::clone(&stats),
        );
        let collector =
            GarbageCollector::new(Arc::clone(&config), Arc::clone(&store), Arc::clone(&stats));
        let router = Router::new(
            Arc::clone(&config),
            store,
            Arc::clone(&fetcher),
            Arc::clone(&stats),
        );

        Self {
            config,
            fetcher,
            populator: Arc::new(populator),
            collector: Arc::new(collector),
            router,
            stats,
            state: Arc::new(RwLock::new(WorkerState::Parsed)),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    /// Worker configuration
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Routing and maintenance counters
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Handle the install signal: populate the current namespace
    ///
    /// The work keeps running even if the returned handle is dropped. On
    /// failure the worker becomes [`WorkerState::Redundant`]. Installing an
    /// already installed worker repopulates it.
    ///
    /// Must be called inside a tokio runtime.
    pub fn install(&self) -> KeepAlive<()> {
        let state = Arc::clone(&self.state);
        let populator = Arc::clone(&self.populator);
        let namespace = self.config.namespace();

        KeepAlive::spawn(async move {
            transition(
                &state,
                &[WorkerState::Parsed, WorkerState::Installed],
                WorkerState::Installing,
            )?;
            info!("Installing {}", namespace);

            match populator.populate().await {
                Ok(_background) => {
                    *state.write() = WorkerState::Installed;
                    info!("Installed {}", namespace);
                    Ok(())
                }
                Err(e) => {
                    *state.write() = WorkerState::Redundant;
                    error!("Install of {} failed: {}", namespace, e);
                    Err(e)
                }
            }
        })
    }

    /// Handle the activate signal: delete every stale namespace
    ///
    /// The worker is activated once collection has run, even if some
    /// namespaces could not be deleted (see [`GcReport::failures`]) or the
    /// namespaces could not be listed (returned as the error).
    ///
    /// Must be called inside a tokio runtime.
    pub fn activate(&self) -> KeepAlive<GcReport> {
        let state = Arc::clone(&self.state);
        let collector = Arc::clone(&self.collector);

        KeepAlive::spawn(async move {
            transition(&state, &[WorkerState::Installed], WorkerState::Activating)?;

            let report = collector.collect_garbage().await;
            *state.write() = WorkerState::Activated;

            match &report {
                Ok(report) if !report.is_clean() => {
                    warn!("Activated with {} undeleted namespaces", report.failures.len())
                }
                Ok(_) => info!("Activated"),
                Err(e) => warn!("Activated without collecting stale namespaces: {}", e),
            }
            report
        })
    }

    /// Handle the fetch signal: answer `request` exactly once
    ///
    /// Before activation the request goes straight to the network.
    pub async fn fetch(&self, request: &Request) -> Response {
        if self.state() == WorkerState::Activated {
            return self.router.route(request).await;
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Uncontrolled fetch of {} failed: {}", request.url(), e);
                Response::empty()
            }
        }
    }
}

fn transition(
    state: &RwLock<WorkerState>,
    allowed: &[WorkerState],
    next: WorkerState,
) -> Result<()> {
    let mut current = state.write();
    if !allowed.contains(&*current) {
        return Err(Error::InvalidState(format!(
            "cannot move from {:?} to {:?}",
            *current, next
        )));
    }
    *current = next;
    Ok(())
}
