//! Cache population from the file manifests
//!
//! Both manifests go through the same all-or-nothing bulk add: every file is
//! fetched concurrently and nothing is stored unless all of them came back
//! with a 2xx status.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};
use zerostore::{CacheHandle, CacheStore, Error, Request, Result};

use crate::config::WorkerConfig;
use crate::fetch::Fetcher;
use crate::stats::WorkerStats;
use crate::task::KeepAlive;

/// Fetch every request and store all responses, or store nothing
///
/// Returns the number of stored entries.
pub async fn add_all(
    store: &dyn CacheStore,
    fetcher: &dyn Fetcher,
    handle: &CacheHandle,
    requests: &[Request],
) -> Result<usize> {
    let responses = try_join_all(requests.iter().map(|request| async move {
        let response = fetcher.fetch(request).await?;
        if !response.is_success() {
            return Err(Error::BadStatus {
                url: request.url().to_string(),
                status: response.status(),
            });
        }
        Ok(response)
    }))
    .await?;

    for (request, response) in requests.iter().zip(responses) {
        store.put(handle, request, response).await?;
    }

    Ok(requests.len())
}

/// Loads the priority and background manifests into the current namespace
pub struct Populator {
    config: Arc<WorkerConfig>,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    stats: Arc<WorkerStats>,
}

impl Populator {
    /// Create a populator writing to `store`
    pub fn new(
        config: Arc<WorkerConfig>,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn Fetcher>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
            stats,
        }
    }

    /// Populate the current namespace
    ///
    /// Starts the background manifest as a detached task, then stores the
    /// priority manifest and waits for it. Fails if any priority file cannot
    /// be fetched or stored. Background failures never surface here; they are
    /// logged and counted in [`WorkerStats`]. The returned handle can be
    /// dropped or awaited for the background outcome.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn populate(&self) -> Result<KeepAlive<usize>> {
        let namespace = self.config.namespace();
        let handle = self.store.open(&namespace).await?;

        let background = self.spawn_background(handle.clone());

        let requests = self.config.requests_for(&self.config.priority_files)?;
        let stored = add_all(&*self.store, &*self.fetcher, &handle, &requests).await?;
        self.stats.record_priority_stored(stored);
        info!("Cached {} priority files in {}", stored, namespace);

        Ok(background)
    }

    fn spawn_background(&self, handle: CacheHandle) -> KeepAlive<usize> {
        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);
        let fetcher = Arc::clone(&self.fetcher);
        let stats = Arc::clone(&self.stats);

        KeepAlive::spawn(async move {
            let outcome = match config.requests_for(&config.background_files) {
                Ok(requests) => add_all(&*store, &*fetcher, &handle, &requests).await,
                Err(e) => Err(e),
            };

            match &outcome {
                Ok(stored) => {
                    stats.record_background_stored(*stored);
                    debug!("Cached {} background files in {}", stored, handle.namespace());
                }
                Err(e) => {
                    stats.record_background_failure();
                    warn!("Background caching failed for {}: {}", handle.namespace(), e);
                }
            }
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{serve_site, ScriptedFetcher};
    use http::StatusCode;
    use url::Url;
    use zerostore::{MemoryCacheStore, Response};

    fn new_populator(
        config: WorkerConfig,
        store: &Arc<MemoryCacheStore>,
        fetcher: &Arc<ScriptedFetcher>,
    ) -> (Populator, Arc<WorkerStats>) {
        let stats = Arc::new(WorkerStats::new());
        let populator = Populator::new(
            Arc::new(config),
            store.clone(),
            fetcher.clone(),
            Arc::clone(&stats),
        );
        (populator, stats)
    }

    #[tokio::test]
    async fn test_populate_stores_both_manifests() {
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        serve_site(&fetcher);
        let config = WorkerConfig::default();
        let namespace = config.namespace();
        let (populator, stats) = new_populator(config, &store, &fetcher);

        let background = populator.populate().await.unwrap();
        assert_eq!(background.await.unwrap(), 1);

        assert_eq!(store.entry_count(&namespace), 6);
        let gif = Request::get(Url::parse("http://localhost/images/animated.gif").unwrap());
        assert!(store.match_request(&gif, Some(&namespace)).await.unwrap().is_some());
        assert_eq!(stats.snapshot().priority_stored, 5);
        assert_eq!(stats.background_failures(), 0);
    }

    #[tokio::test]
    async fn test_priority_network_failure_rejects() {
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.set_offline(true);
        let config = WorkerConfig {
            priority_files: vec!["/".to_string(), "app.js".to_string()],
            background_files: Vec::new(),
            ..WorkerConfig::default()
        };
        let namespace = config.namespace();
        let (populator, _) = new_populator(config, &store, &fetcher);

        let result = populator.populate().await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(store.entry_count(&namespace), 0);
    }

    #[tokio::test]
    async fn test_priority_bad_status_stores_nothing() {
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("/", "<html>home</html>");
        fetcher.respond("/app.js", Response::new(StatusCode::INTERNAL_SERVER_ERROR, "oops"));
        let config = WorkerConfig {
            priority_files: vec!["/".to_string(), "app.js".to_string()],
            background_files: Vec::new(),
            ..WorkerConfig::default()
        };
        let namespace = config.namespace();
        let (populator, _) = new_populator(config, &store, &fetcher);

        let result = populator.populate().await;
        assert!(matches!(
            result,
            Err(Error::BadStatus { status, .. }) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert_eq!(store.entry_count(&namespace), 0);
    }

    #[tokio::test]
    async fn test_background_failure_is_isolated_and_counted() {
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        serve_site(&fetcher);
        fetcher.fail("/images/animated.gif");
        let config = WorkerConfig::default();
        let namespace = config.namespace();
        let (populator, stats) = new_populator(config, &store, &fetcher);

        let background = populator.populate().await.unwrap();
        assert!(matches!(background.await, Err(Error::Network(_))));

        assert_eq!(store.entry_count(&namespace), 5);
        assert_eq!(stats.background_failures(), 1);
    }

    #[tokio::test]
    async fn test_populate_twice_is_idempotent() {
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        serve_site(&fetcher);
        let config = WorkerConfig::default();
        let namespace = config.namespace();
        let (populator, _) = new_populator(config, &store, &fetcher);

        populator.populate().await.unwrap().await.unwrap();
        let first = keys(&store, &namespace).await;

        populator.populate().await.unwrap().await.unwrap();
        let second = keys(&store, &namespace).await;

        assert_eq!(first, second);
        assert_eq!(second.len(), 6);
    }

    async fn keys(store: &MemoryCacheStore, namespace: &zerostore::Namespace) -> Vec<String> {
        let handle = store.open(namespace).await.unwrap();
        let mut urls: Vec<String> = store
            .keys(&handle)
            .await
            .unwrap()
            .iter()
            .map(|req| req.url().to_string())
            .collect();
        urls.sort();
        urls
    }
}
