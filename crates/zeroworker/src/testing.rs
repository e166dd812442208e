//! Test doubles for the network and the cache store

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use parking_lot::Mutex;
use zerostore::{
    CacheHandle, CacheStore, Error, MemoryCacheStore, Namespace, Request, Response, Result,
};

use crate::fetch::Fetcher;

/// Network double answering by URL path
///
/// Unknown paths get a 404, scripted failures and offline mode get
/// `Error::Network`. Every fetched request is recorded.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Request>>,
    offline: AtomicBool,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `body` as a 200 text/plain response for `path`
    pub(crate) fn serve(&self, path: &str, body: &'static str) {
        self.respond(
            path,
            Response::new(StatusCode::OK, body)
                .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain")),
        );
    }

    pub(crate) fn respond(&self, path: &str, response: Response) {
        self.routes.lock().insert(path.to_string(), response);
    }

    pub(crate) fn fail(&self, path: &str) {
        self.failing.lock().insert(path.to_string());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Full URLs fetched so far
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|req| req.url().to_string()).collect()
    }

    /// Requests fetched so far
    pub(crate) fn requests(&self) -> Vec<Request> {
        self.calls.lock().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.calls.lock().push(request.clone());

        let path = request.url().path();
        if self.offline.load(Ordering::SeqCst) || self.failing.lock().contains(path) {
            return Err(Error::Network(format!("unreachable: {}", request.url())));
        }

        Ok(self
            .routes
            .lock()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND, "not found")))
    }
}

/// Serve every file of the default manifests
pub(crate) fn serve_site(fetcher: &ScriptedFetcher) {
    fetcher.serve("/", "<html>home</html>");
    fetcher.serve("/app.js", "app()");
    fetcher.serve("/app.css", "body {}");
    fetcher.serve("/index.html", "<html>index</html>");
    fetcher.serve("/offline.html", "<html>offline</html>");
    fetcher.serve("/images/animated.gif", "GIF89a");
}

/// Memory store whose `delete` fails for chosen namespaces
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryCacheStore,
    undeletable: Mutex<HashSet<Namespace>>,
    listing_broken: AtomicBool,
    lookups_broken: AtomicBool,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn refuse_delete(&self, namespace: &Namespace) {
        self.undeletable.lock().insert(namespace.clone());
    }

    pub(crate) fn break_listing(&self) {
        self.listing_broken.store(true, Ordering::SeqCst);
    }

    pub(crate) fn break_lookups(&self) {
        self.lookups_broken.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn open(&self, namespace: &Namespace) -> Result<CacheHandle> {
        self.inner.open(namespace).await
    }

    async fn put(
        &self,
        handle: &CacheHandle,
        request: &Request,
        response: Response,
    ) -> Result<()> {
        self.inner.put(handle, request, response).await
    }

    async fn match_request(
        &self,
        request: &Request,
        namespace: Option<&Namespace>,
    ) -> Result<Option<Response>> {
        if self.lookups_broken.load(Ordering::SeqCst) {
            return Err(Error::Storage("lookup failed".to_string()));
        }
        self.inner.match_request(request, namespace).await
    }

    async fn namespaces(&self) -> Result<Vec<Namespace>> {
        if self.listing_broken.load(Ordering::SeqCst) {
            return Err(Error::Storage("listing failed".to_string()));
        }
        self.inner.namespaces().await
    }

    async fn has(&self, namespace: &Namespace) -> Result<bool> {
        self.inner.has(namespace).await
    }

    async fn keys(&self, handle: &CacheHandle) -> Result<Vec<Request>> {
        self.inner.keys(handle).await
    }

    async fn delete(&self, namespace: &Namespace) -> Result<bool> {
        if self.undeletable.lock().contains(namespace) {
            return Err(Error::Storage(format!("cannot delete {}", namespace)));
        }
        self.inner.delete(namespace).await
    }
}
