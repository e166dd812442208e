//! Request routing
//!
//! ```text
//! navigational ─► network (cache-busted GET) ─┬─ 404 ─► stored 404 page | offline page
//!                                             ├─ ok ──► cache ─► network (original)
//!                                             └─ unreachable ─► stored offline page
//!
//! other ───────► cache ─► network ─► unreachable ─► placeholder image | empty
//! ```

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, StatusCode};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;
use zerostore::{CacheStore, Request, RequestMode, Response};

use crate::config::WorkerConfig;
use crate::fetch::Fetcher;
use crate::stats::WorkerStats;

/// Query parameter appended to defeat intermediate HTTP caches
pub const CACHE_BUST_PARAM: &str = "cache-bust";

/// Served in place of images that are neither cached nor reachable
pub const PLACEHOLDER_SVG: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
    r#"<text style="text-anchor: middle; font-family: sans-serif;" fill-opacity="0.25" x="50%" y="50%">"#,
    "image unavailable offline",
    "</text></svg>"
);

/// Content type of [`PLACEHOLDER_SVG`]
pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/svg+xml";

/// How a request is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Page navigation or HTML document: network first
    Navigational,
    /// Everything else: cache first
    Other,
}

/// Classify `request`
///
/// Navigational when the mode is navigate, or a GET whose `Accept` mentions
/// `text/html`. A missing `Accept` header never matches.
pub fn classify(request: &Request) -> Classification {
    let html_get = request.method() == Method::GET && request.accepts("text/html");
    if request.mode() == RequestMode::Navigate || html_get {
        Classification::Navigational
    } else {
        Classification::Other
    }
}

/// Copy of `url` with a unique [`CACHE_BUST_PARAM`] query pair
pub fn cache_busted(url: &Url) -> Url {
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair(CACHE_BUST_PARAM, &Uuid::new_v4().simple().to_string());
    busted
}

/// The placeholder image response
pub fn placeholder_image() -> Response {
    Response::new(StatusCode::OK, PLACEHOLDER_SVG).with_header(
        CONTENT_TYPE,
        HeaderValue::from_static(PLACEHOLDER_CONTENT_TYPE),
    )
}

/// Answers intercepted requests from the cache, the network or a fallback
pub struct Router {
    config: Arc<WorkerConfig>,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    stats: Arc<WorkerStats>,
}

impl Router {
    /// Create a router over `store` and `fetcher`
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

    /// Produce exactly one response for `request`
    ///
    /// Never fails: network and cache errors are turned into fallbacks.
    pub async fn route(&self, request: &Request) -> Response {
        let class = classify(request);
        self.stats
            .record_request(class == Classification::Navigational);

        match class {
            Classification::Navigational => self.route_navigation(request).await,
            Classification::Other => self.route_other(request).await,
        }
    }

    async fn route_navigation(&self, request: &Request) -> Response {
        // Always a bodiless GET, whatever the navigation's method.
        let busted = Request::get(cache_busted(request.url()))
            .with_headers(request.headers().clone())
            .with_mode(request.mode());

        match self.fetcher.fetch(&busted).await {
            Ok(probe) if probe.status() == StatusCode::NOT_FOUND => {
                debug!("{} answered 404, serving not-found page", request.url());
                self.not_found_page().await
            }
            Ok(_) => {
                if let Some(hit) = self.lookup(request).await {
                    return hit;
                }
                match self.network(request).await {
                    Some(response) => response,
                    None => self.offline_page().await,
                }
            }
            Err(e) => {
                debug!("Navigation to {} failed: {}", request.url(), e);
                self.stats.record_network_failure();
                self.offline_page().await
            }
        }
    }

    async fn route_other(&self, request: &Request) -> Response {
        // Only GET responses are ever stored.
        if request.method() == Method::GET {
            if let Some(hit) = self.lookup(request).await {
                return hit;
            }
        }

        match self.network(request).await {
            Some(response) => response,
            None => self.degraded(request),
        }
    }

    /// Cache lookup, current namespace first; store errors count as a miss
    async fn lookup(&self, request: &Request) -> Option<Response> {
        let current = self.config.namespace();
        let found = match self.store.match_request(request, Some(&current)).await {
            Ok(None) => self.store.match_request(request, None).await,
            found => found,
        };

        match found {
            Ok(Some(hit)) => {
                self.stats.record_cache_hit();
                Some(hit)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cache lookup for {} failed: {}", request.url(), e);
                None
            }
        }
    }

    /// Network fetch; `None` when the network is unreachable
    async fn network(&self, request: &Request) -> Option<Response> {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.stats.record_network_response();
                Some(response)
            }
            Err(e) => {
                debug!("Fetch of {} failed: {}", request.url(), e);
                self.stats.record_network_failure();
                None
            }
        }
    }

    async fn offline_page(&self) -> Response {
        self.stats.record_offline_page();
        match self.stored_page(self.config.offline_request()).await {
            Some(page) => page,
            None => {
                warn!("Offline page {} is not cached", self.config.offline_page);
                self.empty()
            }
        }
    }

    /// The stored 404 page, or the offline page when no 404 page is cached
    async fn not_found_page(&self) -> Response {
        self.stats.record_not_found_page();
        match self.stored_page(self.config.not_found_request()).await {
            Some(page) => page,
            None => {
                debug!("{} is not cached, using offline page", self.config.not_found_page);
                self.offline_page().await
            }
        }
    }

    async fn stored_page(&self, page: zerostore::Result<Request>) -> Option<Response> {
        match page {
            Ok(page) => self.lookup(&page).await,
            Err(e) => {
                warn!("Fallback page URL is invalid: {}", e);
                None
            }
        }
    }

    /// Substitute for a request neither the cache nor the network could serve
    fn degraded(&self, request: &Request) -> Response {
        if request.accepts("image") {
            self.stats.record_placeholder();
            placeholder_image()
        } else {
            self.empty()
        }
    }

    fn empty(&self) -> Response {
        self.stats.record_empty_response();
        Response::empty()
    }
}
