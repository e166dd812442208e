//! Worker configuration

use serde::{Deserialize, Serialize};
use url::Url;
use zerostore::{Error, Namespace, Request, Result};

/// Default cache name
pub const DEFAULT_CACHE_NAME: &str = "zero";

/// Default version tag
pub const DEFAULT_CACHE_VERSION: &str = "v1.0.2";

/// Default offline page
pub const DEFAULT_OFFLINE_PAGE: &str = "offline.html";

/// Default 404 page
pub const DEFAULT_NOT_FOUND_PAGE: &str = "404.html";

/// Immutable settings shared by the populator, collector and router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Logical cache name
    pub cache_name: String,

    /// Version tag; bumping it makes every older namespace stale
    pub cache_version: String,

    /// Base URL that manifest and page paths are resolved against
    pub scope: Url,

    /// Page served to navigations while the network is unreachable
    pub offline_page: String,

    /// Page served to navigations the network answers with 404
    pub not_found_page: String,

    /// Files that must be cached before installation succeeds
    pub priority_files: Vec<String>,

    /// Files cached in the background, best effort
    pub background_files: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            scope: Url::parse("http://localhost/").expect("static URL is valid"),
            offline_page: DEFAULT_OFFLINE_PAGE.to_string(),
            not_found_page: DEFAULT_NOT_FOUND_PAGE.to_string(),
            priority_files: ["/", "app.js", "app.css", "index.html", "offline.html"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            background_files: vec!["images/animated.gif".to_string()],
        }
    }
}

impl WorkerConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Parse(format!("worker config: {}", e)))
    }

    /// Same config served from a different base URL
    pub fn with_scope(mut self, scope: Url) -> Self {
        self.scope = scope;
        self
    }

    /// The current namespace, `cache_name::cache_version`
    pub fn namespace(&self) -> Namespace {
        Namespace::versioned(&self.cache_name, &self.cache_version)
    }

    /// Resolve a manifest or page path against the scope
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.scope.join(path)?)
    }

    /// GET requests for a list of paths
    pub fn requests_for(&self, paths: &[String]) -> Result<Vec<Request>> {
        paths
            .iter()
            .map(|path| self.resolve(path).map(Request::get))
            .collect()
    }

    /// GET request for the offline page
    pub fn offline_request(&self) -> Result<Request> {
        self.resolve(&self.offline_page).map(Request::get)
    }

    /// GET request for the 404 page
    pub fn not_found_request(&self) -> Result<Request> {
        self.resolve(&self.not_found_page).map(Request::get)
    }
}
