//! The cache store contract

use async_trait::async_trait;

use crate::error::Result;
use crate::message::{Request, Response};
use crate::namespace::Namespace;

/// Handle to an opened namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHandle {
    namespace: Namespace,
}

impl CacheHandle {
    /// Handle for `namespace`; stores hand these out from [`CacheStore::open`]
    pub fn new(namespace: Namespace) -> Self {
        Self { namespace }
    }

    /// The namespace this handle writes to
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

/// Key-value store mapping request identity to a stored response,
/// partitioned by namespace
///
/// Implementations must tolerate concurrent callers. Every operation may
/// fail with a storage error; a lookup that finds nothing is `Ok(None)`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open `namespace`, creating it if it does not exist
    async fn open(&self, namespace: &Namespace) -> Result<CacheHandle>;

    /// Store `response` for `request`, replacing any entry with the same key
    ///
    /// Only GET requests can be stored.
    async fn put(&self, handle: &CacheHandle, request: &Request, response: Response)
        -> Result<()>;

    /// Look up `request` in `namespace`, or in every namespace when `None`
    ///
    /// The search order across namespaces is unspecified.
    async fn match_request(
        &self,
        request: &Request,
        namespace: Option<&Namespace>,
    ) -> Result<Option<Response>>;

    /// All existing namespaces
    async fn namespaces(&self) -> Result<Vec<Namespace>>;

    /// Whether `namespace` exists
    async fn has(&self, namespace: &Namespace) -> Result<bool>;

    /// Requests stored under `handle`
    async fn keys(&self, handle: &CacheHandle) -> Result<Vec<Request>>;

    /// Delete `namespace` with all of its entries
    ///
    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, namespace: &Namespace) -> Result<bool>;
}
