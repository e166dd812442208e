//! In-memory cache store
//!
//! Namespaces are kept in creation order; entries inside a namespace are
//! keyed by URL (fragment stripped) and may hold several variants when the
//! stored responses carry a `Vary` header.

use std::collections::HashMap;

use ahash::RandomState;
use async_trait::async_trait;
use http::{HeaderValue, Method};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::message::{Request, Response};
use crate::namespace::Namespace;
use crate::stats::StoreStats;
use crate::store::{CacheHandle, CacheStore};

/// One stored request/response pair
#[derive(Debug, Clone)]
struct StoredEntry {
    request: Request,
    response: Response,
}

impl StoredEntry {
    /// Whether `request` selects this entry, honoring the stored `Vary`
    fn matches(&self, request: &Request) -> bool {
        self.response.vary().iter().all(|name| {
            if name == "*" {
                return false;
            }
            let stored: Vec<&HeaderValue> =
                self.request.headers().get_all(name.as_str()).iter().collect();
            let incoming: Vec<&HeaderValue> =
                request.headers().get_all(name.as_str()).iter().collect();
            stored == incoming
        })
    }

    /// `Vary: *` entries can never be selected, so a new put replaces them
    fn is_unmatchable(&self) -> bool {
        self.response.vary().iter().any(|name| name == "*")
    }
}

/// Entries of one namespace: cache URL -> variants
type Partition = HashMap<String, Vec<StoredEntry>, RandomState>;

/// Cache store held entirely in memory
pub struct MemoryCacheStore {
    /// Namespaces in creation order
    partitions: RwLock<Vec<(Namespace, Partition)>>,

    /// Store statistics
    stats: StoreStats,
}

impl MemoryCacheStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(Vec::new()),
            stats: StoreStats::new(),
        }
    }

    /// Get store statistics
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Number of stored entries in `namespace` (0 if it does not exist)
    pub fn entry_count(&self, namespace: &Namespace) -> usize {
        self.partitions
            .read()
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, partition)| partition.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn open(&self, namespace: &Namespace) -> Result<CacheHandle> {
        let mut partitions = self.partitions.write();
        if !partitions.iter().any(|(ns, _)| ns == namespace) {
            partitions.push((namespace.clone(), HashMap::with_hasher(RandomState::new())));
        }
        Ok(CacheHandle::new(namespace.clone()))
    }

    async fn put(
        &self,
        handle: &CacheHandle,
        request: &Request,
        response: Response,
    ) -> Result<()> {
        if request.method() != Method::GET {
            return Err(Error::UnsupportedMethod(request.method().clone()));
        }

        let mut partitions = self.partitions.write();
        let partition = partitions
            .iter_mut()
            .find(|(ns, _)| ns == handle.namespace())
            .map(|(_, partition)| partition)
            .ok_or_else(|| Error::NamespaceMissing(handle.namespace().to_string()))?;

        let variants = partition.entry(request.cache_url()).or_default();
        variants.retain(|entry| !entry.is_unmatchable() && !entry.matches(request));
        variants.push(StoredEntry {
            request: request.clone(),
            response,
        });
        self.stats.record_put();

        Ok(())
    }

    async fn match_request(
        &self,
        request: &Request,
        namespace: Option<&Namespace>,
    ) -> Result<Option<Response>> {
        if request.method() != Method::GET {
            self.stats.record_miss();
            return Ok(None);
        }

        let key = request.cache_url();
        let partitions = self.partitions.read();
        let found = partitions
            .iter()
            .filter(|(ns, _)| namespace.map_or(true, |wanted| ns == wanted))
            .filter_map(|(_, partition)| partition.get(&key))
            .flat_map(|variants| variants.iter())
            .find(|entry| entry.matches(request))
            .map(|entry| entry.response.clone());

        if found.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        Ok(found)
    }

    async fn namespaces(&self) -> Result<Vec<Namespace>> {
        Ok(self
            .partitions
            .read()
            .iter()
            .map(|(ns, _)| ns.clone())
            .collect())
    }

    async fn has(&self, namespace: &Namespace) -> Result<bool> {
        Ok(self.partitions.read().iter().any(|(ns, _)| ns == namespace))
    }

    async fn keys(&self, handle: &CacheHandle) -> Result<Vec<Request>> {
        let partitions = self.partitions.read();
        let (_, partition) = partitions
            .iter()
            .find(|(ns, _)| ns == handle.namespace())
            .ok_or_else(|| Error::NamespaceMissing(handle.namespace().to_string()))?;

        Ok(partition
            .values()
            .flat_map(|variants| variants.iter().map(|entry| entry.request.clone()))
            .collect())
    }

    async fn delete(&self, namespace: &Namespace) -> Result<bool> {
        let mut partitions = self.partitions.write();
        match partitions.iter().position(|(ns, _)| ns == namespace) {
            Some(idx) => {
                partitions.remove(idx);
                self.stats.record_namespace_deleted();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
