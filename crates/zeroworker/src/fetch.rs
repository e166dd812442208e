//! Network seam

use async_trait::async_trait;
use zerostore::{Request, Response, Result};

/// Issues requests to the network
///
/// An HTTP error status is still a successful fetch; only an unreachable
/// network (or any other failure to obtain a response) is an `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `request` from the network
    async fn fetch(&self, request: &Request) -> Result<Response>;
}
