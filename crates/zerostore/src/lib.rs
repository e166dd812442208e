//! # zerostore
//!
//! Response cache for the zero offline proxy.
//!
//! ## Model
//! - **Namespace**: versioned partition (`name::version`), created on open,
//!   deleted wholesale
//! - **Entry**: GET request identity (URL + `Vary` headers) -> stored response
//! - **Store**: async [`CacheStore`] contract, with an in-memory implementation

#![warn(missing_docs)]

mod error;
mod message;
mod memory;
mod namespace;
mod parser;
mod stats;
mod store;

pub use crate::error::{Error, Result};
pub use crate::message::{Request, RequestMode, Response};
pub use crate::memory::MemoryCacheStore;
pub use crate::namespace::Namespace;
pub use crate::parser::{parse_namespace, parse_vary};
pub use crate::stats::{StoreStats, StoreStatsSnapshot};
pub use crate::store::{CacheHandle, CacheStore};
