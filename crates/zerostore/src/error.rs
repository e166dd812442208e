//! Error types for zerostore and the worker built on top of it

use std::fmt;

use http::{Method, StatusCode};

/// Result type alias for cache and worker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache store, network and lifecycle operations
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Parse error (namespace identifiers, header values, config)
    Parse(String),

    /// Only GET requests can be stored
    UnsupportedMethod(Method),

    /// Namespace was deleted while a handle to it was still in use
    NamespaceMissing(String),

    /// Backend storage failure
    Storage(String),

    /// Network unreachable or the fetch threw
    Network(String),

    /// Network answered, but not with a 2xx status
    BadStatus {
        /// Requested URL
        url: String,
        /// Status returned by the network
        status: StatusCode,
    },

    /// Lifecycle operation not allowed in the worker's current state
    InvalidState(String),

    /// A lifecycle task panicked or was cancelled
    Aborted(String),
}

impl Error {
    /// True for failures that came from the network side of a fetch
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::BadStatus { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::UnsupportedMethod(method) => {
                write!(f, "Unsupported method: {} (only GET can be cached)", method)
            }
            Error::NamespaceMissing(ns) => write!(f, "Namespace not found: {}", ns),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::BadStatus { url, status } => {
                write!(f, "Bad response status {} for {}", status, url)
            }
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::Aborted(msg) => write!(f, "Task aborted: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        Error::Parse(format!("{:?}", err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}
