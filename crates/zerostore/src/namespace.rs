//! Versioned namespace identifiers

use std::fmt;

use crate::parser::{parse_namespace, NAMESPACE_SEPARATOR};

/// Identifier of one cache partition, usually `name::version`
///
/// Any string is a valid identifier; only identifiers built with
/// [`Namespace::versioned`] (or following the same layout) expose their
/// name and version parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Namespace(id.into())
    }

    /// Build `name::version`
    pub fn versioned(name: &str, version: &str) -> Self {
        Namespace(format!("{}{}{}", name, NAMESPACE_SEPARATOR, version))
    }

    /// The full identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Logical cache name, if the identifier is `name::version`
    pub fn name(&self) -> Option<&str> {
        parse_namespace(&self.0).ok().map(|(name, _)| name)
    }

    /// Version tag, if the identifier is `name::version`
    pub fn version(&self) -> Option<&str> {
        parse_namespace(&self.0).ok().map(|(_, version)| version)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(id: &str) -> Self {
        Namespace::new(id)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
