//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`Error`] covers every failure mode of the manager:
//! - Key lookup misses and duplicate registrations
//! - Load failures reported by resource loaders
//! - Reads of resources that hold no cached value
//! - Value-type mismatches rejected by submanagers
//! - Aggregated member failures from cache groups
//! - Manifest and I/O errors from configuration ingestion
//!
//! Loaders report their own failures through [`LoadError`], which the manager
//! wraps together with the offending resource key.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use larder::errors::{Error, Result};
//!
//! fn warm_up(manager: &larder::ResourceManager) -> Result<()> {
//!     manager.cache("Hello")?;
//!     Ok(())
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Which namespace a key was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Resource,
    Group,
    ResourceType,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Resource => f.write_str("resource"),
            Namespace::Group => f.write_str("cache group"),
            Namespace::ResourceType => f.write_str("resource type"),
        }
    }
}

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Namespace Errors
    // ========================================================================
    /// No entry exists with the given key.
    #[error("Unknown {namespace} key: {key:?}")]
    UnknownKey {
        /// Namespace the lookup was made in
        namespace: Namespace,
        /// The missing key
        key: String,
    },

    /// An entry with the given key already exists.
    #[error("Duplicate {namespace} key: {key:?}")]
    DuplicateKey {
        /// Namespace the insertion was made in
        namespace: Namespace,
        /// The conflicting key
        key: String,
    },

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// The resource's load operation failed. The reference count was not incremented.
    #[error("Failed to load resource {key:?}: {source}")]
    Load {
        /// Key of the resource that failed to load
        key: String,
        /// The loader's error
        #[source]
        source: LoadError,
    },

    /// The resource holds no cached value.
    #[error("Resource {0:?} is not cached")]
    NotCached(String),

    /// The resource kind does not support caching (e.g. streamed music).
    #[error("Resource {0:?} does not support caching")]
    CachingUnsupported(String),

    /// The resource produces a different value type than requested.
    #[error("Resource {key:?} holds {found}, expected {expected}")]
    TypeMismatch {
        /// Key of the offending resource
        key: String,
        /// Type name the caller asked for
        expected: &'static str,
        /// Type name the resource produces
        found: &'static str,
    },

    /// One or more members of a cache group failed.
    #[error(transparent)]
    GroupCache(#[from] GroupCacheError),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// No constructor is registered for the given tag.
    #[error("Unknown resource type: {0:?}")]
    UnknownType(String),

    /// Manifest parsing error.
    #[error("Manifest parse error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unknown_resource(key: impl Into<String>) -> Self {
        Error::UnknownKey {
            namespace: Namespace::Resource,
            key: key.into(),
        }
    }

    pub(crate) fn unknown_group(key: impl Into<String>) -> Self {
        Error::UnknownKey {
            namespace: Namespace::Group,
            key: key.into(),
        }
    }
}

/// Error returned by resource loaders and release hooks.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Reading the resource's bytes failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// A declared attribute could not be interpreted.
    #[error("Invalid attribute {name:?}: {value:?}")]
    InvalidAttribute {
        /// Attribute name
        name: String,
        /// Raw attribute value
        value: String,
    },

    /// Any other loader-specific failure.
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for LoadError {
    fn from(err: image::ImageError) -> Self {
        LoadError::ImageDecode(err.to_string())
    }
}

/// Aggregate error for group operations.
///
/// Successful members are left in their new state; only the members listed
/// in `failures` were not processed.
#[derive(Debug)]
pub struct GroupCacheError {
    /// Key of the group
    pub group: String,
    /// Failed member keys paired with their cause
    pub failures: Vec<(String, Error)>,
}

impl GroupCacheError {
    /// Keys of the members that failed, sorted.
    #[must_use]
    pub fn failed_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.failures.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Display for GroupCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cache group {:?} failed for {} member(s): ",
            self.group,
            self.failures.len()
        )?;
        for (i, key) in self.failed_keys().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key:?}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GroupCacheError {}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_error_lists_failed_keys() {
        let err = GroupCacheError {
            group: "G".to_string(),
            failures: vec![
                ("B".to_string(), Error::unknown_resource("B")),
                ("A".to_string(), Error::NotCached("A".to_string())),
            ],
        };
        assert_eq!(err.failed_keys(), vec!["A", "B"]);
        let msg = err.to_string();
        assert!(msg.contains("\"G\""));
        assert!(msg.contains("2 member(s)"));
    }

    #[test]
    fn unknown_key_mentions_namespace() {
        let msg = Error::unknown_group("Level1").to_string();
        assert_eq!(msg, "Unknown cache group key: \"Level1\"");
    }
}
