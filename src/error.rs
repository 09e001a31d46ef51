//! Error taxonomy for the crate.
//!
//! - `ValidationError` covers malformed input: broken hierarchies, unknown
//!   assignment tokens, bad slugs.
//! - `TaxonomyError` is what facade operations return. Collaborator
//!   failures are carried unchanged as `source`, never retried here.

use crate::core::types::{NodeId, ObjectId};

/// Malformed input detected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A parent chain did not terminate within `nodes.len()` steps.
    #[error("cycle detected in parent chain starting at node {node}")]
    CycleDetected { node: NodeId },

    #[error("node id {node} appears more than once in the snapshot")]
    DuplicateNode { node: NodeId },

    #[error("slug '{slug}' is used by nodes {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: NodeId,
        second: NodeId,
    },

    /// One or more assignment tokens did not resolve in the current snapshot.
    #[error(
        "unknown terms for object {object} in taxonomy '{taxonomy}': {}",
        identifiers.join(", ")
    )]
    UnknownTerms {
        taxonomy: String,
        object: ObjectId,
        identifiers: Vec<String>,
    },

    #[error("node {node} does not exist in taxonomy '{taxonomy}'")]
    UnknownNode { taxonomy: String, node: NodeId },

    #[error("invalid taxonomy slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("taxonomy '{slug}' must bind object type '{expected}', got '{found}'")]
    WrongObjectType {
        slug: String,
        expected: String,
        found: String,
    },
}

/// Failure reported by a `NodeStore` implementation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a backend error, keeping it reachable through `Error::source`.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure reported by the host platform when registering a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct PlatformError {
    pub reason: String,
}

impl PlatformError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Same slug registered again with a different configuration.
    #[error("taxonomy '{slug}' is already registered with a different configuration")]
    Conflict { slug: String },

    #[error("platform rejected taxonomy '{slug}': {source}")]
    Registration {
        slug: String,
        #[source]
        source: PlatformError,
    },

    #[error("store failed for taxonomy '{slug}'{}: {source}", object_suffix(*object))]
    Store {
        slug: String,
        object: Option<ObjectId>,
        #[source]
        source: StoreError,
    },
}

fn object_suffix(object: Option<ObjectId>) -> String {
    object
        .map(|id| format!(" (object {id})"))
        .unwrap_or_default()
}

impl TaxonomyError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TaxonomyError::Validation(_))
    }
}
