//! Error types for relocation and resize operations
//!
//! Every failure carries the identity of the pod and the offending values so
//! callers can log or act on it without consulting global state.

use thiserror::Error;

/// Errors returned by the relocator core and its cluster session
#[derive(Debug, Error)]
pub enum RelocatorError {
    /// Neither a master URL nor a kubeconfig path was supplied, or one was unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from the kube-rs client
    #[error("Kubernetes API error for {target}: {source}")]
    Client {
        target: String,
        #[source]
        source: kube::Error,
    },

    /// Pod does not exist
    #[error("Pod not found: {0}")]
    PodNotFound(String),

    /// Malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Container index is out of range for the pod
    #[error("Cannot find container[{index}] in pod[{pod}]")]
    ContainerNotFound { index: usize, pod: String },

    /// Legacy parent annotation is not a valid serialized reference
    #[error("Failed to decode parent annotation: {source}\n[{raw}]")]
    Decode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// Relocated pod is not healthy on its target node
    #[error("Pod-{pod} failed migration health check: {reason}")]
    MigrationHealth { pod: String, reason: HealthFailure },

    /// Quantity string could not be parsed
    #[error("Invalid quantity {value:?}: {reason}")]
    InvalidQuantity { value: String, reason: String },
}

/// Specific reason a migration health check failed
#[derive(Debug, Error)]
pub enum HealthFailure {
    #[error("failed to get pod: {0}")]
    Fetch(#[source] Box<RelocatorError>),

    #[error("pod is not running: {phase}")]
    NotRunning { phase: String },

    #[error("pod is running on another node ({actual} vs. {expected})")]
    WrongNode { actual: String, expected: String },
}

impl RelocatorError {
    /// Returns true for errors caused by caller input rather than the cluster
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RelocatorError::Validation(_) | RelocatorError::ContainerNotFound { .. }
        )
    }
}

/// Result type alias for relocator operations
pub type Result<T> = std::result::Result<T, RelocatorError>;
