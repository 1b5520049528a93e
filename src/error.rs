//! Error taxonomy
//!
//! Provider errors come from the cluster boundary, process errors from kind
//! processors, and mapper errors are the fatal ones surfaced to the binary.
//! Downgraded failures travel as `DiscoveryWarning` values.

use std::fmt;

use serde::Serialize;

use crate::models::ResourceKind;

/// Errors returned by a `ClusterProvider`
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to decode object: {0}")]
    Decode(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ProviderError {
    pub fn not_found(kind: ResourceKind, namespace: &str, name: &str) -> Self {
        ProviderError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    /// Transient failures worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }

    /// Classify a kube-rs error for the object (or collection, `name` empty)
    /// that was requested
    pub fn from_kube(err: kube::Error, kind: ResourceKind, namespace: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(ref resp) if resp.code == 404 => {
                ProviderError::not_found(kind, namespace, name)
            }
            kube::Error::Api(ref resp) if resp.code == 401 || resp.code == 403 => {
                ProviderError::PermissionDenied(resp.message.clone())
            }
            other => ProviderError::Unavailable(other.to_string()),
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors returned by a kind processor
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to list {kind} in namespace {namespace}: {source}")]
    ListFailure {
        kind: ResourceKind,
        namespace: String,
        #[source]
        source: ProviderError,
    },

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Processing cancelled")]
    Cancelled,
}

impl ProcessError {
    pub fn list_failure(kind: ResourceKind, namespace: &str, source: ProviderError) -> Self {
        match source {
            ProviderError::Cancelled => ProcessError::Cancelled,
            source => ProcessError::ListFailure {
                kind,
                namespace: namespace.to_string(),
                source,
            },
        }
    }
}

/// Provider failures inside cross-reference subtasks
impl From<ProviderError> for ProcessError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Cancelled => ProcessError::Cancelled,
            other => ProcessError::Task(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ProcessError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            ProcessError::Cancelled
        } else {
            ProcessError::Task(err.to_string())
        }
    }
}

/// Fatal errors that stop a mapping run
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot reach the cluster: {0}")]
    Connectivity(String),

    #[error("Namespace {0} not found")]
    NamespaceNotFound(String),

    #[error("Discovery cancelled")]
    Cancelled,
}

/// A non-fatal failure reported alongside partial results
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DiscoveryWarning {
    pub namespace: String,
    /// `None` when the whole namespace contribution was discarded
    pub kind: Option<ResourceKind>,
    pub message: String,
}

impl DiscoveryWarning {
    pub fn for_kind(namespace: &str, kind: ResourceKind, message: impl Into<String>) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: Some(kind),
            message: message.into(),
        }
    }

    pub fn for_namespace(namespace: &str, message: impl Into<String>) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(
                f,
                "namespace {}: {} skipped: {}",
                self.namespace, kind, self.message
            ),
            None => write!(
                f,
                "namespace {}: skipped: {}",
                self.namespace, self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_failure_keeps_cancellation_distinct() {
        let err = ProcessError::list_failure(
            ResourceKind::Service,
            "default",
            ProviderError::Cancelled,
        );
        assert!(matches!(err, ProcessError::Cancelled));

        let err = ProcessError::list_failure(
            ResourceKind::Service,
            "default",
            ProviderError::PermissionDenied("forbidden".into()),
        );
        assert_eq!(
            err.to_string(),
            "Failed to list Service in namespace default: Permission denied: forbidden"
        );
    }

    #[test]
    fn test_warning_display_names_kind_and_namespace() {
        let warning = DiscoveryWarning::for_kind(
            "restricted",
            ResourceKind::HorizontalPodAutoscaler,
            "Permission denied: forbidden",
        );
        assert_eq!(
            warning.to_string(),
            "namespace restricted: HorizontalPodAutoscaler skipped: Permission denied: forbidden"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Unavailable("timeout".into()).is_transient());
        assert!(!ProviderError::PermissionDenied("no".into()).is_transient());
        assert!(!ProviderError::not_found(ResourceKind::Secret, "a", "b").is_transient());
    }
}
