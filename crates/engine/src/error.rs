//! Engine error types.

use expunge_core::Namespace;
use expunge_metadata::MetadataError;
use serde::Serialize;
use thiserror::Error;

/// Why a page does not qualify for permanent deletion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IneligibleReason {
    #[error("page does not exist")]
    NotFound,

    #[error("page has an invalid title: {0}")]
    InvalidTitle(String),

    #[error("namespace {0} is virtual")]
    VirtualNamespace(Namespace),

    #[error("namespace {0} is not enabled for permanent deletion")]
    NamespaceNotEligible(Namespace),
}

/// Terminal purge failures.
#[derive(Debug, Error)]
pub enum PurgeError {
    /// Rejected before any mutation.
    #[error("page is not eligible for permanent deletion: {0}")]
    Ineligible(IneligibleReason),

    #[error("permission denied")]
    PermissionDenied,

    /// A relational statement failed; the transaction was rolled back.
    #[error("purge failed and was rolled back: {0}")]
    CascadeFailed(#[source] MetadataError),
}

impl PurgeError {
    /// Short indicator for end users. Carries no ids, titles or database
    /// details.
    pub fn user_message(&self) -> &'static str {
        match self {
            PurgeError::Ineligible(_) => "This page cannot be permanently deleted.",
            PurgeError::PermissionDenied => "You are not allowed to permanently delete pages.",
            PurgeError::CascadeFailed(_) => "Permanent deletion failed. No changes were made.",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PurgeError::Ineligible(_) => "ineligible",
            PurgeError::PermissionDenied => "permission_denied",
            PurgeError::CascadeFailed(_) => "cascade_failed",
        }
    }
}

impl From<IneligibleReason> for PurgeError {
    fn from(reason: IneligibleReason) -> Self {
        PurgeError::Ineligible(reason)
    }
}

/// A binary artifact that could not be removed after commit.
///
/// Non-fatal: the relational purge already succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPurgeFailure {
    pub key: String,
    pub message: String,
}

/// Result type for purge operations.
pub type PurgeResult<T> = std::result::Result<T, PurgeError>;
