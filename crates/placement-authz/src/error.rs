//! Error types for the authorization crate.
//!
//! A denied decision is not an error: the decision functions return
//! `Ok(false)`. Errors here are lookup failures and integrity faults, which
//! the caller must treat as fatal for the request rather than as an allow.

use http::StatusCode;
use placement_core::DomainError;
use thiserror::Error;

/// Result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors raised by a [`Directory`](crate::Directory) implementation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// The backing store could not be reached.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The backing store returned an error.
    #[error("directory lookup {lookup} failed")]
    Backend {
        /// Name of the failed lookup.
        lookup: &'static str,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DirectoryError {
    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Wrap a backend error.
    pub fn backend(
        lookup: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            lookup,
            source: source.into(),
        }
    }
}

/// Errors that can occur during authorization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthzError {
    /// A collaborator lookup failed.
    #[error("lookup failed: {0}")]
    Lookup(#[from] DirectoryError),

    /// Input data violates a domain invariant.
    ///
    /// The evaluator never returns this. Callers get it by propagating a
    /// rejected [`InternshipOpportunity::from_parts`] with `?` while building
    /// the application they authorize against.
    ///
    /// [`InternshipOpportunity::from_parts`]: placement_core::InternshipOpportunity::from_parts
    #[error("invalid domain state: {0}")]
    InvalidDomainState(#[from] DomainError),

    /// Access denied by policy.
    #[error("access denied: {reason}")]
    AccessDenied {
        /// Reason for denial.
        reason: String,
    },
}

impl AuthzError {
    /// Create an access denied error.
    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    /// Check if this is an access denied error.
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Check if this is a retryable error.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Lookup(DirectoryError::Unavailable(_)))
    }

    /// HTTP status the enclosing service should answer with.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::AccessDenied { .. } => StatusCode::FORBIDDEN,
            Self::Lookup(DirectoryError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::{EmployerId, InstitutionId, InternshipOpportunity, OpportunityId};

    #[test]
    fn test_access_denied_error() {
        let err = AuthzError::access_denied("no authority over application");
        assert!(err.is_access_denied());
        assert!(err.to_string().contains("no authority over application"));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_rejected_opportunity_propagates_as_domain_state() {
        fn load(employer: Option<EmployerId>) -> AuthzResult<InternshipOpportunity> {
            Ok(InternshipOpportunity::from_parts(
                OpportunityId::new(),
                employer,
                Some(InstitutionId::new()),
            )?)
        }

        let err = load(Some(EmployerId::new())).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidDomainState(_)));
        assert!(!err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(load(None).is_ok());
    }

    #[test]
    fn test_retryable_error() {
        let unavailable = AuthzError::from(DirectoryError::unavailable("connection timeout"));
        assert!(unavailable.is_retryable());
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let backend = AuthzError::from(DirectoryError::backend(
            "student_affiliation",
            "constraint violated",
        ));
        assert!(!backend.is_retryable());
        assert_eq!(backend.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_backend_error_keeps_source() {
        let err = DirectoryError::backend("actor_institution", "row decode failed");
        assert_eq!(err.to_string(), "directory lookup actor_institution failed");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("row decode failed"));
    }

    #[test]
    fn test_domain_error_is_server_fault() {
        let err = AuthzError::from(DomainError::UnknownStatus("ACCEPTED".to_string()));
        assert!(!err.is_access_denied());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display() {
        let err = AuthzError::from(DirectoryError::unavailable("profile service timed out"));
        assert_eq!(
            err.to_string(),
            "lookup failed: directory unavailable: profile service timed out"
        );
    }
}
