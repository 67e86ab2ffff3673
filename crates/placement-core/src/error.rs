//! Domain error types.
//!
//! These errors describe data-integrity faults in the inputs handed to the
//! policy engine. They are raised when domain values are constructed, so the
//! evaluator itself only ever sees well-formed data.

use thiserror::Error;

use crate::status::ApplicationStatus;

/// Result type alias using [`DomainError`].
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised while constructing domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DomainError {
    /// An opportunity must be hosted by exactly one employer or institution.
    #[error("opportunity {opportunity} must have exactly one host (employer: {has_employer}, institution: {has_institution})")]
    InvalidOpportunityHost {
        /// Opportunity identifier, as text.
        opportunity: String,
        /// Whether an employer id was supplied.
        has_employer: bool,
        /// Whether an institution id was supplied.
        has_institution: bool,
    },

    /// A transition table edge violates the lifecycle ordering.
    #[error("invalid transition edge {from} -> {to}: {reason}")]
    InvalidTransitionEdge {
        /// Source status.
        from: ApplicationStatus,
        /// Target status.
        to: ApplicationStatus,
        /// Why the edge is rejected.
        reason: &'static str,
    },

    /// A status name could not be parsed.
    #[error("unknown application status: {0}")]
    UnknownStatus(String),
}

impl DomainError {
    /// Returns true if this error describes an integrity fault in stored data.
    pub const fn is_integrity_fault(&self) -> bool {
        matches!(self, Self::InvalidOpportunityHost { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_host_display() {
        let err = DomainError::InvalidOpportunityHost {
            opportunity: "opp-1".to_string(),
            has_employer: true,
            has_institution: true,
        };
        assert!(err.to_string().contains("opp-1"));
        assert!(err.to_string().contains("exactly one host"));
        assert!(err.is_integrity_fault());
    }

    #[test]
    fn test_transition_edge_display() {
        let err = DomainError::InvalidTransitionEdge {
            from: ApplicationStatus::Certified,
            to: ApplicationStatus::Active,
            reason: "terminal status has no successors",
        };
        assert_eq!(
            err.to_string(),
            "invalid transition edge CERTIFIED -> ACTIVE: terminal status has no successors"
        );
        assert!(!err.is_integrity_fault());
    }
}
