//! Authorization actions and decisions.

use chrono::{DateTime, Utc};
use placement_core::ApplicationStatus;
use serde::{Deserialize, Serialize};

/// An operation an actor wants to perform on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum Action {
    /// Read the application.
    View,
    /// Move the application to a new status.
    Transition(ApplicationStatus),
    /// Review logbook and feedback evidence submitted against the application.
    ReviewEvidence,
}

impl Action {
    /// Stable name for logs and metric labels.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Transition(ApplicationStatus::Certified) => "certify",
            Self::Transition(_) => "transition",
            Self::ReviewEvidence => "review_evidence",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transition(status) => write!(f, "transition:{status}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Why an action was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    /// Platform staff override.
    SystemAdmin,
    /// The actor is the application's student.
    OwnApplication,
    /// Institution admin of the institution the student is affiliated with.
    AffiliatedInstitutionAdmin,
    /// Administrator of the employer hosting the opportunity.
    HostEmployerAdmin,
    /// Administrator of the institution hosting the opportunity.
    HostInstitutionAdmin,
    /// The actor is an assigned supervisor.
    AssignedSupervisor,
}

impl DecisionBasis {
    /// Stable name for logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::OwnApplication => "own_application",
            Self::AffiliatedInstitutionAdmin => "affiliated_institution_admin",
            Self::HostEmployerAdmin => "host_employer_admin",
            Self::HostInstitutionAdmin => "host_institution_admin",
            Self::AssignedSupervisor => "assigned_supervisor",
        }
    }
}

/// Why an action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The target status is not a legal successor of the current one.
    IllegalTransition {
        /// Current status.
        from: ApplicationStatus,
        /// Requested status.
        to: ApplicationStatus,
    },
    /// Evidence review closed when the application was certified.
    EvidenceReviewClosed,
    /// No rule grants the actor authority.
    NoAuthority,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalTransition { from, to } => {
                write!(f, "transition {from} -> {to} is not allowed")
            }
            Self::EvidenceReviewClosed => f.write_str("evidence review closed after certification"),
            Self::NoAuthority => f.write_str("actor has no authority over this application"),
        }
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Whether the action is allowed.
    pub allowed: bool,
    /// Granting rule, when allowed.
    pub basis: Option<DecisionBasis>,
    /// Denial reason, when denied.
    pub reason: Option<DenyReason>,
    /// When the policy was evaluated. A decision served from the cache keeps
    /// the time of its original evaluation.
    pub evaluated_at: DateTime<Utc>,
}

impl PolicyDecision {
    /// An allow decision.
    pub fn allow(basis: DecisionBasis) -> Self {
        Self {
            allowed: true,
            basis: Some(basis),
            reason: None,
            evaluated_at: Utc::now(),
        }
    }

    /// A deny decision.
    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            basis: None,
            reason: Some(reason),
            evaluated_at: Utc::now(),
        }
    }

    /// Short label for logs: the basis on allow, the reason on deny.
    pub fn label(&self) -> String {
        match (self.basis, self.reason) {
            (Some(basis), _) => basis.as_str().to_string(),
            (None, Some(reason)) => reason.to_string(),
            (None, None) => "unspecified".to_string(),
        }
    }
}
