//! Internship opportunities and applications.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DomainError, DomainResult};
use crate::ids::{ApplicationId, EmployerId, InstitutionId, OpportunityId, StudentId, SupervisorId};
use crate::status::ApplicationStatus;

/// The single owner of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OpportunityHost {
    /// Posted by an employer.
    Employer(EmployerId),
    /// Posted by an institution.
    Institution(InstitutionId),
}

/// An internship posting.
///
/// Storage layers usually keep the host as two nullable columns. Use
/// [`InternshipOpportunity::from_parts`] to convert them; a row with both or
/// neither set is rejected as an integrity fault. The serde representation
/// uses the same flat shape and the same check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOpportunity", into = "RawOpportunity")]
pub struct InternshipOpportunity {
    id: OpportunityId,
    host: OpportunityHost,
}

impl InternshipOpportunity {
    /// Creates an opportunity with a known host.
    #[must_use]
    pub const fn new(id: OpportunityId, host: OpportunityHost) -> Self {
        Self { id, host }
    }

    /// Creates an employer-hosted opportunity.
    #[must_use]
    pub const fn employer_hosted(id: OpportunityId, employer: EmployerId) -> Self {
        Self::new(id, OpportunityHost::Employer(employer))
    }

    /// Creates an institution-hosted opportunity.
    #[must_use]
    pub const fn institution_hosted(id: OpportunityId, institution: InstitutionId) -> Self {
        Self::new(id, OpportunityHost::Institution(institution))
    }

    /// Builds an opportunity from nullable owner columns.
    ///
    /// Exactly one of `employer_id` and `institution_id` must be set.
    pub fn from_parts(
        id: OpportunityId,
        employer_id: Option<EmployerId>,
        institution_id: Option<InstitutionId>,
    ) -> DomainResult<Self> {
        match (employer_id, institution_id) {
            (Some(employer), None) => Ok(Self::employer_hosted(id, employer)),
            (None, Some(institution)) => Ok(Self::institution_hosted(id, institution)),
            (employer, institution) => {
                warn!(
                    opportunity_id = %id,
                    has_employer = employer.is_some(),
                    has_institution = institution.is_some(),
                    "rejecting opportunity without exactly one host"
                );
                Err(DomainError::InvalidOpportunityHost {
                    opportunity: id.to_string(),
                    has_employer: employer.is_some(),
                    has_institution: institution.is_some(),
                })
            }
        }
    }

    /// Opportunity identifier.
    pub const fn id(&self) -> OpportunityId {
        self.id
    }

    /// The owning employer or institution.
    pub const fn host(&self) -> OpportunityHost {
        self.host
    }

    /// The hosting employer, if employer-hosted.
    pub const fn employer_id(&self) -> Option<EmployerId> {
        match self.host {
            OpportunityHost::Employer(id) => Some(id),
            OpportunityHost::Institution(_) => None,
        }
    }

    /// The hosting institution, if institution-hosted.
    pub const fn institution_id(&self) -> Option<InstitutionId> {
        match self.host {
            OpportunityHost::Institution(id) => Some(id),
            OpportunityHost::Employer(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawOpportunity {
    id: OpportunityId,
    #[serde(default)]
    employer_id: Option<EmployerId>,
    #[serde(default)]
    institution_id: Option<InstitutionId>,
}

impl TryFrom<RawOpportunity> for InternshipOpportunity {
    type Error = DomainError;

    fn try_from(raw: RawOpportunity) -> Result<Self, Self::Error> {
        Self::from_parts(raw.id, raw.employer_id, raw.institution_id)
    }
}

impl From<InternshipOpportunity> for RawOpportunity {
    fn from(opportunity: InternshipOpportunity) -> Self {
        Self {
            id: opportunity.id,
            employer_id: opportunity.employer_id(),
            institution_id: opportunity.institution_id(),
        }
    }
}

/// Which side a supervisor assignment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorKind {
    /// Institution staff supervising the student academically.
    Institution,
    /// Employer-side supervisor at the workplace.
    Employer,
}

/// A student's application to an opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipApplication {
    /// Application identifier.
    pub id: ApplicationId,
    /// The applying student.
    pub student_id: StudentId,
    /// Current lifecycle status.
    pub status: ApplicationStatus,
    /// Assigned institution supervisor, once set.
    #[serde(default)]
    pub institution_supervisor_id: Option<SupervisorId>,
    /// Assigned employer supervisor, once set.
    #[serde(default)]
    pub employer_supervisor_id: Option<SupervisorId>,
    opportunity: InternshipOpportunity,
}

impl InternshipApplication {
    /// Creates a pending application with no supervisors assigned.
    #[must_use]
    pub fn new(id: ApplicationId, student_id: StudentId, opportunity: InternshipOpportunity) -> Self {
        Self {
            id,
            student_id,
            status: ApplicationStatus::Pending,
            institution_supervisor_id: None,
            employer_supervisor_id: None,
            opportunity,
        }
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the assigned institution supervisor.
    #[must_use]
    pub fn with_institution_supervisor(mut self, supervisor: SupervisorId) -> Self {
        self.institution_supervisor_id = Some(supervisor);
        self
    }

    /// Sets the assigned employer supervisor.
    #[must_use]
    pub fn with_employer_supervisor(mut self, supervisor: SupervisorId) -> Self {
        self.employer_supervisor_id = Some(supervisor);
        self
    }

    /// The opportunity applied to. Fixed at creation.
    pub const fn opportunity(&self) -> &InternshipOpportunity {
        &self.opportunity
    }

    /// Returns true once the application can no longer change status.
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Assigned supervisors, with the side each belongs to.
    pub fn assigned_supervisors(&self) -> Vec<(SupervisorKind, SupervisorId)> {
        let institution = self
            .institution_supervisor_id
            .map(|id| (SupervisorKind::Institution, id));
        let employer = self
            .employer_supervisor_id
            .map(|id| (SupervisorKind::Employer, id));
        institution.into_iter().chain(employer).collect()
    }
}
