//! Policy evaluation.
//!
//! The [`PolicyEvaluator`] answers three questions about an application:
//! may this actor view it, move it to a new status, or review the evidence
//! submitted against it. Evaluation is synchronous and holds no mutable
//! state; every fact comes from the [`IdentityResolver`], and any ambiguity
//! (missing affiliation, missing profile, unknown institution) resolves to
//! deny.

use std::sync::Arc;

use placement_core::{
    Actor, ApplicationStatus, InternshipApplication, SupervisorKind, TransitionTable,
};
use tracing::{debug, instrument};

use crate::decision::{Action, DecisionBasis, DenyReason, PolicyDecision};
use crate::directory::{Directory, IdentityResolver};
use crate::error::AuthzResult;

/// Decides what actors may do with internship applications.
///
/// Cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    /// Fact lookups.
    resolver: IdentityResolver,
    /// Legal status transitions.
    transitions: Arc<TransitionTable>,
}

impl PolicyEvaluator {
    /// Create an evaluator over a directory with the standard lifecycle.
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self {
            resolver: IdentityResolver::new(directory),
            transitions: Arc::new(TransitionTable::standard()),
        }
    }

    /// Replace the transition table.
    pub fn with_transitions(mut self, transitions: TransitionTable) -> Self {
        self.transitions = Arc::new(transitions);
        self
    }

    /// The transition table consulted before any authority check.
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Whether the actor may view the application.
    pub fn can_view_application(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        Ok(self.evaluate(actor, application, Action::View)?.allowed)
    }

    /// Whether the actor may move the application to `new_status`.
    pub fn can_transition_application(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        new_status: ApplicationStatus,
    ) -> AuthzResult<bool> {
        Ok(self
            .evaluate(actor, application, Action::Transition(new_status))?
            .allowed)
    }

    /// Whether the actor may review evidence submitted against the application.
    pub fn can_review_evidence(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        Ok(self
            .evaluate(actor, application, Action::ReviewEvidence)?
            .allowed)
    }

    /// Statuses the actor may move the application to right now.
    pub fn allowed_transitions(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<Vec<ApplicationStatus>> {
        let mut allowed = Vec::new();
        for status in self.transitions.successors(application.status) {
            if self.transition_decision(actor, application, status)?.allowed {
                allowed.push(status);
            }
        }
        Ok(allowed)
    }

    /// Evaluate an action and explain the outcome.
    #[instrument(skip(self, actor, application), fields(
        actor = %actor.log_id(),
        application_id = %application.id,
        status = %application.status,
        action = %action
    ))]
    pub fn evaluate(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        action: Action,
    ) -> AuthzResult<PolicyDecision> {
        let decision = match action {
            Action::View => self.view_decision(actor, application)?,
            Action::Transition(to) => self.transition_decision(actor, application, to)?,
            Action::ReviewEvidence => self.review_decision(actor, application)?,
        };

        debug!(allowed = decision.allowed, outcome = %decision.label(), "policy evaluation complete");
        Ok(decision)
    }

    fn view_decision(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<PolicyDecision> {
        if actor.is_system_admin() {
            return Ok(PolicyDecision::allow(DecisionBasis::SystemAdmin));
        }
        if self.owns_application(actor, application)? {
            return Ok(PolicyDecision::allow(DecisionBasis::OwnApplication));
        }
        if self.is_affiliated_admin(actor, application)? {
            return Ok(PolicyDecision::allow(DecisionBasis::AffiliatedInstitutionAdmin));
        }
        // Only the hosting employer's admin; an admin of a hosting institution
        // sees the application through affiliation or not at all.
        if self.is_host_employer_admin(actor, application)? {
            return Ok(PolicyDecision::allow(DecisionBasis::HostEmployerAdmin));
        }
        if self.is_assigned_supervisor(actor, application)? {
            return Ok(PolicyDecision::allow(DecisionBasis::AssignedSupervisor));
        }
        Ok(PolicyDecision::deny(DenyReason::NoAuthority))
    }

    fn transition_decision(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        to: ApplicationStatus,
    ) -> AuthzResult<PolicyDecision> {
        let from = application.status;
        if !self.transitions.allows(from, to) {
            return Ok(PolicyDecision::deny(DenyReason::IllegalTransition { from, to }));
        }

        let basis = match to {
            // Certification is an academic act of the student's own institution,
            // wherever the internship was hosted.
            ApplicationStatus::Certified => self
                .is_affiliated_admin(actor, application)?
                .then_some(DecisionBasis::AffiliatedInstitutionAdmin),
            ApplicationStatus::Active | ApplicationStatus::Rejected | ApplicationStatus::Completed => {
                if actor.is_system_admin() {
                    Some(DecisionBasis::SystemAdmin)
                } else {
                    self.host_admin_basis(actor, application)?
                }
            }
            ApplicationStatus::Withdrawn => {
                if actor.is_system_admin() {
                    Some(DecisionBasis::SystemAdmin)
                } else {
                    self.owns_application(actor, application)?
                        .then_some(DecisionBasis::OwnApplication)
                }
            }
            ApplicationStatus::Pending => None,
        };

        Ok(basis.map_or_else(
            || PolicyDecision::deny(DenyReason::NoAuthority),
            PolicyDecision::allow,
        ))
    }

    fn review_decision(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<PolicyDecision> {
        if self.is_affiliated_admin(actor, application)? {
            return Ok(PolicyDecision::allow(DecisionBasis::AffiliatedInstitutionAdmin));
        }
        if application.status == ApplicationStatus::Certified {
            return Ok(PolicyDecision::deny(DenyReason::EvidenceReviewClosed));
        }
        if self.is_host_employer_admin(actor, application)? {
            return Ok(PolicyDecision::allow(DecisionBasis::HostEmployerAdmin));
        }
        if self.is_assigned_supervisor(actor, application)? {
            return Ok(PolicyDecision::allow(DecisionBasis::AssignedSupervisor));
        }
        Ok(PolicyDecision::deny(DenyReason::NoAuthority))
    }

    /// The actor owns the student profile the application belongs to.
    fn owns_application(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        let profile = self.resolver.student_profile(actor)?;
        Ok(profile.is_some_and(|p| p.id == application.student_id))
    }

    /// Institution admin whose institution is the student's approved affiliation.
    fn is_affiliated_admin(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        if !actor.is_institution_admin() {
            return Ok(false);
        }
        let Some(actor_institution) = self.resolver.actor_institution(actor)? else {
            return Ok(false);
        };
        let student_institution = self.resolver.affiliated_institution(application.student_id)?;
        Ok(student_institution == Some(actor_institution))
    }

    /// Admin of whichever employer or institution hosts the opportunity.
    fn host_admin_basis(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<Option<DecisionBasis>> {
        if self.is_host_employer_admin(actor, application)? {
            return Ok(Some(DecisionBasis::HostEmployerAdmin));
        }
        if self.is_host_institution_admin(actor, application)? {
            return Ok(Some(DecisionBasis::HostInstitutionAdmin));
        }
        Ok(None)
    }

    fn is_host_employer_admin(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        if !actor.is_employer_admin() {
            return Ok(false);
        }
        let Some(employer) = application.opportunity().employer_id() else {
            return Ok(false);
        };
        Ok(self.resolver.employer_supervisor(actor, employer)?.is_some())
    }

    fn is_host_institution_admin(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        if !actor.is_institution_admin() {
            return Ok(false);
        }
        let Some(host) = application.opportunity().institution_id() else {
            return Ok(false);
        };
        Ok(self.resolver.actor_institution(actor)? == Some(host))
    }

    /// The actor's staff or employer-supervisor profile is assigned to the application.
    fn is_assigned_supervisor(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        for (kind, assigned) in application.assigned_supervisors() {
            let profile = match kind {
                SupervisorKind::Institution => {
                    let Some(institution) = self.resolver.actor_institution(actor)? else {
                        continue;
                    };
                    self.resolver.staff_profile(actor, institution)?.map(|p| p.id)
                }
                SupervisorKind::Employer => {
                    let Some(employer) = application.opportunity().employer_id() else {
                        continue;
                    };
                    self.resolver.employer_supervisor(actor, employer)?.map(|p| p.id)
                }
            };
            if profile == Some(assigned) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
