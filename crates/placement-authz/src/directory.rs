//! Identity resolution.
//!
//! The policy evaluator never touches a data store. Everything it needs to
//! know about an actor is fetched through a [`Directory`], the capability set
//! the surrounding system implements (a database, a cache, a remote profile
//! service). [`IdentityResolver`] wraps a directory with tracing and is the
//! only way the evaluator reaches it.
//!
//! Every lookup may return `None`; a missing fact is never a wildcard. Lookup
//! errors propagate unchanged.

use std::fmt;
use std::sync::Arc;

use placement_core::{
    Actor, Affiliation, EmployerId, InstitutionId, StaffProfile, StudentId, StudentProfile,
    SupervisorProfile,
};
use tracing::{debug, warn};

use crate::error::DirectoryResult;

/// Lookup collaborators consumed by the policy evaluator.
///
/// Implementations must be read-only. Their blocking or caching behaviour is
/// opaque to the evaluator.
pub trait Directory: Send + Sync {
    /// The student's approved institutional affiliation.
    fn student_affiliation(&self, student: StudentId) -> DirectoryResult<Option<Affiliation>>;

    /// The institution the actor belongs to.
    fn actor_institution(&self, actor: &Actor) -> DirectoryResult<Option<InstitutionId>>;

    /// The actor's staff profile at `institution`.
    fn institution_staff(
        &self,
        actor: &Actor,
        institution: InstitutionId,
    ) -> DirectoryResult<Option<StaffProfile>>;

    /// The actor's employer-supervisor profile at `employer`.
    fn employer_supervisor(
        &self,
        actor: &Actor,
        employer: EmployerId,
    ) -> DirectoryResult<Option<SupervisorProfile>>;

    /// The student profile owned by the actor.
    fn student_for_user(&self, actor: &Actor) -> DirectoryResult<Option<StudentProfile>>;
}

/// Fetches role facts for the policy evaluator.
///
/// The resolver performs no authorization. It forwards to the directory,
/// logs each lookup, counts failures, and drops records that do not belong to
/// the key they were requested for.
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn Directory>,
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl IdentityResolver {
    /// Create a resolver over a directory.
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Institution of the student's approved affiliation.
    pub fn affiliated_institution(
        &self,
        student: StudentId,
    ) -> DirectoryResult<Option<InstitutionId>> {
        let affiliation = observe("student_affiliation", self.directory.student_affiliation(student))?;
        let institution = affiliation
            .filter(|a| {
                let matches = a.student_id == student;
                if !matches {
                    warn!(student_id = %student, "directory returned affiliation for another student");
                }
                matches
            })
            .map(|a| a.institution_id);
        debug!(student_id = %student, institution = ?institution, "resolved student affiliation");
        Ok(institution)
    }

    /// Institution the actor belongs to.
    pub fn actor_institution(&self, actor: &Actor) -> DirectoryResult<Option<InstitutionId>> {
        let institution = observe("actor_institution", self.directory.actor_institution(actor))?;
        debug!(actor = %actor.log_id(), institution = ?institution, "resolved actor institution");
        Ok(institution)
    }

    /// The actor's staff profile at `institution`.
    pub fn staff_profile(
        &self,
        actor: &Actor,
        institution: InstitutionId,
    ) -> DirectoryResult<Option<StaffProfile>> {
        let profile = observe(
            "institution_staff",
            self.directory.institution_staff(actor, institution),
        )?
        .filter(|p| p.institution_id == institution && p.user_id == actor.id);
        debug!(actor = %actor.log_id(), %institution, found = profile.is_some(), "resolved staff profile");
        Ok(profile)
    }

    /// The actor's employer-supervisor profile at `employer`.
    pub fn employer_supervisor(
        &self,
        actor: &Actor,
        employer: EmployerId,
    ) -> DirectoryResult<Option<SupervisorProfile>> {
        let profile = observe(
            "employer_supervisor",
            self.directory.employer_supervisor(actor, employer),
        )?
        .filter(|p| p.employer_id == employer && p.user_id == actor.id);
        debug!(actor = %actor.log_id(), %employer, found = profile.is_some(), "resolved employer supervisor");
        Ok(profile)
    }

    /// The actor's student profile.
    pub fn student_profile(&self, actor: &Actor) -> DirectoryResult<Option<StudentProfile>> {
        let profile = observe("student_for_user", self.directory.student_for_user(actor))?
            .filter(|p| p.user_id == actor.id);
        debug!(actor = %actor.log_id(), found = profile.is_some(), "resolved student profile");
        Ok(profile)
    }
}

fn observe<T>(lookup: &'static str, result: DirectoryResult<T>) -> DirectoryResult<T> {
    if let Err(err) = &result {
        warn!(lookup, error = %err, "directory lookup failed");
        placement_telemetry::metrics::record_lookup_failure(lookup);
    }
    result
}
