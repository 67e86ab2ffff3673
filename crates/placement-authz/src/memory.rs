//! In-memory directory for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use placement_core::{
    Actor, Affiliation, EmployerId, InstitutionId, StaffProfile, StudentId, StudentProfile,
    SupervisorId, SupervisorProfile, UserId,
};

use crate::directory::Directory;
use crate::error::{DirectoryError, DirectoryResult};

#[derive(Debug, Default)]
struct Records {
    affiliations: HashMap<StudentId, InstitutionId>,
    actor_institutions: HashMap<UserId, InstitutionId>,
    staff: HashMap<(UserId, InstitutionId), SupervisorId>,
    employer_supervisors: HashMap<(UserId, EmployerId), SupervisorId>,
    students: HashMap<UserId, StudentId>,
}

#[derive(Debug, Default)]
struct Inner {
    records: RwLock<Records>,
    failing: AtomicBool,
    lookups: AtomicU64,
}

/// A thread-safe [`Directory`] backed by hash maps.
///
/// Clones share the same records, so a test can keep a handle for seeding
/// while the evaluator owns another.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use placement_authz::{InMemoryDirectory, PolicyEvaluator};
/// use placement_core::{fixtures, ApplicationStatus, InstitutionId};
///
/// let directory = InMemoryDirectory::new();
/// let admin = fixtures::institution_admin();
/// let institution = InstitutionId::new();
/// let app = fixtures::employer_hosted_application(ApplicationStatus::Active);
///
/// directory.set_actor_institution(&admin, institution);
/// directory.affiliate(app.student_id, institution);
///
/// let evaluator = PolicyEvaluator::new(Arc::new(directory));
/// assert!(evaluator.can_view_application(&admin, &app).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    inner: Arc<Inner>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory whose lookups all fail as unavailable.
    pub fn failing() -> Self {
        let directory = Self::new();
        directory.set_failing(true);
        directory
    }

    /// Toggle simulated outage.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of lookups served so far, including failed ones.
    pub fn lookup_count(&self) -> u64 {
        self.inner.lookups.load(Ordering::SeqCst)
    }

    /// Record an approved affiliation.
    pub fn affiliate(&self, student: StudentId, institution: InstitutionId) {
        self.inner.records.write().affiliations.insert(student, institution);
    }

    /// Remove a student's affiliation.
    pub fn revoke_affiliation(&self, student: StudentId) {
        self.inner.records.write().affiliations.remove(&student);
    }

    /// Record the institution an actor belongs to.
    pub fn set_actor_institution(&self, actor: &Actor, institution: InstitutionId) {
        self.inner
            .records
            .write()
            .actor_institutions
            .insert(actor.id, institution);
    }

    /// Create a staff profile for the actor at `institution`.
    pub fn add_staff(&self, actor: &Actor, institution: InstitutionId) -> SupervisorId {
        let id = SupervisorId::new();
        self.inner.records.write().staff.insert((actor.id, institution), id);
        id
    }

    /// Create an employer-supervisor profile for the actor at `employer`.
    pub fn add_employer_supervisor(&self, actor: &Actor, employer: EmployerId) -> SupervisorId {
        let id = SupervisorId::new();
        self.inner
            .records
            .write()
            .employer_supervisors
            .insert((actor.id, employer), id);
        id
    }

    /// Link the actor to a student profile.
    pub fn link_student(&self, actor: &Actor, student: StudentId) {
        self.inner.records.write().students.insert(actor.id, student);
    }

    fn begin(&self, lookup: &'static str) -> DirectoryResult<()> {
        self.inner.lookups.fetch_add(1, Ordering::SeqCst);
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::unavailable(format!(
                "in-memory directory is failing ({lookup})"
            )));
        }
        Ok(())
    }
}

impl Directory for InMemoryDirectory {
    fn student_affiliation(&self, student: StudentId) -> DirectoryResult<Option<Affiliation>> {
        self.begin("student_affiliation")?;
        Ok(self
            .inner
            .records
            .read()
            .affiliations
            .get(&student)
            .map(|&institution_id| Affiliation {
                student_id: student,
                institution_id,
            }))
    }

    fn actor_institution(&self, actor: &Actor) -> DirectoryResult<Option<InstitutionId>> {
        self.begin("actor_institution")?;
        Ok(self.inner.records.read().actor_institutions.get(&actor.id).copied())
    }

    fn institution_staff(
        &self,
        actor: &Actor,
        institution: InstitutionId,
    ) -> DirectoryResult<Option<StaffProfile>> {
        self.begin("institution_staff")?;
        Ok(self
            .inner
            .records
            .read()
            .staff
            .get(&(actor.id, institution))
            .map(|&id| StaffProfile {
                id,
                institution_id: institution,
                user_id: actor.id,
            }))
    }

    fn employer_supervisor(
        &self,
        actor: &Actor,
        employer: EmployerId,
    ) -> DirectoryResult<Option<SupervisorProfile>> {
        self.begin("employer_supervisor")?;
        Ok(self
            .inner
            .records
            .read()
            .employer_supervisors
            .get(&(actor.id, employer))
            .map(|&id| SupervisorProfile {
                id,
                employer_id: employer,
                user_id: actor.id,
            }))
    }

    fn student_for_user(&self, actor: &Actor) -> DirectoryResult<Option<StudentProfile>> {
        self.begin("student_for_user")?;
        Ok(self
            .inner
            .records
            .read()
            .students
            .get(&actor.id)
            .map(|&id| StudentProfile {
                id,
                user_id: actor.id,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::fixtures;

    #[test]
    fn test_clones_share_records() {
        let directory = InMemoryDirectory::new();
        let handle = directory.clone();
        let student = StudentId::new();
        let institution = InstitutionId::new();

        handle.affiliate(student, institution);
        let affiliation = directory.student_affiliation(student).unwrap().unwrap();
        assert_eq!(affiliation.institution_id, institution);

        handle.revoke_affiliation(student);
        assert!(directory.student_affiliation(student).unwrap().is_none());
    }

    #[test]
    fn test_profiles_are_scoped() {
        let directory = InMemoryDirectory::new();
        let actor = fixtures::plain_user();
        let employer = EmployerId::new();
        let id = directory.add_employer_supervisor(&actor, employer);

        let profile = directory.employer_supervisor(&actor, employer).unwrap().unwrap();
        assert_eq!(profile.id, id);
        assert!(directory
            .employer_supervisor(&actor, EmployerId::new())
            .unwrap()
            .is_none());
        assert!(directory
            .employer_supervisor(&fixtures::plain_user(), employer)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_failing_mode() {
        let directory = InMemoryDirectory::failing();
        let err = directory.student_for_user(&fixtures::student()).unwrap_err();
        assert!(matches!(err, DirectoryError::Unavailable(_)));

        directory.set_failing(false);
        assert!(directory.student_for_user(&fixtures::student()).is_ok());
        assert_eq!(directory.lookup_count(), 2);
    }
}
