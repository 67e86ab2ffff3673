//! Facts resolved about actors and students.
//!
//! These records come from the surrounding system's directory. The policy
//! engine only reads them.

use serde::{Deserialize, Serialize};

use crate::ids::{EmployerId, InstitutionId, StudentId, SupervisorId, UserId};

/// A student's approved association with an institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Affiliation {
    /// The affiliated student.
    pub student_id: StudentId,
    /// The institution the student is affiliated with.
    pub institution_id: InstitutionId,
}

/// An institution staff member's profile at one institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffProfile {
    /// Profile id; matches `institution_supervisor_id` when assigned.
    pub id: SupervisorId,
    /// Institution the profile belongs to.
    pub institution_id: InstitutionId,
    /// User behind the profile.
    pub user_id: UserId,
}

/// An employer-side supervisor's profile at one employer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupervisorProfile {
    /// Profile id; matches `employer_supervisor_id` when assigned.
    pub id: SupervisorId,
    /// Employer the profile belongs to.
    pub employer_id: EmployerId,
    /// User behind the profile.
    pub user_id: UserId,
}

/// The student profile owned by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Student id; matches `InternshipApplication::student_id`.
    pub id: StudentId,
    /// User behind the profile.
    pub user_id: UserId,
}
