//! Test fixtures for placement development and testing.
//!
//! Pre-built actors, opportunities and applications shared by the test suites
//! across the workspace.
//!
//! # Example
//!
//! ```
//! use placement_core::fixtures;
//! use placement_core::ApplicationStatus;
//!
//! let app = fixtures::employer_hosted_application(ApplicationStatus::Active);
//! assert!(app.opportunity().employer_id().is_some());
//! ```

use crate::application::{InternshipApplication, InternshipOpportunity};
use crate::identity::{Actor, Role};
use crate::ids::{ApplicationId, EmployerId, InstitutionId, OpportunityId, StudentId, UserId};
use crate::status::ApplicationStatus;

/// An actor holding a single role.
#[must_use]
pub fn actor_with(role: Role) -> Actor {
    Actor::new(UserId::new()).with_role(role)
}

/// Platform staff.
#[must_use]
pub fn system_admin() -> Actor {
    actor_with(Role::SystemAdmin)
}

/// An institution administrator.
#[must_use]
pub fn institution_admin() -> Actor {
    actor_with(Role::InstitutionAdmin)
}

/// An employer administrator.
#[must_use]
pub fn employer_admin() -> Actor {
    actor_with(Role::EmployerAdmin)
}

/// A student user.
#[must_use]
pub fn student() -> Actor {
    actor_with(Role::Student)
}

/// An authenticated user without role flags (e.g. a plain supervisor).
#[must_use]
pub fn plain_user() -> Actor {
    Actor::new(UserId::new())
}

/// An application by a fresh student to a fresh employer's opportunity.
#[must_use]
pub fn employer_hosted_application(status: ApplicationStatus) -> InternshipApplication {
    application_to(
        InternshipOpportunity::employer_hosted(OpportunityId::new(), EmployerId::new()),
        status,
    )
}

/// An application by a fresh student to an opportunity hosted by `institution`.
#[must_use]
pub fn institution_hosted_application(
    institution: InstitutionId,
    status: ApplicationStatus,
) -> InternshipApplication {
    application_to(
        InternshipOpportunity::institution_hosted(OpportunityId::new(), institution),
        status,
    )
}

/// An application by a fresh student to `opportunity`.
#[must_use]
pub fn application_to(
    opportunity: InternshipOpportunity,
    status: ApplicationStatus,
) -> InternshipApplication {
    InternshipApplication::new(ApplicationId::new(), StudentId::new(), opportunity)
        .with_status(status)
}
