//! Actor identity and role flags.
//!
//! An [`Actor`] is the principal making a request. It is supplied by the
//! session layer and carries a set of independent [`Role`] flags. An actor may
//! hold several roles at once; policy branches consult them in a fixed
//! precedence order:
//!
//! 1. [`Role::SystemAdmin`]
//! 2. [`Role::Student`]
//! 3. [`Role::InstitutionAdmin`]
//! 4. [`Role::EmployerAdmin`]
//! 5. assigned supervisor (not a flag; derived from profile lookups)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A role flag carried by an [`Actor`].
///
/// Variants are declared in policy precedence order, so iterating a
/// [`BTreeSet<Role>`] visits them highest-precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform staff with global authority.
    SystemAdmin,
    /// A student who applies to opportunities.
    Student,
    /// Administrator of an institution.
    InstitutionAdmin,
    /// Administrator of an employer.
    EmployerAdmin,
}

impl Role {
    /// Returns the stable name used in logs and configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::Student => "student",
            Self::InstitutionAdmin => "institution_admin",
            Self::EmployerAdmin => "employer_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The principal making a request.
///
/// # Example
///
/// ```
/// use placement_core::{Actor, Role, UserId};
///
/// let actor = Actor::new(UserId::new()).with_role(Role::InstitutionAdmin);
/// assert!(actor.is_institution_admin());
/// assert!(!actor.is_system_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// The authenticated user behind this actor.
    pub id: UserId,
    /// Role flags held by the actor.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl Actor {
    /// Creates an actor with no roles.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            roles: BTreeSet::new(),
        }
    }

    /// Adds a role flag.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Adds several role flags.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    /// Returns true if the actor holds `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Platform staff override.
    pub fn is_system_admin(&self) -> bool {
        self.has_role(Role::SystemAdmin)
    }

    /// Student flag.
    pub fn is_student(&self) -> bool {
        self.has_role(Role::Student)
    }

    /// Institution administrator flag.
    pub fn is_institution_admin(&self) -> bool {
        self.has_role(Role::InstitutionAdmin)
    }

    /// Employer administrator flag.
    pub fn is_employer_admin(&self) -> bool {
        self.has_role(Role::EmployerAdmin)
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// The format is `user:<id>`; it never carries session material.
    pub fn log_id(&self) -> String {
        format!("user:{}", self.id)
    }
}
