//! Strongly typed identifiers.
//!
//! Every entity the policy engine reasons about is referenced by a UUID
//! newtype, so a student id can never be compared against an institution id
//! by accident.
//!
//! # Example
//!
//! ```
//! use placement_core::{InstitutionId, StudentId};
//!
//! let institution = InstitutionId::new();
//! let student = StudentId::new();
//! assert_ne!(institution.as_uuid(), student.as_uuid());
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered (UUID v7) identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of an authenticated platform user (the principal behind an [`Actor`](crate::Actor)).
    UserId
);
define_id!(
    /// Identifier of a student profile.
    StudentId
);
define_id!(
    /// Identifier of an institution (university, college, training provider).
    InstitutionId
);
define_id!(
    /// Identifier of an employer organisation.
    EmployerId
);
define_id!(
    /// Identifier of an internship opportunity.
    OpportunityId
);
define_id!(
    /// Identifier of an internship application.
    ApplicationId
);
define_id!(
    /// Identifier of a supervisor profile, either institution staff or employer-side.
    SupervisorId
);
