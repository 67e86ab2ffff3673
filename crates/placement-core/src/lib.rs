//! # Placement Core
//!
//! Domain types for internship placement authorization.
//!
//! This crate provides the model the policy engine reasons about:
//!
//! - [`Actor`] and [`Role`] - the principal making a request and its role flags
//! - [`InternshipOpportunity`] - a posting owned by exactly one employer or institution
//! - [`InternshipApplication`] - a student's application, its status and supervisors
//! - [`ApplicationStatus`] and [`TransitionTable`] - the lifecycle and its legal moves
//! - [`Affiliation`], [`StaffProfile`], [`SupervisorProfile`], [`StudentProfile`] -
//!   facts resolved from the surrounding system
//! - [`DomainError`] - integrity faults rejected at construction

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod application;
mod error;
pub mod fixtures;
mod identity;
mod ids;
mod profile;
mod status;

pub use application::{InternshipApplication, InternshipOpportunity, OpportunityHost, SupervisorKind};
pub use error::{DomainError, DomainResult};
pub use identity::{Actor, Role};
pub use ids::{
    ApplicationId, EmployerId, InstitutionId, OpportunityId, StudentId, SupervisorId, UserId,
};
pub use profile::{Affiliation, StaffProfile, StudentProfile, SupervisorProfile};
pub use status::{ApplicationStatus, TransitionTable, TransitionTableBuilder};
