//! Placement Authorization - policy decisions for internship applications
//!
//! This crate decides which actor may view an internship application, move it
//! through its lifecycle, certify it, or review the evidence submitted against
//! it.
//!
//! # Overview
//!
//! - [`Directory`] is the lookup capability set the surrounding system
//!   implements (affiliations, staff and supervisor profiles, student profiles)
//! - [`IdentityResolver`] fetches facts through a directory without deciding
//!   anything
//! - [`PolicyEvaluator`] turns facts into allow/deny decisions
//! - [`Authorizer`] adds caching, metrics and audit logging on top
//!
//! # Architecture
//!
//! ```text
//!                      ┌────────────────────────────┐
//!                      │   Directory (injected)     │
//!                      └──────────┬─────────────────┘
//!                                 │ affiliations, profiles
//!                      ┌──────────▼─────────────────┐
//!                      │   IdentityResolver         │
//!                      └──────────┬─────────────────┘
//!                                 │ facts
//!   actor, application ┌──────────▼─────────────────┐
//!          │           │   PolicyEvaluator          │
//!          ▼           │   (+ TransitionTable)      │
//!     ┌────────────┐   └──────────┬─────────────────┘
//!     │ Authorizer │──────────────▼
//!     │ (cache)    │   PolicyDecision (allow/deny)
//!     └────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use placement_authz::{Action, Authorizer, EvaluatorConfig, InMemoryDirectory};
//! use placement_core::{fixtures, ApplicationStatus, InstitutionId};
//!
//! let directory = InMemoryDirectory::new();
//! let admin = fixtures::institution_admin();
//! let institution = InstitutionId::new();
//! let app = fixtures::employer_hosted_application(ApplicationStatus::Completed);
//! directory.set_actor_institution(&admin, institution);
//! directory.affiliate(app.student_id, institution);
//!
//! let authorizer = Authorizer::with_config(Arc::new(directory), EvaluatorConfig::testing());
//! let decision = authorizer
//!     .authorize(&admin, &app, Action::Transition(ApplicationStatus::Certified))
//!     .unwrap();
//! assert!(decision.allowed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod decision;
pub mod directory;
pub mod error;
pub mod evaluator;
pub mod memory;

use std::sync::Arc;
use std::time::Instant;

use placement_core::{Actor, ApplicationId, ApplicationStatus, InternshipApplication};
use placement_telemetry::metrics as telemetry;

// Re-exports for convenience
pub use cache::{CacheConfig, CacheStats, DecisionCache};
pub use config::EvaluatorConfig;
pub use decision::{Action, DecisionBasis, DenyReason, PolicyDecision};
pub use directory::{Directory, IdentityResolver};
pub use error::{AuthzError, AuthzResult, DirectoryError, DirectoryResult};
pub use evaluator::PolicyEvaluator;
pub use memory::InMemoryDirectory;

/// Main authorization service.
///
/// Combines policy evaluation with caching, metrics and audit logging.
#[derive(Debug)]
pub struct Authorizer {
    /// Policy evaluator.
    evaluator: PolicyEvaluator,
    /// Decision cache.
    cache: DecisionCache,
    /// Authorizer configuration.
    config: EvaluatorConfig,
}

impl Authorizer {
    /// Create a new Authorizer with the given evaluator and configuration.
    pub fn new(evaluator: PolicyEvaluator, config: EvaluatorConfig) -> Self {
        let cache = DecisionCache::new(config.cache_config.clone());
        Self {
            evaluator,
            cache,
            config,
        }
    }

    /// Create an Authorizer over a directory from configuration.
    pub fn with_config(directory: Arc<dyn Directory>, config: EvaluatorConfig) -> Self {
        Self::new(PolicyEvaluator::new(directory), config)
    }

    /// Create an Authorizer with the development configuration.
    ///
    /// For production, use `with_config(directory, EvaluatorConfig::production())`.
    pub fn with_defaults(directory: Arc<dyn Directory>) -> Self {
        Self::with_config(directory, EvaluatorConfig::development())
    }

    /// Evaluate an authorization request.
    ///
    /// First checks the cache, then evaluates against the policy. Lookup
    /// failures are returned as errors and never cached.
    pub fn authorize(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        action: Action,
    ) -> AuthzResult<PolicyDecision> {
        if let Some(decision) = self.cache.get(actor, application, action) {
            tracing::debug!(
                actor = %actor.log_id(),
                application_id = %application.id,
                action = %action,
                cached = true,
                "returning cached decision"
            );
            if self.config.record_metrics {
                telemetry::record_cache_hit(action.name());
            }
            self.audit(actor, application, action, &decision, true);
            return Ok(decision);
        }

        let start = Instant::now();
        let decision = self.evaluator.evaluate(actor, application, action)?;
        if self.config.record_metrics {
            telemetry::record_decision(action.name(), decision.allowed, start.elapsed());
        }

        if self.cache.should_cache(&decision) {
            self.cache.insert(actor, application, action, &decision);
        }

        self.audit(actor, application, action, &decision, false);
        Ok(decision)
    }

    /// Authorize and turn a deny into [`AuthzError::AccessDenied`].
    pub fn enforce(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        action: Action,
    ) -> AuthzResult<PolicyDecision> {
        let decision = self.authorize(actor, application, action)?;
        if decision.allowed {
            Ok(decision)
        } else {
            Err(AuthzError::access_denied(decision.label()))
        }
    }

    /// Whether the actor may view the application.
    pub fn can_view_application(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        Ok(self.authorize(actor, application, Action::View)?.allowed)
    }

    /// Whether the actor may move the application to `new_status`.
    pub fn can_transition_application(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        new_status: ApplicationStatus,
    ) -> AuthzResult<bool> {
        Ok(self
            .authorize(actor, application, Action::Transition(new_status))?
            .allowed)
    }

    /// Whether the actor may review evidence on the application.
    pub fn can_review_evidence(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<bool> {
        Ok(self
            .authorize(actor, application, Action::ReviewEvidence)?
            .allowed)
    }

    /// Statuses the actor may move the application to. Not cached.
    pub fn allowed_transitions(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
    ) -> AuthzResult<Vec<ApplicationStatus>> {
        self.evaluator.allowed_transitions(actor, application)
    }

    /// The underlying evaluator.
    pub fn evaluator(&self) -> &PolicyEvaluator {
        &self.evaluator
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Clear the decision cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop cached decisions about one application, e.g. after a status change.
    pub fn invalidate_application(&self, application: ApplicationId) {
        self.cache.invalidate_application(application);
    }

    fn audit(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        action: Action,
        decision: &PolicyDecision,
        cached: bool,
    ) {
        if !self.config.audit_decisions {
            return;
        }
        tracing::info!(
            target: placement_telemetry::AUDIT_TARGET,
            actor = %actor.log_id(),
            application_id = %application.id,
            status = %application.status,
            action = %action,
            allowed = decision.allowed,
            outcome = %decision.label(),
            cached,
            "authorization decision"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::{fixtures, InstitutionId};

    fn seeded() -> (InMemoryDirectory, Actor, InternshipApplication) {
        let directory = InMemoryDirectory::new();
        let admin = fixtures::institution_admin();
        let institution = InstitutionId::new();
        let app = fixtures::employer_hosted_application(ApplicationStatus::Active);
        directory.set_actor_institution(&admin, institution);
        directory.affiliate(app.student_id, institution);
        (directory, admin, app)
    }

    #[test]
    fn test_cache_stats_start_empty() {
        let authorizer = Authorizer::with_defaults(Arc::new(InMemoryDirectory::new()));
        let stats = authorizer.cache_stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_repeated_authorization_hits_cache() {
        let (directory, admin, app) = seeded();
        let authorizer = Authorizer::with_config(
            Arc::new(directory.clone()),
            EvaluatorConfig::default().with_record_metrics(false),
        );

        assert!(authorizer.can_view_application(&admin, &app).unwrap());
        let lookups = directory.lookup_count();
        assert!(authorizer.can_view_application(&admin, &app).unwrap());

        assert_eq!(directory.lookup_count(), lookups);
        assert_eq!(authorizer.cache_stats().hits, 1);
    }

    #[test]
    fn test_cache_hit_keeps_original_evaluation_time() {
        let (directory, admin, app) = seeded();
        let authorizer = Authorizer::with_config(
            Arc::new(directory),
            EvaluatorConfig::default().with_record_metrics(false),
        );

        let first = authorizer.authorize(&admin, &app, Action::View).unwrap();
        let second = authorizer.authorize(&admin, &app, Action::View).unwrap();

        assert_eq!(authorizer.cache_stats().hits, 1);
        assert_eq!(second.evaluated_at, first.evaluated_at);
    }

    #[test]
    fn test_invalidate_application_forces_reevaluation() {
        let (directory, admin, app) = seeded();
        let authorizer = Authorizer::with_config(
            Arc::new(directory.clone()),
            EvaluatorConfig::default().with_record_metrics(false),
        );

        assert!(authorizer.can_review_evidence(&admin, &app).unwrap());
        directory.revoke_affiliation(app.student_id);
        authorizer.invalidate_application(app.id);
        assert!(!authorizer.can_review_evidence(&admin, &app).unwrap());
    }

    #[test]
    fn test_enforce_maps_deny_to_error() {
        let authorizer = Authorizer::with_config(
            Arc::new(InMemoryDirectory::new()),
            EvaluatorConfig::testing(),
        );
        let app = fixtures::employer_hosted_application(ApplicationStatus::Active);

        let err = authorizer
            .enforce(&fixtures::employer_admin(), &app, Action::ReviewEvidence)
            .unwrap_err();
        assert!(err.is_access_denied());
        assert_eq!(err.status_code(), http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_lookup_failures_are_not_cached() {
        let (directory, admin, app) = seeded();
        let authorizer =
            Authorizer::with_config(Arc::new(directory.clone()), EvaluatorConfig::testing());

        directory.set_failing(true);
        let err = authorizer.authorize(&admin, &app, Action::View).unwrap_err();
        assert!(err.is_retryable());

        directory.set_failing(false);
        assert!(authorizer.authorize(&admin, &app, Action::View).unwrap().allowed);
    }
}
