//! Property tests for the authorization rules.

use std::sync::Arc;

use placement_authz::{Action, EvaluatorConfig, InMemoryDirectory, PolicyEvaluator};
use placement_core::{
    fixtures, ApplicationStatus, EmployerId, InstitutionId, InternshipApplication,
    InternshipOpportunity, OpportunityId,
};
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = ApplicationStatus> {
    prop::sample::select(ApplicationStatus::ALL.to_vec())
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::View),
        Just(Action::ReviewEvidence),
        any_status().prop_map(Action::Transition),
    ]
}

/// Employer- or institution-hosted application in the given status.
fn any_application() -> impl Strategy<Value = InternshipApplication> {
    (any::<bool>(), any_status()).prop_map(|(employer_hosted, status)| {
        let opportunity = if employer_hosted {
            InternshipOpportunity::employer_hosted(OpportunityId::new(), EmployerId::new())
        } else {
            InternshipOpportunity::institution_hosted(OpportunityId::new(), InstitutionId::new())
        };
        fixtures::application_to(opportunity, status)
    })
}

fn evaluator(directory: &InMemoryDirectory) -> PolicyEvaluator {
    PolicyEvaluator::new(Arc::new(directory.clone()))
}

proptest! {
    #[test]
    fn system_admin_views_every_application(app in any_application()) {
        let directory = InMemoryDirectory::new();
        prop_assert!(evaluator(&directory)
            .can_view_application(&fixtures::system_admin(), &app)
            .unwrap());
    }

    #[test]
    fn supervisors_lose_review_at_certification(
        status in any_status(),
        institution_side in any::<bool>(),
    ) {
        let directory = InMemoryDirectory::new();
        let supervisor = fixtures::plain_user();
        let app = fixtures::employer_hosted_application(status);
        let app = if institution_side {
            let institution = InstitutionId::new();
            directory.set_actor_institution(&supervisor, institution);
            let profile = directory.add_staff(&supervisor, institution);
            app.with_institution_supervisor(profile)
        } else {
            let employer = app.opportunity().employer_id().unwrap();
            let profile = directory.add_employer_supervisor(&supervisor, employer);
            app.with_employer_supervisor(profile)
        };

        let allowed = evaluator(&directory).can_review_evidence(&supervisor, &app).unwrap();
        prop_assert_eq!(allowed, status != ApplicationStatus::Certified);
    }

    #[test]
    fn affiliated_admin_view_ignores_host(app in any_application()) {
        let directory = InMemoryDirectory::new();
        let admin = fixtures::institution_admin();
        let institution = InstitutionId::new();
        directory.set_actor_institution(&admin, institution);
        directory.affiliate(app.student_id, institution);

        prop_assert!(evaluator(&directory).can_view_application(&admin, &app).unwrap());
    }

    #[test]
    fn admin_of_other_institution_never_certifies(app in any_application()) {
        let directory = InMemoryDirectory::new();
        let admin = fixtures::institution_admin();
        directory.set_actor_institution(&admin, InstitutionId::new());
        directory.affiliate(app.student_id, InstitutionId::new());

        prop_assert!(!evaluator(&directory)
            .can_transition_application(&admin, &app, ApplicationStatus::Certified)
            .unwrap());
    }

    #[test]
    fn decisions_are_repeatable(app in any_application(), action in any_action()) {
        let directory = InMemoryDirectory::new();
        let admin = fixtures::institution_admin();
        let institution = InstitutionId::new();
        directory.set_actor_institution(&admin, institution);
        directory.affiliate(app.student_id, institution);

        let evaluator = evaluator(&directory);
        let first = evaluator.evaluate(&admin, &app, action).unwrap();
        let second = evaluator.evaluate(&admin, &app, action).unwrap();
        prop_assert_eq!(first.allowed, second.allowed);
        prop_assert_eq!(first.basis, second.basis);
        prop_assert_eq!(first.reason, second.reason);
    }

    #[test]
    fn cached_and_uncached_authorizers_agree(app in any_application(), action in any_action()) {
        let directory = InMemoryDirectory::new();
        let admin = fixtures::institution_admin();
        let institution = InstitutionId::new();
        directory.set_actor_institution(&admin, institution);
        directory.affiliate(app.student_id, institution);

        let cached = placement_authz::Authorizer::with_config(
            Arc::new(directory.clone()),
            EvaluatorConfig::development().with_audit_decisions(false),
        );
        let uncached = placement_authz::Authorizer::with_config(
            Arc::new(directory.clone()),
            EvaluatorConfig::testing(),
        );

        for _ in 0..2 {
            prop_assert_eq!(
                cached.authorize(&admin, &app, action).unwrap().allowed,
                uncached.authorize(&admin, &app, action).unwrap().allowed
            );
        }
    }
}
