//! End-to-end behavior of the assessment service: configuration lifecycle, persisted results,
//! reviewer overrides, the audit trail, and concurrent batches.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use loan_risk::assessment::{
        ApplicantSnapshot, ApplicationId, CollateralType, CreditProfile, EmploymentProfile,
        EmploymentType, IncomeProfile, LoanTerms, RiskConfiguration,
    };
    use loan_risk::origination::{
        AuditError, AuditEvent, AuditPublisher, ConfigurationRegistry,
        InMemoryAssessmentRepository, InMemoryAuditPublisher, RiskAssessmentService,
    };

    pub(super) type Service =
        RiskAssessmentService<InMemoryAssessmentRepository, InMemoryAuditPublisher>;

    pub(super) fn assessed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn service_with(
        registry: ConfigurationRegistry,
    ) -> (Service, Arc<InMemoryAuditPublisher>) {
        let audit = Arc::new(InMemoryAuditPublisher::new());
        let service = RiskAssessmentService::new(
            Arc::new(registry),
            Arc::new(InMemoryAssessmentRepository::new()),
            Arc::clone(&audit),
        );
        (service, audit)
    }

    pub(super) fn standard_service() -> (Service, Arc<InMemoryAuditPublisher>) {
        service_with(ConfigurationRegistry::with_active(RiskConfiguration::standard()))
    }

    pub(super) fn prime_applicant(id: &str) -> ApplicantSnapshot {
        ApplicantSnapshot {
            application_id: ApplicationId(id.to_string()),
            credit: CreditProfile {
                credit_score: Some(750),
                credit_score_date: NaiveDate::from_ymd_opt(2025, 5, 15),
                prior_defaults: Some(0),
            },
            income: IncomeProfile {
                annual_income: None,
                monthly_income: Some(6000.0),
                other_income: 0.0,
                monthly_expenses: Some(2000.0),
                net_worth: None,
            },
            employment: EmploymentProfile {
                employment_type: Some(EmploymentType::FullTime),
                years_employed: 5.0,
                years_in_industry: 10.0,
            },
            loan: LoanTerms {
                loan_amount: 50_000.0,
                collateral_value: Some(80_000.0),
                collateral_type: Some(CollateralType::RealEstate),
            },
            debt_to_income_ratio: Some(0.30),
            market_condition_score: None,
        }
    }

    pub(super) fn marginal_applicant(id: &str) -> ApplicantSnapshot {
        ApplicantSnapshot {
            application_id: ApplicationId(id.to_string()),
            credit: CreditProfile {
                credit_score: Some(620),
                credit_score_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                prior_defaults: Some(1),
            },
            income: IncomeProfile {
                annual_income: None,
                monthly_income: Some(5000.0),
                other_income: 0.0,
                monthly_expenses: Some(3000.0),
                net_worth: None,
            },
            employment: EmploymentProfile {
                employment_type: Some(EmploymentType::SelfEmployed),
                years_employed: 3.0,
                years_in_industry: 6.0,
            },
            loan: LoanTerms {
                loan_amount: 60_000.0,
                collateral_value: Some(50_000.0),
                collateral_type: Some(CollateralType::Equipment),
            },
            debt_to_income_ratio: Some(0.50),
            market_condition_score: None,
        }
    }

    pub(super) struct FailingAuditPublisher;

    impl AuditPublisher for FailingAuditPublisher {
        fn publish(&self, _event: AuditEvent) -> Result<(), AuditError> {
            Err(AuditError::Transport("ledger offline".to_string()))
        }
    }
}

use std::sync::Arc;

use common::*;
use loan_risk::assessment::{
    AssessmentError, ConfigVersion, Recommendation, RiskConfiguration,
};
use loan_risk::origination::{
    AssessmentServiceError, ConfigurationRegistry, InMemoryAssessmentRepository, RegistryError,
    ReviewOverride, RiskAssessmentService,
};

fn draft(version: &str) -> loan_risk::assessment::ConfigurationDraft {
    let mut draft = RiskConfiguration::standard().to_draft();
    draft.version = ConfigVersion(version.to_string());
    draft
}

#[test]
fn assessment_is_persisted_and_audited() {
    let (service, audit) = standard_service();

    let record = service
        .assess(&prime_applicant("app-100"), assessed_at())
        .expect("assessment succeeds");

    assert!(record.assessment_id.0.starts_with("asm-"));
    assert_eq!(record.result.recommendation, Recommendation::Approve);
    assert_eq!(record.result.config_version.0, "2024.1");
    assert_eq!(service.get(&record.assessment_id).expect("stored"), record);

    let events = audit.events();
    let completed = events
        .iter()
        .find(|event| event.action == "assessment_completed")
        .expect("completion audited");
    assert_eq!(completed.subject, record.assessment_id.0);
    assert_eq!(completed.details["application_id"], "app-100");
    assert_eq!(completed.details["recommendation"], "APPROVE");
}

#[test]
fn missing_active_configuration_is_a_precondition_failure() {
    let registry = ConfigurationRegistry::new();
    registry.create(draft("draft-only")).expect("draft stored");
    let (service, audit) = service_with(registry);

    let err = service
        .assess(&prime_applicant("app-101"), assessed_at())
        .expect_err("no active configuration");

    assert!(matches!(
        err,
        AssessmentServiceError::Assessment(AssessmentError::MissingConfiguration(_))
    ));
    assert!(audit.events().is_empty());
}

#[test]
fn activation_switches_the_version_used_by_new_assessments() {
    let (service, audit) = standard_service();
    let mut stricter = draft("2025.1");
    stricter.auto_approve_threshold = 10.0;
    service
        .create_configuration(stricter)
        .expect("new version stored");

    let before = service
        .assess(&prime_applicant("app-102"), assessed_at())
        .expect("assessed with 2024.1");
    service
        .activate_configuration(&ConfigVersion("2025.1".to_string()))
        .expect("activate 2025.1");
    let after = service
        .assess(&prime_applicant("app-102"), assessed_at())
        .expect("assessed with 2025.1");

    assert_eq!(before.result.config_version.0, "2024.1");
    assert_eq!(after.result.config_version.0, "2025.1");
    assert_eq!(before.result.risk_score, after.result.risk_score);
    assert_eq!(before.result.recommendation, Recommendation::Approve);
    assert_eq!(after.result.recommendation, Recommendation::Review);

    let activated = audit
        .events()
        .into_iter()
        .find(|event| event.action == "configuration_activated")
        .expect("activation audited");
    assert_eq!(activated.details["previous_version"], "2024.1");

    let history = service
        .history(&loan_risk::assessment::ApplicationId("app-102".to_string()))
        .expect("history");
    assert_eq!(history.len(), 2);
}

#[test]
fn activated_versions_cannot_be_edited() {
    let (service, _audit) = standard_service();
    let mut edited = draft("2024.1");
    edited.auto_reject_threshold = 80.0;

    assert!(matches!(
        service.registry().update(edited),
        Err(RegistryError::Immutable(_))
    ));
}

#[test]
fn named_versions_can_be_assessed_without_activation() {
    let (service, _audit) = standard_service();
    let mut lenient = draft("what-if");
    lenient.auto_approve_threshold = 60.0;
    service.create_configuration(lenient).expect("stored");

    let record = service
        .assess_with_version(
            &marginal_applicant("app-103"),
            &ConfigVersion("what-if".to_string()),
            assessed_at(),
        )
        .expect("what-if assessment");

    assert_eq!(record.result.config_version.0, "what-if");
    assert_eq!(record.result.recommendation, Recommendation::Approve);
    assert_eq!(
        service.registry().active().expect("active").version().0,
        "2024.1"
    );
}

#[test]
fn reviewer_override_is_layered_on_top_of_the_result() {
    let (service, audit) = standard_service();
    let record = service
        .assess(&marginal_applicant("app-104"), assessed_at())
        .expect("assessment succeeds");
    assert_eq!(record.result.recommendation, Recommendation::Review);

    let updated = service
        .record_override(
            &record.assessment_id,
            ReviewOverride {
                reviewer: "underwriter-7".to_string(),
                recommendation: Recommendation::Approve,
                reason: "verified additional assets".to_string(),
                recorded_at: assessed_at(),
            },
        )
        .expect("override recorded");

    assert_eq!(updated.result, record.result);
    assert_eq!(updated.effective_recommendation(), Recommendation::Approve);
    let view = updated.status_view();
    assert!(view.overridden);
    assert_eq!(view.recommendation, "APPROVE");

    let overridden = audit
        .events()
        .into_iter()
        .find(|event| event.action == "assessment_overridden")
        .expect("override audited");
    assert_eq!(overridden.details["engine_recommendation"], "REVIEW");
    assert_eq!(overridden.details["override_recommendation"], "APPROVE");
}

#[test]
fn incomplete_applications_are_not_persisted() {
    let (service, audit) = standard_service();
    let mut snapshot = prime_applicant("app-105");
    snapshot.credit.credit_score = None;

    let err = service
        .assess(&snapshot, assessed_at())
        .expect_err("credit score missing");
    assert!(matches!(
        err,
        AssessmentServiceError::Assessment(AssessmentError::IncompleteInput { .. })
    ));
    assert!(service
        .history(&snapshot.application_id)
        .expect("history")
        .is_empty());
    assert!(audit.events().is_empty());
}

#[test]
fn audit_failures_surface_to_the_caller() {
    let service = RiskAssessmentService::new(
        Arc::new(ConfigurationRegistry::with_active(
            RiskConfiguration::standard(),
        )),
        Arc::new(InMemoryAssessmentRepository::new()),
        Arc::new(FailingAuditPublisher),
    );

    let err = service
        .assess(&prime_applicant("app-106"), assessed_at())
        .expect_err("audit transport down");
    assert!(matches!(err, AssessmentServiceError::Audit(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_preserves_input_order_and_isolates_failures() {
    let (service, _audit) = standard_service();
    let service = Arc::new(service);

    let mut incomplete = prime_applicant("batch-2");
    incomplete.debt_to_income_ratio = None;
    let snapshots = vec![
        prime_applicant("batch-0"),
        marginal_applicant("batch-1"),
        incomplete,
        prime_applicant("batch-3"),
        marginal_applicant("batch-4"),
    ];

    let outcomes = Arc::clone(&service)
        .assess_batch(snapshots, assessed_at(), 2)
        .await
        .expect("batch runs");

    assert_eq!(outcomes.len(), 5);
    for (index, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(record) => {
                assert_eq!(record.result.application_id.0, format!("batch-{index}"));
            }
            Err(err) => {
                assert_eq!(index, 2);
                assert!(err.to_string().contains("debt_to_income_ratio"));
            }
        }
    }
    assert!(outcomes[2].is_err());

    let sequential = service
        .assess(&marginal_applicant("batch-1"), assessed_at())
        .expect("sequential run");
    let concurrent = outcomes[1].as_ref().expect("batch entry succeeded");
    assert_eq!(sequential.result, concurrent.result);
}

#[tokio::test]
async fn batch_without_active_configuration_fails_up_front() {
    let (service, _audit) = service_with(ConfigurationRegistry::new());

    let result = Arc::new(service)
        .assess_batch(vec![prime_applicant("batch-x")], assessed_at(), 4)
        .await;

    assert!(matches!(
        result,
        Err(AssessmentServiceError::Assessment(
            AssessmentError::MissingConfiguration(_)
        ))
    ));
}
