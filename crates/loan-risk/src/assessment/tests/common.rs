use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::assessment::configuration::RiskConfiguration;
use crate::assessment::domain::{
    ApplicantSnapshot, ApplicationId, CollateralType, CreditProfile, EmploymentProfile,
    EmploymentType, IncomeProfile, LoanTerms,
};
use crate::assessment::factors::{AssessmentContext, FactorAssessor, FactorScore};
use crate::assessment::RiskAssessmentEngine;

pub(super) fn assessed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn engine() -> RiskAssessmentEngine {
    RiskAssessmentEngine::new()
}

pub(super) fn config() -> RiskConfiguration {
    RiskConfiguration::standard()
}

/// Salaried borrower with strong credit and real-estate collateral at 62.5% LTV.
pub(super) fn prime_applicant() -> ApplicantSnapshot {
    ApplicantSnapshot {
        application_id: ApplicationId("app-prime".to_string()),
        credit: CreditProfile {
            credit_score: Some(750),
            credit_score_date: Some(NaiveDate::from_ymd_opt(2025, 5, 15).expect("valid date")),
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

/// Self-employed borrower with a prior default, 50% DTI, and collateral at ~0.83x the loan.
pub(super) fn marginal_applicant() -> ApplicantSnapshot {
    ApplicantSnapshot {
        application_id: ApplicationId("app-marginal".to_string()),
        credit: CreditProfile {
            credit_score: Some(620),
            credit_score_date: Some(NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")),
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

pub(super) fn unsecured_applicant() -> ApplicantSnapshot {
    let mut snapshot = prime_applicant();
    snapshot.application_id = ApplicationId("app-unsecured".to_string());
    snapshot.loan.collateral_value = None;
    snapshot.loan.collateral_type = None;
    snapshot
}

pub(super) fn assess_factor(
    assessor: &dyn FactorAssessor,
    snapshot: &ApplicantSnapshot,
) -> FactorScore {
    let config = config();
    let context = AssessmentContext {
        config: &config,
        as_of: assessed_at().date_naive(),
    };
    assessor
        .assess(snapshot, &context)
        .expect("factor assessment succeeds")
}
