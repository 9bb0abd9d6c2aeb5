use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Args;
use loan_risk::assessment::{
    ApplicantSnapshot, ApplicationId, CollateralType, CreditProfile, EmploymentProfile,
    EmploymentType, IncomeProfile, LoanTerms, Recommendation,
};
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::origination::ReviewOverride;

use crate::infra::{
    assessment_time, build_service, parse_date, render_record, resolve_configuration,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Assessment date (YYYY-MM-DD). Defaults to 2025-06-01 so the output is reproducible.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Skip the reviewer override step.
    #[arg(long)]
    pub(crate) skip_override: bool,
}

pub(crate) fn run_demo(
    args: DemoArgs,
    config_path: Option<&Path>,
    app_config: &AppConfig,
) -> Result<(), AppError> {
    let as_of = match args.as_of {
        Some(date) => date,
        None => parse_date("2025-06-01").map_err(AppError::Usage)?,
    };
    let assessed_at = assessment_time(Some(as_of));

    let configuration = resolve_configuration(config_path, &app_config.risk)?;
    println!(
        "Loan risk assessment demo (configuration {}, as of {})",
        configuration.version(),
        as_of
    );
    let (service, audit) = build_service(configuration);

    let mut review_candidate = None;
    for snapshot in [prime_applicant(as_of), marginal_applicant(as_of)] {
        let record = service.assess(&snapshot, assessed_at)?;
        render_record(&record);
        if record.result.recommendation == Recommendation::Review {
            review_candidate = Some(record.assessment_id.clone());
        }
    }

    if let (false, Some(assessment_id)) = (args.skip_override, review_candidate) {
        let updated = service.record_override(
            &assessment_id,
            ReviewOverride {
                reviewer: "demo-underwriter".to_string(),
                recommendation: Recommendation::Approve,
                reason: "co-signer added after manual review".to_string(),
                recorded_at: Utc::now(),
            },
        )?;
        let view = updated.status_view();
        println!(
            "\nReviewer override on {}: engine said {}, final decision {}",
            view.assessment_id,
            updated.result.recommendation.label(),
            view.recommendation
        );
    }

    println!("\nAudit trail:");
    for event in audit.events() {
        let details: Vec<String> = event
            .details
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        println!("  - {} {} {}", event.action, event.subject, details.join(" "));
    }

    Ok(())
}

/// Salaried borrower with strong credit and real-estate collateral at 62.5% LTV.
fn prime_applicant(as_of: NaiveDate) -> ApplicantSnapshot {
    ApplicantSnapshot {
        application_id: ApplicationId("demo-prime".to_string()),
        credit: CreditProfile {
            credit_score: Some(750),
            credit_score_date: as_of.checked_sub_days(chrono::Days::new(17)),
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

/// Self-employed borrower with a prior default and a loan larger than its equipment collateral.
fn marginal_applicant(as_of: NaiveDate) -> ApplicantSnapshot {
    ApplicantSnapshot {
        application_id: ApplicationId("demo-marginal".to_string()),
        credit: CreditProfile {
            credit_score: Some(620),
            credit_score_date: as_of.checked_sub_days(chrono::Days::new(151)),
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
