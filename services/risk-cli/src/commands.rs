use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Args;
use loan_risk::assessment::{FactorKind, RiskConfiguration};
use loan_risk::config::{load_configuration_file, AppConfig};
use loan_risk::error::AppError;
use loan_risk::import::ApplicantCsvImporter;
use serde_json::json;
use tracing::info;

use crate::infra::{
    assessment_time, build_service, print_json, read_applicant, render_record,
    resolve_configuration,
};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Applicant snapshot JSON file
    #[arg(long)]
    pub(crate) applicant: PathBuf,
    /// Assessment date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the full result as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one applicant per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Maximum assessments in flight, overriding RISK_BATCH_CONCURRENCY
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,
    /// Assessment date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print one JSON document per applicant instead of a summary table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_assess(
    args: AssessArgs,
    config_path: Option<&Path>,
    app_config: &AppConfig,
) -> Result<(), AppError> {
    let configuration = resolve_configuration(config_path, &app_config.risk)?;
    let snapshot = read_applicant(&args.applicant)?;
    let (service, _audit) = build_service(configuration);

    let record = service.assess(&snapshot, assessment_time(args.as_of))?;
    if args.json {
        print_json(&record.result)
    } else {
        render_record(&record);
        Ok(())
    }
}

pub(crate) async fn run_batch(
    args: BatchArgs,
    config_path: Option<&Path>,
    app_config: &AppConfig,
) -> Result<(), AppError> {
    let concurrency = match args.concurrency {
        Some(0) => return Err(AppError::Usage("--concurrency must be at least 1".to_string())),
        Some(value) => value,
        None => app_config.risk.batch_concurrency,
    };

    let configuration = resolve_configuration(config_path, &app_config.risk)?;
    let snapshots = ApplicantCsvImporter::from_path(&args.csv)?;
    info!(
        path = %args.csv.display(),
        applicants = snapshots.len(),
        "applicant export loaded"
    );

    let (service, _audit) = build_service(configuration);
    let outcomes = Arc::clone(&service)
        .assess_batch(snapshots, assessment_time(args.as_of), concurrency)
        .await?;

    if args.json {
        let documents: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|outcome| match outcome {
                Ok(record) => json!({
                    "assessment": record.status_view(),
                    "result": record.result,
                }),
                Err(err) => json!({ "error": err.to_string() }),
            })
            .collect();
        return print_json(&documents);
    }

    let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
    println!(
        "{:<16} {:>6} {:<9} {:<8} {:>6}",
        "application", "score", "category", "decision", "conf"
    );
    for outcome in &outcomes {
        match outcome {
            Ok(record) => {
                let result = &record.result;
                *tally.entry(result.recommendation.label()).or_default() += 1;
                println!(
                    "{:<16} {:>6.1} {:<9} {:<8} {:>5.0}%",
                    result.application_id.0,
                    result.risk_score,
                    result.risk_category.label(),
                    result.recommendation.label(),
                    result.confidence
                );
            }
            Err(err) => {
                *tally.entry("FAILED").or_default() += 1;
                println!("{:<16} {}", "-", err);
            }
        }
    }

    let totals: Vec<String> = tally
        .iter()
        .map(|(label, count)| format!("{label} {count}"))
        .collect();
    println!("\n{} applicants: {}", outcomes.len(), totals.join(" | "));
    Ok(())
}

pub(crate) fn run_config_validate(path: &Path) -> Result<(), AppError> {
    let configuration = load_configuration_file(path)?;
    println!(
        "Configuration {} is valid ({})",
        configuration.version(),
        path.display()
    );
    render_weights(&configuration);
    Ok(())
}

pub(crate) fn run_config_show(
    config_path: Option<&Path>,
    app_config: &AppConfig,
) -> Result<(), AppError> {
    let configuration = resolve_configuration(config_path, &app_config.risk)?;
    print_json(&configuration)
}

fn render_weights(configuration: &RiskConfiguration) {
    for kind in FactorKind::ALL {
        println!("  - {:<22} {:>5.1}%", kind.label(), configuration.weight(kind));
    }
    let thresholds = configuration.thresholds();
    println!(
        "  Bands: MEDIUM from {}, HIGH from {}, CRITICAL from {}",
        thresholds.low_risk, thresholds.medium_risk, thresholds.high_risk
    );
    println!(
        "  Auto-approve at or below {}, auto-reject at or above {}, review below {}% confidence",
        configuration.auto_approve_threshold(),
        configuration.auto_reject_threshold(),
        configuration.review_confidence_floor()
    );
}
