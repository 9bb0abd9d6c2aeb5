use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use loan_risk::assessment::{ApplicantSnapshot, AssessmentResult, RiskConfiguration};
use loan_risk::config::{load_configuration_file, RiskSettings};
use loan_risk::error::AppError;
use loan_risk::origination::{
    AssessmentRecord, ConfigurationRegistry, InMemoryAssessmentRepository,
    InMemoryAuditPublisher, RiskAssessmentService,
};

pub(crate) type CliService =
    RiskAssessmentService<InMemoryAssessmentRepository, InMemoryAuditPublisher>;

/// `--config` wins over `RISK_CONFIG_PATH`, which wins over the standard configuration.
pub(crate) fn resolve_configuration(
    override_path: Option<&Path>,
    settings: &RiskSettings,
) -> Result<RiskConfiguration, AppError> {
    let configuration = match override_path {
        Some(path) => load_configuration_file(path)?,
        None => settings.load_configuration()?,
    };
    Ok(configuration)
}

pub(crate) fn build_service(
    configuration: RiskConfiguration,
) -> (Arc<CliService>, Arc<InMemoryAuditPublisher>) {
    let audit = Arc::new(InMemoryAuditPublisher::new());
    let service = RiskAssessmentService::new(
        Arc::new(ConfigurationRegistry::with_active(configuration)),
        Arc::new(InMemoryAssessmentRepository::new()),
        Arc::clone(&audit),
    );
    (Arc::new(service), audit)
}

pub(crate) fn read_applicant(path: &Path) -> Result<ApplicantSnapshot, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Assessment timestamp: midnight UTC of the given date, or now.
pub(crate) fn assessment_time(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(Utc::now)
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn render_record(record: &AssessmentRecord) {
    println!(
        "\nAssessment {} for application {}",
        record.assessment_id, record.result.application_id.0
    );
    render_result(&record.result);
}

pub(crate) fn render_result(result: &AssessmentResult) {
    println!("- {}", result.summary());
    println!(
        "- Risk score {:.1} | confidence {:.0}% | configuration {}",
        result.risk_score, result.confidence, result.config_version
    );
    if result.human_review_required {
        println!("- Human review required");
    }

    println!("Factor breakdown:");
    for (kind, factor) in &result.factor_scores {
        println!(
            "  - {:<22} score {:>5.1} x {:>4.1}% = {:>5.2} (confidence {:.0}%)",
            kind.label(),
            factor.score,
            factor.weight,
            factor.contribution,
            factor.confidence
        );
        println!("      {}", factor.explanation);
    }

    if !result.key_risk_indicators.is_empty() {
        println!("Key risk indicators:");
        for indicator in &result.key_risk_indicators {
            println!("  - {indicator}");
        }
    }

    if !result.mitigation_suggestions.is_empty() {
        println!("Mitigation suggestions:");
        for suggestion in &result.mitigation_suggestions {
            println!("  - {suggestion}");
        }
    }

    println!("Alternative scenarios:");
    for scenario in &result.explainability.alternative_scenarios {
        println!(
            "  - {} ({:+.1} points, projected {:.1})",
            scenario.description, scenario.expected_score_delta, scenario.projected_risk_score
        );
    }

    println!("Decision path:");
    for (index, step) in result.explainability.decision_path.iter().enumerate() {
        println!("  {}. {}", index + 1, step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2025-06-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"))
        );
        assert!(parse_date("06/01/2025").is_err());
    }

    #[test]
    fn assessment_time_pins_to_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let at = assessment_time(Some(date));
        assert_eq!(at.date_naive(), date);
        assert_eq!(at.timestamp() % 86_400, 0);
    }
}
