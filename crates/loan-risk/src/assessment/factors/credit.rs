use super::{
    flagged, AssessmentContext, FactorAssessor, FactorKind, FactorScore, CONCERN_FLAG,
    HIGH_RISK_FLAG,
};
use crate::assessment::domain::{require, ApplicantSnapshot, IncompleteInputError};

const MIN_CREDIT_SCORE: f64 = 300.0;
const MAX_CREDIT_SCORE: f64 = 850.0;
/// Share of the remaining headroom below 100 kept after each prior default.
const PRIOR_DEFAULT_RETENTION: f64 = 0.85;
const UNKNOWN_REPORT_DATE_CONFIDENCE: f64 = 60.0;

/// Credit score normalized over 300–850, pushed toward 100 by each prior default.
///
/// Every default removes 15% of the headroom left below 100, so defaults alone never push the
/// score to the ceiling and a better credit score always lowers it.
///
/// Confidence is derived from how old the credit report is, not from the score itself.
pub struct CreditHistoryAssessor;

impl FactorAssessor for CreditHistoryAssessor {
    fn kind(&self) -> FactorKind {
        FactorKind::CreditHistory
    }

    fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<FactorScore, IncompleteInputError> {
        let credit = &snapshot.credit;
        let credit_score = require(credit.credit_score, "credit_score")?;
        if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&f64::from(credit_score)) {
            return Err(IncompleteInputError::Invalid {
                field: "credit_score",
                reason: format!("expected a score between 300 and 850, found {credit_score}"),
            });
        }
        let defaults = require(credit.prior_defaults, "prior_defaults")?;

        let score = credit_risk(f64::from(credit_score), defaults);

        let detail = format!("credit score {credit_score} with {defaults} prior default(s)");
        let explanation = if score >= 70.0 {
            flagged(HIGH_RISK_FLAG, detail)
        } else if defaults > 0 {
            flagged(CONCERN_FLAG, detail)
        } else {
            format!("Healthy {detail}")
        };

        let mut data_points = vec![
            format!("credit_score={credit_score}"),
            format!("prior_defaults={defaults}"),
        ];

        let confidence = match credit.credit_score_date {
            Some(reported_on) => {
                let age_days = (context.as_of - reported_on).num_days().max(0);
                data_points.push(format!("credit_score_date={reported_on}"));
                data_points.push(format!("credit_report_age_days={age_days}"));
                report_age_confidence(age_days)
            }
            None => UNKNOWN_REPORT_DATE_CONFIDENCE,
        };

        Ok(FactorScore::weighted(
            score,
            context.config.weight(self.kind()),
            explanation,
            data_points,
            confidence,
        ))
    }
}

/// Credit-history risk for a score and a count of prior defaults.
pub(crate) fn credit_risk(credit_score: f64, prior_defaults: u32) -> f64 {
    let exponent = i32::try_from(prior_defaults).unwrap_or(i32::MAX);
    100.0 - (100.0 - credit_score_risk(credit_score)) * PRIOR_DEFAULT_RETENTION.powi(exponent)
}

fn credit_score_risk(credit_score: f64) -> f64 {
    let normalized = ((credit_score - MIN_CREDIT_SCORE) / (MAX_CREDIT_SCORE - MIN_CREDIT_SCORE))
        .clamp(0.0, 1.0);
    (1.0 - normalized) * 100.0
}

fn report_age_confidence(age_days: i64) -> f64 {
    match age_days {
        0..=30 => 95.0,
        31..=90 => 85.0,
        91..=180 => 70.0,
        _ => 50.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_risk_spans_the_full_range() {
        assert_eq!(credit_score_risk(850.0), 0.0);
        assert_eq!(credit_score_risk(300.0), 100.0);
        assert_eq!(credit_score_risk(250.0), 100.0);
    }

    #[test]
    fn prior_defaults_raise_risk_without_saturating() {
        assert!((credit_risk(750.0, 0) - credit_score_risk(750.0)).abs() < 1e-9);
        assert!(credit_risk(750.0, 1) > credit_risk(750.0, 0));
        assert!(credit_risk(500.0, 3) < 100.0);
        assert!(credit_risk(500.0, 3) < credit_risk(400.0, 3));
        assert!(credit_risk(400.0, 12) < credit_risk(399.0, 12));
        assert_eq!(credit_risk(300.0, 2), 100.0);
    }

    #[test]
    fn report_age_lowers_confidence() {
        assert!(report_age_confidence(10) > report_age_confidence(60));
        assert!(report_age_confidence(60) > report_age_confidence(120));
        assert!(report_age_confidence(120) > report_age_confidence(400));
    }
}
