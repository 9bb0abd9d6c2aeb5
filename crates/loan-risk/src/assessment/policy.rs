use serde::{Deserialize, Serialize};

use super::configuration::RiskConfiguration;

/// Risk band derived from the aggregate score. Each cut point belongs to the riskier band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskCategory {
    pub const fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
            RiskCategory::Critical => "CRITICAL",
        }
    }
}

/// Automated recommendation handed to the origination workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Approve,
    Review,
    Reject,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::Approve => "APPROVE",
            Recommendation::Review => "REVIEW",
            Recommendation::Reject => "REJECT",
        }
    }

    pub fn summary(self, risk_score: f64) -> String {
        match self {
            Recommendation::Approve => {
                format!("auto-approve: risk score {risk_score:.1} within approval cutoff")
            }
            Recommendation::Review => {
                format!("manual review required: risk score {risk_score:.1} between cutoffs")
            }
            Recommendation::Reject => {
                format!("auto-reject: risk score {risk_score:.1} at or above rejection cutoff")
            }
        }
    }
}

/// `score < low` is LOW, `< medium` MEDIUM, `< high` HIGH, anything else CRITICAL.
pub fn categorize(risk_score: f64, config: &RiskConfiguration) -> RiskCategory {
    let thresholds = config.thresholds();
    if risk_score < thresholds.low_risk {
        RiskCategory::Low
    } else if risk_score < thresholds.medium_risk {
        RiskCategory::Medium
    } else if risk_score < thresholds.high_risk {
        RiskCategory::High
    } else {
        RiskCategory::Critical
    }
}

/// `score <= approve` is APPROVE, `score >= reject` is REJECT, everything else REVIEW.
pub fn recommend(risk_score: f64, config: &RiskConfiguration) -> Recommendation {
    let approve = risk_score <= config.auto_approve_threshold();
    let reject = risk_score >= config.auto_reject_threshold();
    match (approve, reject) {
        (true, false) => Recommendation::Approve,
        (false, true) => Recommendation::Reject,
        _ => Recommendation::Review,
    }
}
