//! The six independent risk dimensions.
//!
//! Every assessor is a pure function of the applicant snapshot and the configuration. Scores
//! run from 0 to 100 where higher means riskier; the explanation and data points recorded here
//! are the only source later stages read from.

mod collateral;
mod credit;
mod debt;
mod employment;
mod income;
mod market;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::configuration::RiskConfiguration;
use super::domain::{ApplicantSnapshot, IncompleteInputError};

pub use collateral::{CollateralAssessor, UNSECURED_COLLATERAL_SCORE};
pub use credit::CreditHistoryAssessor;
pub use debt::DebtToIncomeAssessor;
pub use employment::EmploymentAssessor;
pub use income::IncomeStabilityAssessor;
pub use market::{MarketConditionsAssessor, NEUTRAL_MARKET_SCORE};

pub(crate) use collateral::{collateral_floor, ltv_score};
pub(crate) use credit::credit_risk;
pub(crate) use debt::dti_score;

/// Marker embedded in explanations when a factor is in its worst bands.
pub const HIGH_RISK_FLAG: &str = "HIGH RISK";
/// Marker embedded in explanations for specific adverse conditions.
pub const CONCERN_FLAG: &str = "CONCERN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    CreditHistory,
    IncomeStability,
    Employment,
    Collateral,
    MarketConditions,
    DebtToIncomeRatio,
}

impl FactorKind {
    pub const ALL: [FactorKind; 6] = [
        FactorKind::CreditHistory,
        FactorKind::IncomeStability,
        FactorKind::Employment,
        FactorKind::Collateral,
        FactorKind::MarketConditions,
        FactorKind::DebtToIncomeRatio,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            FactorKind::CreditHistory => "credit_history",
            FactorKind::IncomeStability => "income_stability",
            FactorKind::Employment => "employment",
            FactorKind::Collateral => "collateral",
            FactorKind::MarketConditions => "market_conditions",
            FactorKind::DebtToIncomeRatio => "debt_to_income_ratio",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FactorKind::CreditHistory => "Credit history",
            FactorKind::IncomeStability => "Income stability",
            FactorKind::Employment => "Employment",
            FactorKind::Collateral => "Collateral",
            FactorKind::MarketConditions => "Market conditions",
            FactorKind::DebtToIncomeRatio => "Debt-to-income ratio",
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Output of a single factor assessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
    pub explanation: String,
    pub data_points: Vec<String>,
    pub confidence: f64,
}

impl FactorScore {
    /// Clamp the sub-score and confidence into [0, 100] and bake in the weight.
    pub fn weighted(
        score: f64,
        weight: f64,
        explanation: String,
        data_points: Vec<String>,
        confidence: f64,
    ) -> Self {
        let score = clamp_score(score);
        Self {
            score,
            weight,
            contribution: score * weight / 100.0,
            explanation,
            data_points,
            confidence: clamp_score(confidence),
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.explanation.contains(HIGH_RISK_FLAG) || self.explanation.contains(CONCERN_FLAG)
    }
}

/// Inputs every assessor sees besides the snapshot itself.
#[derive(Debug, Clone, Copy)]
pub struct AssessmentContext<'a> {
    pub config: &'a RiskConfiguration,
    pub as_of: NaiveDate,
}

/// Shared shape of the six factor assessors.
pub trait FactorAssessor: Send + Sync {
    fn kind(&self) -> FactorKind;

    fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<FactorScore, IncompleteInputError>;
}

/// The six assessors in the order the aggregator iterates them.
pub fn standard_assessors() -> Vec<Box<dyn FactorAssessor>> {
    vec![
        Box::new(CreditHistoryAssessor),
        Box::new(IncomeStabilityAssessor),
        Box::new(EmploymentAssessor),
        Box::new(CollateralAssessor),
        Box::new(MarketConditionsAssessor),
        Box::new(DebtToIncomeAssessor),
    ]
}

pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 100.0;
    }
    value.clamp(0.0, 100.0)
}

pub(crate) fn flagged(flag: &str, detail: String) -> String {
    format!("{flag}: {detail}")
}
