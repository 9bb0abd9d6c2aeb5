use std::fmt;

use serde::{Deserialize, Serialize};

use super::factors::FactorKind;

/// Tolerance applied when checking that the six weights add up to 100.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Identifier of an immutable configuration bundle, recorded on every assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigVersion(pub String);

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percentage weight of each factor. Must total 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub credit_history: f64,
    pub income_stability: f64,
    pub employment: f64,
    pub collateral: f64,
    pub market_conditions: f64,
    pub debt_to_income_ratio: f64,
}

impl FactorWeights {
    pub fn for_factor(&self, kind: FactorKind) -> f64 {
        match kind {
            FactorKind::CreditHistory => self.credit_history,
            FactorKind::IncomeStability => self.income_stability,
            FactorKind::Employment => self.employment,
            FactorKind::Collateral => self.collateral,
            FactorKind::MarketConditions => self.market_conditions,
            FactorKind::DebtToIncomeRatio => self.debt_to_income_ratio,
        }
    }

    pub fn total(&self) -> f64 {
        FactorKind::ALL
            .iter()
            .map(|kind| self.for_factor(*kind))
            .sum()
    }
}

/// Ascending cut points partitioning the score space into LOW/MEDIUM/HIGH/CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low_risk: f64,
    pub medium_risk: f64,
    pub high_risk: f64,
}

/// Unvalidated configuration as authored by an operator or read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDraft {
    pub version: ConfigVersion,
    pub weights: FactorWeights,
    pub thresholds: RiskThresholds,
    pub auto_approve_threshold: f64,
    pub auto_reject_threshold: f64,
    #[serde(default = "default_review_confidence_floor")]
    pub review_confidence_floor: f64,
}

fn default_review_confidence_floor() -> f64 {
    60.0
}

/// Validated, immutable configuration threaded through every assessor call.
///
/// The only way to obtain one is through [`RiskConfiguration::try_from`], including when it is
/// deserialized, so persisted data is re-validated on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigurationDraft", into = "ConfigurationDraft")]
pub struct RiskConfiguration {
    version: ConfigVersion,
    weights: FactorWeights,
    thresholds: RiskThresholds,
    auto_approve_threshold: f64,
    auto_reject_threshold: f64,
    review_confidence_floor: f64,
}

impl RiskConfiguration {
    /// Default bundle shipped with the engine.
    pub fn standard() -> Self {
        Self {
            version: ConfigVersion("2024.1".to_string()),
            weights: FactorWeights {
                credit_history: 30.0,
                income_stability: 25.0,
                employment: 15.0,
                collateral: 15.0,
                market_conditions: 5.0,
                debt_to_income_ratio: 10.0,
            },
            thresholds: RiskThresholds {
                low_risk: 30.0,
                medium_risk: 50.0,
                high_risk: 70.0,
            },
            auto_approve_threshold: 25.0,
            auto_reject_threshold: 75.0,
            review_confidence_floor: default_review_confidence_floor(),
        }
    }

    pub fn version(&self) -> &ConfigVersion {
        &self.version
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    pub fn weight(&self, kind: FactorKind) -> f64 {
        self.weights.for_factor(kind)
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn auto_approve_threshold(&self) -> f64 {
        self.auto_approve_threshold
    }

    pub fn auto_reject_threshold(&self) -> f64 {
        self.auto_reject_threshold
    }

    pub fn review_confidence_floor(&self) -> f64 {
        self.review_confidence_floor
    }

    /// Re-run every construction rule against this value.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_draft(&self.to_draft())
    }

    pub fn to_draft(&self) -> ConfigurationDraft {
        ConfigurationDraft {
            version: self.version.clone(),
            weights: self.weights,
            thresholds: self.thresholds,
            auto_approve_threshold: self.auto_approve_threshold,
            auto_reject_threshold: self.auto_reject_threshold,
            review_confidence_floor: self.review_confidence_floor,
        }
    }
}

impl Default for RiskConfiguration {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<ConfigurationDraft> for RiskConfiguration {
    type Error = ConfigurationError;

    fn try_from(draft: ConfigurationDraft) -> Result<Self, Self::Error> {
        validate_draft(&draft)?;
        Ok(Self {
            version: draft.version,
            weights: draft.weights,
            thresholds: draft.thresholds,
            auto_approve_threshold: draft.auto_approve_threshold,
            auto_reject_threshold: draft.auto_reject_threshold,
            review_confidence_floor: draft.review_confidence_floor,
        })
    }
}

impl From<RiskConfiguration> for ConfigurationDraft {
    fn from(config: RiskConfiguration) -> Self {
        config.to_draft()
    }
}

/// Reasons a configuration cannot be created, edited, activated, or loaded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("configuration version must not be empty")]
    EmptyVersion,
    #[error("weight for {factor} must be a finite, non-negative percentage (found {value})")]
    InvalidWeight { factor: FactorKind, value: f64 },
    #[error("factor weights must sum to 100 (found {total:.4})")]
    WeightSum { total: f64 },
    #[error("risk thresholds must be strictly ascending within (0, 100) (found {low}/{medium}/{high})")]
    ThresholdOrder { low: f64, medium: f64, high: f64 },
    #[error(
        "auto-approve cutoff must be below the auto-reject cutoff within [0, 100] (found approve {approve}, reject {reject})"
    )]
    RecommendationCutoffs { approve: f64, reject: f64 },
    #[error("review confidence floor must lie within [0, 100] (found {0})")]
    ConfidenceFloor(f64),
}

fn validate_draft(draft: &ConfigurationDraft) -> Result<(), ConfigurationError> {
    if draft.version.0.trim().is_empty() {
        return Err(ConfigurationError::EmptyVersion);
    }

    for kind in FactorKind::ALL {
        let value = draft.weights.for_factor(kind);
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigurationError::InvalidWeight {
                factor: kind,
                value,
            });
        }
    }

    let total = draft.weights.total();
    if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigurationError::WeightSum { total });
    }

    let RiskThresholds {
        low_risk: low,
        medium_risk: medium,
        high_risk: high,
    } = draft.thresholds;
    let ascending = [low, medium, high].iter().all(|value| value.is_finite())
        && 0.0 < low
        && low < medium
        && medium < high
        && high < 100.0;
    if !ascending {
        return Err(ConfigurationError::ThresholdOrder { low, medium, high });
    }

    let approve = draft.auto_approve_threshold;
    let reject = draft.auto_reject_threshold;
    let cutoffs_valid = approve.is_finite()
        && reject.is_finite()
        && (0.0..=100.0).contains(&approve)
        && (0.0..=100.0).contains(&reject)
        && approve < reject;
    if !cutoffs_valid {
        return Err(ConfigurationError::RecommendationCutoffs { approve, reject });
    }

    let floor = draft.review_confidence_floor;
    if !floor.is_finite() || !(0.0..=100.0).contains(&floor) {
        return Err(ConfigurationError::ConfidenceFloor(floor));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ConfigurationDraft {
        RiskConfiguration::standard().to_draft()
    }

    #[test]
    fn standard_configuration_is_valid() {
        let config = RiskConfiguration::standard();
        assert!(config.validate().is_ok());
        assert!((config.weights().total() - 100.0).abs() <= WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_100() {
        let mut draft = draft();
        draft.weights.market_conditions = 6.0;

        match RiskConfiguration::try_from(draft) {
            Err(ConfigurationError::WeightSum { total }) => assert!((total - 101.0).abs() < 1e-9),
            other => panic!("expected weight sum error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_weights_within_tolerance() {
        let mut draft = draft();
        draft.weights.market_conditions = 5.005;
        assert!(RiskConfiguration::try_from(draft).is_ok());
    }

    #[test]
    fn rejects_negative_weight() {
        let mut draft = draft();
        draft.weights.employment = -5.0;
        draft.weights.credit_history = 50.0;

        assert!(matches!(
            RiskConfiguration::try_from(draft),
            Err(ConfigurationError::InvalidWeight {
                factor: FactorKind::Employment,
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_ascending_thresholds() {
        let mut draft = draft();
        draft.thresholds.medium_risk = draft.thresholds.low_risk;

        assert!(matches!(
            RiskConfiguration::try_from(draft),
            Err(ConfigurationError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn rejects_inverted_recommendation_cutoffs() {
        let mut draft = draft();
        draft.auto_approve_threshold = 80.0;
        draft.auto_reject_threshold = 40.0;

        assert!(matches!(
            RiskConfiguration::try_from(draft),
            Err(ConfigurationError::RecommendationCutoffs { .. })
        ));
    }

    #[test]
    fn deserialization_runs_validation() {
        let mut draft = draft();
        draft.weights.collateral = 40.0;
        let json = serde_json::to_string(&draft).expect("draft serializes");

        let parsed: Result<RiskConfiguration, _> = serde_json::from_str(&json);
        let err = parsed.expect_err("invalid weights must not load");
        assert!(err.to_string().contains("sum to 100"));
    }

    #[test]
    fn serialized_configuration_round_trips() {
        let config = RiskConfiguration::standard();
        let json = serde_json::to_string(&config).expect("configuration serializes");
        let parsed: RiskConfiguration = serde_json::from_str(&json).expect("valid json loads");
        assert_eq!(parsed, config);
    }
}
