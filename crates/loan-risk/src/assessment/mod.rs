//! Deterministic, rule-based risk assessment for loan applications.
//!
//! Polarity: every score in this module runs from 0 to 100 and a higher score always means a
//! riskier application. The categorizer, recommender, and explanation all read it that way.

pub mod configuration;
mod confidence;
pub mod domain;
mod explain;
pub mod factors;
mod indicators;
mod policy;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use configuration::{
    ConfigVersion, ConfigurationDraft, ConfigurationError, FactorWeights, RiskConfiguration,
    RiskThresholds, WEIGHT_SUM_TOLERANCE,
};
pub use confidence::estimate_confidence;
pub use domain::{
    ApplicantSnapshot, ApplicationId, CollateralType, CreditProfile, EmploymentProfile,
    EmploymentType, IncomeProfile, IncompleteInputError, LoanTerms,
};
pub use explain::{AlternativeScenario, Explainability, ScenarioKind};
pub use factors::{
    standard_assessors, AssessmentContext, FactorAssessor, FactorKind, FactorScore,
    UNSECURED_COLLATERAL_SCORE,
};
pub use indicators::{indicator_trigger, key_risk_indicators, mitigation_suggestions};
pub use policy::{categorize, recommend, Recommendation, RiskCategory};

use explain::DecisionSummary;

/// Raised when no active configuration can be resolved for an assessment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no active risk configuration is available")]
pub struct MissingConfigurationError;

/// Any failure that aborts an assessment. No partial score is ever produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("{factor} assessment failed: {source}")]
    IncompleteInput {
        factor: FactorKind,
        #[source]
        source: IncompleteInputError,
    },
    #[error(transparent)]
    MissingConfiguration(#[from] MissingConfigurationError),
}

/// Self-contained, immutable output of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub application_id: ApplicationId,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub human_review_required: bool,
    pub factor_scores: BTreeMap<FactorKind, FactorScore>,
    pub key_risk_indicators: Vec<String>,
    pub mitigation_suggestions: Vec<String>,
    pub explainability: Explainability,
    pub config_version: ConfigVersion,
    pub assessed_at: DateTime<Utc>,
}

impl AssessmentResult {
    pub fn summary(&self) -> String {
        format!(
            "{} risk, {}",
            self.risk_category.label(),
            self.recommendation.summary(self.risk_score)
        )
    }
}

/// Stateless engine running the factor assessors and the downstream stages.
pub struct RiskAssessmentEngine {
    assessors: Vec<Box<dyn FactorAssessor>>,
}

impl Default for RiskAssessmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskAssessmentEngine {
    pub fn new() -> Self {
        Self {
            assessors: standard_assessors(),
        }
    }

    /// Assess one application against a fully resolved configuration.
    ///
    /// `assessed_at` is supplied by the caller; identical inputs produce identical results.
    pub fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        config: &RiskConfiguration,
        assessed_at: DateTime<Utc>,
    ) -> Result<AssessmentResult, AssessmentError> {
        config.validate()?;

        let context = AssessmentContext {
            config,
            as_of: assessed_at.date_naive(),
        };
        let factor_scores = self.score_factors(snapshot, &context)?;

        let risk_score = aggregate(&factor_scores);
        let risk_category = categorize(risk_score, config);
        let recommendation = recommend(risk_score, config);
        let confidence = estimate_confidence(snapshot, &factor_scores);
        let key_risk_indicators = key_risk_indicators(&factor_scores);
        let mitigation_suggestions = mitigation_suggestions(&factor_scores);
        let human_review_required = recommendation == Recommendation::Review
            || confidence < config.review_confidence_floor()
            || !key_risk_indicators.is_empty();

        let explainability = explain::explain(
            snapshot,
            &factor_scores,
            &DecisionSummary {
                config,
                risk_score,
                category: risk_category,
                recommendation,
                confidence,
                indicator_count: key_risk_indicators.len(),
            },
        );

        info!(
            application_id = %snapshot.application_id.0,
            config_version = %config.version(),
            risk_score,
            category = risk_category.label(),
            recommendation = recommendation.label(),
            confidence,
            "risk assessment completed"
        );

        Ok(AssessmentResult {
            application_id: snapshot.application_id.clone(),
            risk_score,
            risk_category,
            recommendation,
            confidence,
            human_review_required,
            factor_scores,
            key_risk_indicators,
            mitigation_suggestions,
            explainability,
            config_version: config.version().clone(),
            assessed_at,
        })
    }

    fn score_factors(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<BTreeMap<FactorKind, FactorScore>, AssessmentError> {
        let mut factor_scores = BTreeMap::new();
        for assessor in &self.assessors {
            let factor = assessor.kind();
            let score = assessor.assess(snapshot, context).map_err(|source| {
                warn!(
                    application_id = %snapshot.application_id.0,
                    %factor,
                    field = source.field(),
                    "factor assessment aborted"
                );
                AssessmentError::IncompleteInput { factor, source }
            })?;
            debug!(
                %factor,
                score = score.score,
                contribution = score.contribution,
                "factor scored"
            );
            factor_scores.insert(factor, score);
        }
        Ok(factor_scores)
    }
}

/// Sum of the weighted contributions, held to [0, 100] against the weight tolerance.
pub fn aggregate(factor_scores: &BTreeMap<FactorKind, FactorScore>) -> f64 {
    let total: f64 = factor_scores
        .values()
        .map(|factor| factor.contribution)
        .sum();
    factors::clamp_score(total)
}
