use super::{
    clamp_score, flagged, AssessmentContext, FactorAssessor, FactorKind, FactorScore,
    HIGH_RISK_FLAG,
};
use crate::assessment::domain::{ApplicantSnapshot, IncompleteInputError};

/// Score used when no external market signal is supplied.
pub const NEUTRAL_MARKET_SCORE: f64 = 50.0;

/// Market forecasts are inherently uncertain, so this factor always reports a lower
/// confidence than the others: 50 with an external signal, 40 on the neutral default.
const PROVIDED_MARKET_CONFIDENCE: f64 = 50.0;
const DEFAULT_MARKET_CONFIDENCE: f64 = 40.0;

pub struct MarketConditionsAssessor;

impl FactorAssessor for MarketConditionsAssessor {
    fn kind(&self) -> FactorKind {
        FactorKind::MarketConditions
    }

    fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<FactorScore, IncompleteInputError> {
        let provided = match snapshot.market_condition_score {
            Some(value) if !value.is_finite() => {
                return Err(IncompleteInputError::Invalid {
                    field: "market_condition_score",
                    reason: format!("expected a finite score, found {value}"),
                })
            }
            other => other,
        };

        let (score, explanation, data_point, confidence) = match provided {
            Some(value) => {
                let score = clamp_score(value);
                let detail = format!("external market score {score:.0}");
                let explanation = if score >= 70.0 {
                    flagged(HIGH_RISK_FLAG, format!("adverse {detail}"))
                } else {
                    format!("Market outlook from {detail}")
                };
                (
                    score,
                    explanation,
                    format!("market_condition_score={score:.1}"),
                    PROVIDED_MARKET_CONFIDENCE,
                )
            }
            None => (
                NEUTRAL_MARKET_SCORE,
                "No market signal supplied, neutral outlook assumed".to_string(),
                "market_condition_score=default".to_string(),
                DEFAULT_MARKET_CONFIDENCE,
            ),
        };

        Ok(FactorScore::weighted(
            score,
            context.config.weight(self.kind()),
            explanation,
            vec![data_point],
            confidence,
        ))
    }
}
