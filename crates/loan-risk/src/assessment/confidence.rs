use std::collections::BTreeMap;

use super::domain::ApplicantSnapshot;
use super::factors::{clamp_score, FactorKind, FactorScore};

const COLLATERAL_DATA_BONUS: f64 = 5.0;

/// Weighted mean of factor confidences, nudged by data completeness and factor agreement.
pub fn estimate_confidence(
    snapshot: &ApplicantSnapshot,
    factor_scores: &BTreeMap<FactorKind, FactorScore>,
) -> f64 {
    if factor_scores.is_empty() {
        return 0.0;
    }

    let total_weight: f64 = factor_scores.values().map(|factor| factor.weight).sum();
    let base = if total_weight > 0.0 {
        factor_scores
            .values()
            .map(|factor| factor.confidence * factor.weight)
            .sum::<f64>()
            / total_weight
    } else {
        factor_scores
            .values()
            .map(|factor| factor.confidence)
            .sum::<f64>()
            / factor_scores.len() as f64
    };

    let completeness = if snapshot.loan.secured_value().is_some()
        && snapshot.loan.collateral_type.is_some()
    {
        COLLATERAL_DATA_BONUS
    } else {
        0.0
    };

    clamp_score(base + completeness + dispersion_adjustment(score_dispersion(factor_scores)))
}

/// Population standard deviation of the factor sub-scores.
pub(crate) fn score_dispersion(factor_scores: &BTreeMap<FactorKind, FactorScore>) -> f64 {
    let count = factor_scores.len() as f64;
    if count == 0.0 {
        return 0.0;
    }
    let mean = factor_scores.values().map(|factor| factor.score).sum::<f64>() / count;
    let variance = factor_scores
        .values()
        .map(|factor| (factor.score - mean).powi(2))
        .sum::<f64>()
        / count;
    variance.sqrt()
}

fn dispersion_adjustment(std_dev: f64) -> f64 {
    if std_dev < 10.0 {
        10.0
    } else if std_dev < 20.0 {
        5.0
    } else if std_dev < 30.0 {
        0.0
    } else {
        -10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(score: f64, confidence: f64) -> FactorScore {
        FactorScore::weighted(score, 100.0 / 6.0, String::new(), Vec::new(), confidence)
    }

    #[test]
    fn agreeing_factors_have_no_dispersion() {
        let scores: BTreeMap<_, _> = FactorKind::ALL
            .iter()
            .map(|kind| (*kind, factor(40.0, 80.0)))
            .collect();
        assert!(score_dispersion(&scores) < 1e-9);
    }

    #[test]
    fn conflicting_factors_lower_the_adjustment() {
        assert!(dispersion_adjustment(5.0) > dispersion_adjustment(15.0));
        assert!(dispersion_adjustment(15.0) > dispersion_adjustment(25.0));
        assert!(dispersion_adjustment(25.0) > dispersion_adjustment(45.0));
    }
}
