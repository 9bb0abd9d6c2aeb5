use std::collections::BTreeMap;

use proptest::prelude::*;

use super::common::*;
use crate::assessment::aggregate;
use crate::assessment::configuration::{
    ConfigVersion, ConfigurationDraft, FactorWeights, RiskConfiguration, WEIGHT_SUM_TOLERANCE,
};
use crate::assessment::factors::{
    CollateralAssessor, CreditHistoryAssessor, DebtToIncomeAssessor, FactorKind, FactorScore,
    UNSECURED_COLLATERAL_SCORE,
};

fn normalized_weights(raw: [f64; 6]) -> FactorWeights {
    let total: f64 = raw.iter().sum();
    let scaled: Vec<f64> = raw.iter().map(|value| value / total * 100.0).collect();
    FactorWeights {
        credit_history: scaled[0],
        income_stability: scaled[1],
        employment: scaled[2],
        collateral: scaled[3],
        market_conditions: scaled[4],
        debt_to_income_ratio: scaled[5],
    }
}

proptest! {
    #[test]
    fn any_weights_summing_to_100_validate_and_bound_the_aggregate(
        raw in prop::array::uniform6(0.1f64..100.0),
        scores in prop::array::uniform6(0.0f64..=100.0),
    ) {
        let weights = normalized_weights(raw);
        let mut draft: ConfigurationDraft = RiskConfiguration::standard().to_draft();
        draft.version = ConfigVersion("prop".to_string());
        draft.weights = weights;
        let config = RiskConfiguration::try_from(draft).expect("normalized weights validate");
        prop_assert!((config.weights().total() - 100.0).abs() <= WEIGHT_SUM_TOLERANCE);

        let factor_scores: BTreeMap<FactorKind, FactorScore> = FactorKind::ALL
            .iter()
            .zip(scores)
            .map(|(kind, score)| {
                (
                    *kind,
                    FactorScore::weighted(
                        score,
                        config.weight(*kind),
                        String::new(),
                        Vec::new(),
                        80.0,
                    ),
                )
            })
            .collect();

        let total = aggregate(&factor_scores);
        prop_assert!((0.0..=100.0).contains(&total));
    }

    #[test]
    fn higher_credit_score_strictly_lowers_credit_risk(
        low in 300u16..850,
        gap in 1u16..=550,
        defaults in 0u32..=6,
    ) {
        let high = low.saturating_add(gap).min(850);
        prop_assume!(high > low);

        let mut weaker = prime_applicant();
        weaker.credit.credit_score = Some(low);
        weaker.credit.prior_defaults = Some(defaults);
        let mut stronger = prime_applicant();
        stronger.credit.credit_score = Some(high);
        stronger.credit.prior_defaults = Some(defaults);

        let weaker = assess_factor(&CreditHistoryAssessor, &weaker);
        let stronger = assess_factor(&CreditHistoryAssessor, &stronger);
        prop_assert!(stronger.score < weaker.score);
    }

    #[test]
    fn higher_dti_strictly_raises_dti_risk(ratio in 0.0f64..0.79, step in 0.001f64..0.01) {
        let mut lower = prime_applicant();
        lower.debt_to_income_ratio = Some(ratio);
        let mut higher = prime_applicant();
        higher.debt_to_income_ratio = Some(ratio + step);

        let lower = assess_factor(&DebtToIncomeAssessor, &lower);
        let higher = assess_factor(&DebtToIncomeAssessor, &higher);
        prop_assert!(higher.score > lower.score);
    }

    #[test]
    fn more_collateral_never_raises_collateral_risk(
        value in 0.0f64..200_000.0,
        extra in 0.0f64..200_000.0,
    ) {
        let mut smaller = prime_applicant();
        smaller.loan.collateral_value = Some(value);
        let mut larger = prime_applicant();
        larger.loan.collateral_value = Some(value + extra);

        let smaller = assess_factor(&CollateralAssessor, &smaller);
        let larger = assess_factor(&CollateralAssessor, &larger);
        prop_assert!(larger.score <= smaller.score);
        prop_assert!(smaller.score <= UNSECURED_COLLATERAL_SCORE);
    }
}
