use std::collections::BTreeMap;

use super::factors::{FactorKind, FactorScore};

const GENERIC_MITIGATIONS: [&str; 2] = [
    "Schedule quarterly monitoring of repayment performance",
    "Require a personal guarantee from the principal borrower",
];

/// Sub-score at or above which a factor is reported as a key risk indicator.
pub const fn indicator_trigger(kind: FactorKind) -> f64 {
    match kind {
        FactorKind::CreditHistory => 50.0,
        FactorKind::IncomeStability => 60.0,
        FactorKind::Employment => 50.0,
        FactorKind::Collateral => 60.0,
        FactorKind::MarketConditions => 70.0,
        FactorKind::DebtToIncomeRatio => 60.0,
    }
}

fn mitigations_for(kind: FactorKind) -> &'static [&'static str] {
    match kind {
        FactorKind::CreditHistory => &[
            "Require a co-signer with established credit",
            "Obtain an updated credit report before funding",
        ],
        FactorKind::IncomeStability => &[
            "Verify income with two years of tax returns",
            "Require cash reserves covering six months of payments",
        ],
        FactorKind::Employment => &["Obtain employment verification and business financials"],
        FactorKind::Collateral => &[
            "Request additional collateral or a co-signer",
            "Order an independent appraisal of the pledged collateral",
        ],
        FactorKind::MarketConditions => {
            &["Shorten the loan term to limit exposure to market volatility"]
        }
        FactorKind::DebtToIncomeRatio => {
            &["Recommend debt consolidation or a reduced loan amount"]
        }
    }
}

/// Factors whose score crossed their trigger or whose explanation carries a risk flag.
pub fn triggered_factors(
    factor_scores: &BTreeMap<FactorKind, FactorScore>,
) -> Vec<FactorKind> {
    factor_scores
        .iter()
        .filter(|(kind, factor)| factor.score >= indicator_trigger(**kind) || factor.is_flagged())
        .map(|(kind, _)| *kind)
        .collect()
}

/// Key risk indicators, one per triggered factor, in factor order.
pub fn key_risk_indicators(
    factor_scores: &BTreeMap<FactorKind, FactorScore>,
) -> Vec<String> {
    triggered_factors(factor_scores)
        .into_iter()
        .filter_map(|kind| {
            factor_scores.get(&kind).map(|factor| {
                format!(
                    "{} (score {:.0}): {}",
                    kind.label(),
                    factor.score,
                    factor.explanation
                )
            })
        })
        .collect()
}

/// Rule-based mitigations for each triggered factor followed by the generic safeguards.
/// Empty when nothing triggered.
pub fn mitigation_suggestions(
    factor_scores: &BTreeMap<FactorKind, FactorScore>,
) -> Vec<String> {
    let triggered = triggered_factors(factor_scores);
    if triggered.is_empty() {
        return Vec::new();
    }

    let mut suggestions: Vec<String> = Vec::new();
    for kind in triggered {
        for suggestion in mitigations_for(kind) {
            if !suggestions.iter().any(|existing| existing == suggestion) {
                suggestions.push((*suggestion).to_string());
            }
        }
    }
    suggestions.extend(GENERIC_MITIGATIONS.iter().map(|s| (*s).to_string()));
    suggestions
}
