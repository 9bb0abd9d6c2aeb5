//! Additive explanation of an assessment plus "what-if" scenarios.
//!
//! Scenario deltas are heuristic estimates built from the shape of each factor's scoring
//! curve; they are not a re-run of the pipeline. They never point the opposite way from a
//! re-run and stay close to it in magnitude, but are not guaranteed to match it exactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::configuration::RiskConfiguration;
use super::domain::ApplicantSnapshot;
use super::factors::{
    clamp_score, collateral_floor, credit_risk, dti_score, FactorKind, FactorScore,
};
use super::policy::{RiskCategory, Recommendation};

const COLLATERAL_INCREASE: f64 = 1.25;
const LOAN_REDUCTION: f64 = 0.8;
const DTI_AFTER_LOAN_REDUCTION: f64 = 0.9;
const CREDIT_SCORE_IMPROVEMENT: u16 = 50;
const MAX_CREDIT_SCORE: u16 = 850;

/// Average collateral score change per unit of LTV across the banded region.
const LTV_SLOPE: f64 = 140.0;
const LTV_SLOPE_START: f64 = 0.5;
const LTV_SLOPE_END: f64 = 1.05;
/// Expected collateral score once an unsecured loan is backed at 125% of its amount (LTV 0.8).
const PLEDGED_COLLATERAL_ESTIMATE: f64 = 35.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explainability {
    pub contributions: BTreeMap<FactorKind, f64>,
    pub decision_path: Vec<String>,
    pub alternative_scenarios: Vec<AlternativeScenario>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    ImprovedCollateral,
    ReducedLoanAmount,
    ImprovedCreditScore,
}

/// One hypothesized input change and its estimated effect. Deltas are never positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeScenario {
    pub kind: ScenarioKind,
    pub description: String,
    pub factor_deltas: BTreeMap<FactorKind, f64>,
    pub expected_score_delta: f64,
    pub projected_risk_score: f64,
}

/// Outcome fields the narrative describes.
pub(crate) struct DecisionSummary<'a> {
    pub config: &'a RiskConfiguration,
    pub risk_score: f64,
    pub category: RiskCategory,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub indicator_count: usize,
}

pub(crate) fn explain(
    snapshot: &ApplicantSnapshot,
    factor_scores: &BTreeMap<FactorKind, FactorScore>,
    summary: &DecisionSummary<'_>,
) -> Explainability {
    Explainability {
        contributions: factor_scores
            .iter()
            .map(|(kind, factor)| (*kind, factor.contribution))
            .collect(),
        decision_path: decision_path(factor_scores, summary),
        alternative_scenarios: alternative_scenarios(snapshot, factor_scores, summary.risk_score),
    }
}

fn decision_path(
    factor_scores: &BTreeMap<FactorKind, FactorScore>,
    summary: &DecisionSummary<'_>,
) -> Vec<String> {
    let thresholds = summary.config.thresholds();
    let factors: Vec<&str> = factor_scores.keys().map(|kind| kind.key()).collect();
    vec![
        format!("Validated configuration {}", summary.config.version()),
        format!("Assessed {} factors: {}", factors.len(), factors.join(", ")),
        format!(
            "Aggregated weighted contributions into risk score {:.2}",
            summary.risk_score
        ),
        format!(
            "Categorized as {} against thresholds {}/{}/{}",
            summary.category.label(),
            thresholds.low_risk,
            thresholds.medium_risk,
            thresholds.high_risk
        ),
        format!(
            "Recommended {} against cutoffs approve <= {}, reject >= {}",
            summary.recommendation.label(),
            summary.config.auto_approve_threshold(),
            summary.config.auto_reject_threshold()
        ),
        format!("Estimated confidence {:.0}", summary.confidence),
        format!("Flagged {} key risk indicator(s)", summary.indicator_count),
    ]
}

fn alternative_scenarios(
    snapshot: &ApplicantSnapshot,
    factor_scores: &BTreeMap<FactorKind, FactorScore>,
    risk_score: f64,
) -> Vec<AlternativeScenario> {
    let mut scenarios = Vec::with_capacity(3);

    if let Some(collateral) = factor_scores.get(&FactorKind::Collateral) {
        let (description, delta) = match current_ltv(snapshot) {
            Some(ltv) => (
                "Increase pledged collateral value by 25%".to_string(),
                ltv_delta(snapshot, collateral, ltv, ltv / COLLATERAL_INCREASE),
            ),
            None => (
                "Pledge collateral worth 125% of the loan amount".to_string(),
                (PLEDGED_COLLATERAL_ESTIMATE - collateral.score).min(0.0),
            ),
        };
        scenarios.push(scenario(
            ScenarioKind::ImprovedCollateral,
            description,
            vec![(FactorKind::Collateral, collateral)],
            vec![delta],
            risk_score,
        ));
    }

    let mut loan_factors = Vec::new();
    let mut loan_deltas = Vec::new();
    if let (Some(collateral), Some(ltv)) = (
        factor_scores.get(&FactorKind::Collateral),
        current_ltv(snapshot),
    ) {
        loan_factors.push((FactorKind::Collateral, collateral));
        loan_deltas.push(ltv_delta(snapshot, collateral, ltv, ltv * LOAN_REDUCTION));
    }
    if let (Some(dti), Some(ratio)) = (
        factor_scores.get(&FactorKind::DebtToIncomeRatio),
        snapshot.debt_to_income_ratio,
    ) {
        let percent = ratio * 100.0;
        let reduced = percent * DTI_AFTER_LOAN_REDUCTION;
        loan_factors.push((FactorKind::DebtToIncomeRatio, dti));
        loan_deltas.push((dti_slope(percent) * (reduced - percent)).min(0.0));
    }
    if !loan_factors.is_empty() {
        scenarios.push(scenario(
            ScenarioKind::ReducedLoanAmount,
            "Reduce the requested loan amount by 20%".to_string(),
            loan_factors,
            loan_deltas,
            risk_score,
        ));
    }

    if let (Some(credit), Some(credit_score), Some(defaults)) = (
        factor_scores.get(&FactorKind::CreditHistory),
        snapshot.credit.credit_score,
        snapshot.credit.prior_defaults,
    ) {
        let improved = credit_score
            .saturating_add(CREDIT_SCORE_IMPROVEMENT)
            .min(MAX_CREDIT_SCORE);
        let delta = credit_risk(f64::from(improved), defaults) - credit.score;
        scenarios.push(scenario(
            ScenarioKind::ImprovedCreditScore,
            format!("Improve the credit score from {credit_score} to {improved}"),
            vec![(FactorKind::CreditHistory, credit)],
            vec![delta],
            risk_score,
        ));
    }

    scenarios
}

fn scenario(
    kind: ScenarioKind,
    description: String,
    factors: Vec<(FactorKind, &FactorScore)>,
    deltas: Vec<f64>,
    risk_score: f64,
) -> AlternativeScenario {
    let mut factor_deltas = BTreeMap::new();
    let mut expected_score_delta = 0.0;
    for ((factor_kind, factor), delta) in factors.into_iter().zip(deltas) {
        let delta = delta.min(0.0);
        factor_deltas.insert(factor_kind, delta);
        expected_score_delta += delta * factor.weight / 100.0;
    }

    AlternativeScenario {
        kind,
        description,
        factor_deltas,
        expected_score_delta,
        projected_risk_score: clamp_score(risk_score + expected_score_delta),
    }
}

fn current_ltv(snapshot: &ApplicantSnapshot) -> Option<f64> {
    let loan = &snapshot.loan;
    loan.secured_value()
        .filter(|_| loan.loan_amount.is_finite() && loan.loan_amount > 0.0)
        .map(|value| loan.loan_amount / value)
}

/// Linear approximation of the LTV bands, never past the best score for the collateral type.
fn ltv_delta(snapshot: &ApplicantSnapshot, collateral: &FactorScore, from: f64, to: f64) -> f64 {
    let window = |ltv: f64| ltv.clamp(LTV_SLOPE_START, LTV_SLOPE_END);
    let estimate = LTV_SLOPE * (window(to) - window(from));
    let headroom = collateral.score - collateral_floor(snapshot.loan.collateral_type);
    estimate.max(-headroom.max(0.0)).min(0.0)
}

/// Local slope of the DTI curve at `percent`.
fn dti_slope(percent: f64) -> f64 {
    const STEP: f64 = 0.5;
    let lower = (percent - STEP).max(0.0);
    let upper = lower + STEP;
    (dti_score(upper) - dti_score(lower)) / STEP
}
