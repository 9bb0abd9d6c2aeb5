use super::{flagged, AssessmentContext, FactorAssessor, FactorKind, FactorScore, HIGH_RISK_FLAG};
use crate::assessment::domain::{
    require, require_non_negative, ApplicantSnapshot, IncompleteInputError,
};

/// Disposable-income bands adjusted by absolute income and net worth.
pub struct IncomeStabilityAssessor;

impl FactorAssessor for IncomeStabilityAssessor {
    fn kind(&self) -> FactorKind {
        FactorKind::IncomeStability
    }

    fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<FactorScore, IncompleteInputError> {
        let income = &snapshot.income;
        let monthly_income = require(income.monthly_income, "monthly_income")?;
        if !monthly_income.is_finite() || monthly_income <= 0.0 {
            return Err(IncompleteInputError::Invalid {
                field: "monthly_income",
                reason: format!("expected a positive amount, found {monthly_income}"),
            });
        }
        let monthly_expenses = require_non_negative(
            require(income.monthly_expenses, "monthly_expenses")?,
            "monthly_expenses",
        )?;
        let other_income = require_non_negative(income.other_income, "other_income")?;
        if let Some(declared) = income.annual_income {
            require_non_negative(declared, "annual_income")?;
        }
        if let Some(net_worth) = income.net_worth.filter(|value| !value.is_finite()) {
            return Err(IncompleteInputError::Invalid {
                field: "net_worth",
                reason: format!("expected a finite amount, found {net_worth}"),
            });
        }

        let disposable_ratio = (monthly_income - monthly_expenses) / monthly_income;
        let mut score = disposable_ratio_score(disposable_ratio);
        let mut data_points = vec![
            format!("monthly_income={monthly_income:.2}"),
            format!("monthly_expenses={monthly_expenses:.2}"),
            format!("disposable_income_ratio={disposable_ratio:.3}"),
        ];

        let annual_income = income.effective_annual_income().unwrap_or(monthly_income * 12.0);
        data_points.push(format!("annual_income={annual_income:.2}"));
        if annual_income < 30_000.0 {
            score += 10.0;
        } else if annual_income > 150_000.0 {
            score -= 5.0;
        }

        if other_income > 0.0 {
            score -= 5.0;
            data_points.push(format!("other_income={other_income:.2}"));
        }

        if let Some(net_worth) = income.net_worth {
            data_points.push(format!("net_worth={net_worth:.2}"));
            score += net_worth_adjustment(net_worth);
        }

        let detail = format!(
            "{:.0}% of monthly income remains after expenses",
            disposable_ratio * 100.0
        );
        let explanation = if score >= 70.0 {
            flagged(HIGH_RISK_FLAG, detail)
        } else {
            format!("Disposable income: {detail}")
        };

        let mut confidence = 80.0;
        if income.annual_income.is_some() {
            confidence += 10.0;
        }
        if income.net_worth.is_some() {
            confidence += 5.0;
        }

        Ok(FactorScore::weighted(
            score,
            context.config.weight(self.kind()),
            explanation,
            data_points,
            confidence,
        ))
    }
}

fn disposable_ratio_score(ratio: f64) -> f64 {
    if ratio < 0.10 {
        85.0
    } else if ratio < 0.20 {
        70.0
    } else if ratio < 0.30 {
        50.0
    } else if ratio < 0.50 {
        30.0
    } else {
        15.0
    }
}

fn net_worth_adjustment(net_worth: f64) -> f64 {
    if net_worth < 0.0 {
        10.0
    } else if net_worth > 500_000.0 {
        -10.0
    } else if net_worth > 100_000.0 {
        -5.0
    } else {
        0.0
    }
}
