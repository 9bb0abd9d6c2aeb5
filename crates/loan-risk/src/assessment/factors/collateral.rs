use super::{
    clamp_score, flagged, AssessmentContext, FactorAssessor, FactorKind, FactorScore,
    CONCERN_FLAG, HIGH_RISK_FLAG,
};
use crate::assessment::domain::{
    require_non_negative, ApplicantSnapshot, CollateralType, IncompleteInputError,
};

/// Fixed sub-score for loans with no usable collateral. Never lower than any secured score.
pub const UNSECURED_COLLATERAL_SCORE: f64 = 90.0;

/// Loan-to-value bands with a secondary adjustment by collateral type.
pub struct CollateralAssessor;

impl FactorAssessor for CollateralAssessor {
    fn kind(&self) -> FactorKind {
        FactorKind::Collateral
    }

    fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<FactorScore, IncompleteInputError> {
        let loan = &snapshot.loan;
        if !loan.loan_amount.is_finite() || loan.loan_amount <= 0.0 {
            return Err(IncompleteInputError::Invalid {
                field: "loan_amount",
                reason: format!("expected a positive amount, found {}", loan.loan_amount),
            });
        }
        if let Some(value) = loan.collateral_value {
            require_non_negative(value, "collateral_value")?;
        }
        let weight = context.config.weight(self.kind());

        let Some(collateral_value) = loan.secured_value() else {
            return Ok(FactorScore::weighted(
                UNSECURED_COLLATERAL_SCORE,
                weight,
                flagged(
                    HIGH_RISK_FLAG,
                    "unsecured loan, no collateral pledged".to_string(),
                ),
                vec![
                    format!("loan_amount={:.2}", loan.loan_amount),
                    "collateral=none".to_string(),
                ],
                70.0,
            ));
        };

        let ltv = loan.loan_amount / collateral_value;
        let score = ltv_score(ltv, loan.collateral_type);

        let mut data_points = vec![
            format!("loan_amount={:.2}", loan.loan_amount),
            format!("collateral_value={collateral_value:.2}"),
            format!("loan_to_value={ltv:.3}"),
        ];
        if let Some(collateral_type) = loan.collateral_type {
            data_points.push(format!("collateral_type={}", collateral_type.label()));
        }

        let detail = format!("loan-to-value {:.0}%", ltv * 100.0);
        let explanation = if ltv > 1.0 {
            flagged(
                CONCERN_FLAG,
                format!("{detail}, collateral does not cover the loan"),
            )
        } else if score >= 70.0 {
            flagged(HIGH_RISK_FLAG, detail)
        } else {
            format!("Secured at {detail}")
        };

        let confidence = if loan.collateral_type.is_some() {
            85.0
        } else {
            75.0
        };

        Ok(FactorScore::weighted(
            score,
            weight,
            explanation,
            data_points,
            confidence,
        ))
    }
}

/// Secured collateral sub-score for a loan-to-value ratio.
pub(crate) fn ltv_score(ltv: f64, collateral_type: Option<CollateralType>) -> f64 {
    let band = if ltv <= 0.5 {
        10.0
    } else if ltv <= 0.7 {
        20.0
    } else if ltv <= 0.8 {
        35.0
    } else if ltv <= 0.9 {
        50.0
    } else if ltv <= 1.0 {
        65.0
    } else {
        80.0
    };
    clamp_score(band + collateral_type.map(type_adjustment).unwrap_or(0.0))
}

/// Best score reachable for this collateral type by adding value.
pub(crate) fn collateral_floor(collateral_type: Option<CollateralType>) -> f64 {
    ltv_score(0.0, collateral_type)
}

fn type_adjustment(collateral_type: CollateralType) -> f64 {
    match collateral_type {
        CollateralType::Cash => -10.0,
        CollateralType::RealEstate => -5.0,
        CollateralType::Securities | CollateralType::Other => 0.0,
        CollateralType::Vehicle | CollateralType::Equipment => 5.0,
        CollateralType::Inventory => 10.0,
    }
}
