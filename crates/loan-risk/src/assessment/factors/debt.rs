use super::{
    clamp_score, flagged, AssessmentContext, FactorAssessor, FactorKind, FactorScore,
    CONCERN_FLAG, HIGH_RISK_FLAG,
};
use crate::assessment::domain::{
    require, require_non_negative, ApplicantSnapshot, IncompleteInputError,
};

/// Piecewise-linear DTI bands: (upper bound in percent, score at lower bound, score at upper
/// bound, label).
const DTI_BANDS: [(f64, f64, f64, &str); 4] = [
    (20.0, 5.0, 15.0, "excellent"),
    (35.0, 15.0, 30.0, "good"),
    (43.0, 30.0, 50.0, "acceptable"),
    (50.0, 50.0, 70.0, "high"),
];

pub struct DebtToIncomeAssessor;

impl FactorAssessor for DebtToIncomeAssessor {
    fn kind(&self) -> FactorKind {
        FactorKind::DebtToIncomeRatio
    }

    fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<FactorScore, IncompleteInputError> {
        let ratio = require_non_negative(
            require(snapshot.debt_to_income_ratio, "debt_to_income_ratio")?,
            "debt_to_income_ratio",
        )?;
        let percent = ratio * 100.0;
        let score = dti_score(percent);
        let band = dti_band(percent);

        let detail = format!("debt-to-income {percent:.1}% ({band})");
        let explanation = match band {
            "critical" => flagged(HIGH_RISK_FLAG, detail),
            "high" => flagged(CONCERN_FLAG, detail),
            _ => format!("Debt load {detail}"),
        };

        Ok(FactorScore::weighted(
            score,
            context.config.weight(self.kind()),
            explanation,
            vec![format!("debt_to_income_ratio={ratio:.3}")],
            90.0,
        ))
    }
}

/// Strictly increasing in `percent` until the score reaches 100.
pub(crate) fn dti_score(percent: f64) -> f64 {
    let mut lower = 0.0;
    for (upper, from, to, _) in DTI_BANDS {
        if percent <= upper {
            let position = (percent.max(0.0) - lower) / (upper - lower);
            return from + position * (to - from);
        }
        lower = upper;
    }
    clamp_score(70.0 + (percent - lower))
}

fn dti_band(percent: f64) -> &'static str {
    DTI_BANDS
        .iter()
        .find(|(upper, ..)| percent <= *upper)
        .map(|(.., label)| *label)
        .unwrap_or("critical")
}
