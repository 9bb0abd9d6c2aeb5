use super::{
    flagged, AssessmentContext, FactorAssessor, FactorKind, FactorScore, CONCERN_FLAG,
    HIGH_RISK_FLAG,
};
use crate::assessment::domain::{
    require, require_non_negative, ApplicantSnapshot, EmploymentType, IncompleteInputError,
};

/// Additive score from employment type, tenure in role, and tenure in industry.
pub struct EmploymentAssessor;

impl FactorAssessor for EmploymentAssessor {
    fn kind(&self) -> FactorKind {
        FactorKind::Employment
    }

    fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        context: &AssessmentContext<'_>,
    ) -> Result<FactorScore, IncompleteInputError> {
        let employment = &snapshot.employment;
        let employment_type = require(employment.employment_type, "employment_type")?;
        let years_employed = require_non_negative(employment.years_employed, "years_employed")?;
        let years_in_industry =
            require_non_negative(employment.years_in_industry, "years_in_industry")?;

        let score = type_risk(employment_type)
            + tenure_penalty(years_employed)
            + industry_penalty(years_in_industry);

        let detail = format!(
            "{} for {years_employed:.1} year(s), {years_in_industry:.1} year(s) in industry",
            employment_type.label()
        );
        let explanation = if score >= 70.0 {
            flagged(HIGH_RISK_FLAG, detail)
        } else if employment_type == EmploymentType::Unemployed || years_employed < 1.0 {
            flagged(CONCERN_FLAG, detail)
        } else {
            format!("Employment: {detail}")
        };

        let data_points = vec![
            format!("employment_type={}", employment_type.label()),
            format!("years_employed={years_employed:.1}"),
            format!("years_in_industry={years_in_industry:.1}"),
        ];

        let confidence = if years_employed == 0.0 && employment_type != EmploymentType::Unemployed
        {
            70.0
        } else {
            85.0
        };

        Ok(FactorScore::weighted(
            score,
            context.config.weight(self.kind()),
            explanation,
            data_points,
            confidence,
        ))
    }
}

fn type_risk(employment_type: EmploymentType) -> f64 {
    match employment_type {
        EmploymentType::FullTime => 10.0,
        EmploymentType::Retired => 25.0,
        EmploymentType::PartTime => 30.0,
        EmploymentType::Contract => 35.0,
        EmploymentType::SelfEmployed => 40.0,
        EmploymentType::Unemployed => 80.0,
    }
}

fn tenure_penalty(years_employed: f64) -> f64 {
    if years_employed < 1.0 {
        20.0
    } else if years_employed < 2.0 {
        15.0
    } else if years_employed < 5.0 {
        5.0
    } else {
        0.0
    }
}

fn industry_penalty(years_in_industry: f64) -> f64 {
    if years_in_industry < 2.0 {
        10.0
    } else if years_in_industry < 5.0 {
        5.0
    } else {
        0.0
    }
}
