use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for loan applications submitted for assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Plain snapshot of the applicant and loan terms, assembled by the caller before assessment.
///
/// Monetary values are in the loan currency. `debt_to_income_ratio` is a fraction (`0.30` for
/// 30%). `market_condition_score` uses the engine's polarity: higher means a more adverse market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantSnapshot {
    pub application_id: ApplicationId,
    pub credit: CreditProfile,
    pub income: IncomeProfile,
    pub employment: EmploymentProfile,
    pub loan: LoanTerms,
    pub debt_to_income_ratio: Option<f64>,
    #[serde(default)]
    pub market_condition_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub credit_score: Option<u16>,
    #[serde(default)]
    pub credit_score_date: Option<NaiveDate>,
    pub prior_defaults: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeProfile {
    #[serde(default)]
    pub annual_income: Option<f64>,
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub other_income: f64,
    pub monthly_expenses: Option<f64>,
    #[serde(default)]
    pub net_worth: Option<f64>,
}

impl IncomeProfile {
    /// Declared annual income, falling back to twelve months of regular income.
    pub fn effective_annual_income(&self) -> Option<f64> {
        self.annual_income
            .or_else(|| self.monthly_income.map(|monthly| monthly * 12.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentProfile {
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub years_employed: f64,
    #[serde(default)]
    pub years_in_industry: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_amount: f64,
    #[serde(default)]
    pub collateral_value: Option<f64>,
    #[serde(default)]
    pub collateral_type: Option<CollateralType>,
}

impl LoanTerms {
    /// Collateral value when the loan is secured by something worth more than zero.
    pub fn secured_value(&self) -> Option<f64> {
        self.collateral_value
            .filter(|value| value.is_finite() && *value > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    SelfEmployed,
    Retired,
    Unemployed,
}

impl EmploymentType {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "FULL_TIME",
            EmploymentType::PartTime => "PART_TIME",
            EmploymentType::Contract => "CONTRACT",
            EmploymentType::SelfEmployed => "SELF_EMPLOYED",
            EmploymentType::Retired => "RETIRED",
            EmploymentType::Unemployed => "UNEMPLOYED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollateralType {
    RealEstate,
    Cash,
    Securities,
    Vehicle,
    Equipment,
    Inventory,
    Other,
}

impl CollateralType {
    pub const fn label(self) -> &'static str {
        match self {
            CollateralType::RealEstate => "REAL_ESTATE",
            CollateralType::Cash => "CASH",
            CollateralType::Securities => "SECURITIES",
            CollateralType::Vehicle => "VEHICLE",
            CollateralType::Equipment => "EQUIPMENT",
            CollateralType::Inventory => "INVENTORY",
            CollateralType::Other => "OTHER",
        }
    }
}

/// Raised by a factor assessor when a field it depends on is absent or unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IncompleteInputError {
    #[error("required applicant field `{field}` is missing")]
    Missing { field: &'static str },
    #[error("applicant field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl IncompleteInputError {
    pub fn field(&self) -> &'static str {
        match self {
            IncompleteInputError::Missing { field }
            | IncompleteInputError::Invalid { field, .. } => *field,
        }
    }
}

pub(crate) fn require<T: Copy>(
    value: Option<T>,
    field: &'static str,
) -> Result<T, IncompleteInputError> {
    value.ok_or(IncompleteInputError::Missing { field })
}

pub(crate) fn require_non_negative(
    value: f64,
    field: &'static str,
) -> Result<f64, IncompleteInputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(IncompleteInputError::Invalid {
            field,
            reason: format!("expected a non-negative number, found {value}"),
        })
    }
}
