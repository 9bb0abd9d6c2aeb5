use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::assessment::{CollateralType, EmploymentType};

/// One applicant row as it appears in the origination export.
#[derive(Debug, Deserialize)]
pub(crate) struct ApplicantRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) application_id: Option<String>,
    pub(crate) credit_score: Option<u16>,
    pub(crate) credit_score_date: Option<NaiveDate>,
    pub(crate) prior_defaults: Option<u32>,
    pub(crate) annual_income: Option<f64>,
    pub(crate) monthly_income: Option<f64>,
    pub(crate) other_income: Option<f64>,
    pub(crate) monthly_expenses: Option<f64>,
    pub(crate) net_worth: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) employment_type: Option<String>,
    pub(crate) years_employed: Option<f64>,
    pub(crate) years_in_industry: Option<f64>,
    pub(crate) loan_amount: Option<f64>,
    pub(crate) collateral_value: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) collateral_type: Option<String>,
    pub(crate) debt_to_income_ratio: Option<f64>,
    #[serde(default)]
    pub(crate) market_condition_score: Option<f64>,
}

/// Parsed rows paired with their 1-based line number in the file.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(u64, ApplicantRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let row: ApplicantRow = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }

    Ok(rows)
}

pub(crate) fn employment_type(label: &str) -> Option<EmploymentType> {
    let normalized = normalize_label(label);
    [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Contract,
        EmploymentType::SelfEmployed,
        EmploymentType::Retired,
        EmploymentType::Unemployed,
    ]
    .into_iter()
    .find(|kind| kind.label() == normalized)
}

pub(crate) fn collateral_type(label: &str) -> Option<CollateralType> {
    let normalized = normalize_label(label);
    [
        CollateralType::RealEstate,
        CollateralType::Cash,
        CollateralType::Securities,
        CollateralType::Vehicle,
        CollateralType::Equipment,
        CollateralType::Inventory,
        CollateralType::Other,
    ]
    .into_iter()
    .find(|kind| kind.label() == normalized)
}

/// `full-time`, `Full Time` and `FULL_TIME` all read as `FULL_TIME`.
fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|ch| match ch {
            '-' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
