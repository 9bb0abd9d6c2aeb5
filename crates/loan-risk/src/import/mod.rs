//! CSV import of applicant snapshots from origination exports.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::assessment::{
    ApplicantSnapshot, ApplicationId, CreditProfile, EmploymentProfile, IncomeProfile, LoanTerms,
};

use parser::ApplicantRow;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read applicant export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
            ImportError::InvalidRow { line, reason } => {
                write!(f, "invalid applicant on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ApplicantCsvImporter;

impl ApplicantCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ApplicantSnapshot>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse every row. Missing inputs stay `None` so the engine can report them per factor.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ApplicantSnapshot>, ImportError> {
        parser::parse_rows(reader)?
            .into_iter()
            .map(|(line, row)| snapshot_from_row(line, row))
            .collect()
    }
}

fn snapshot_from_row(line: u64, row: ApplicantRow) -> Result<ApplicantSnapshot, ImportError> {
    let invalid = |reason: String| ImportError::InvalidRow { line, reason };

    let application_id = row
        .application_id
        .ok_or_else(|| invalid("application_id is required".to_string()))?;
    let loan_amount = row
        .loan_amount
        .ok_or_else(|| invalid("loan_amount is required".to_string()))?;

    let employment_type = row
        .employment_type
        .as_deref()
        .map(|label| {
            parser::employment_type(label)
                .ok_or_else(|| invalid(format!("unknown employment_type '{label}'")))
        })
        .transpose()?;
    let collateral_type = row
        .collateral_type
        .as_deref()
        .map(|label| {
            parser::collateral_type(label)
                .ok_or_else(|| invalid(format!("unknown collateral_type '{label}'")))
        })
        .transpose()?;

    Ok(ApplicantSnapshot {
        application_id: ApplicationId(application_id),
        credit: CreditProfile {
            credit_score: row.credit_score,
            credit_score_date: row.credit_score_date,
            prior_defaults: row.prior_defaults,
        },
        income: IncomeProfile {
            annual_income: row.annual_income,
            monthly_income: row.monthly_income,
            other_income: row.other_income.unwrap_or(0.0),
            monthly_expenses: row.monthly_expenses,
            net_worth: row.net_worth,
        },
        employment: EmploymentProfile {
            employment_type,
            years_employed: row.years_employed.unwrap_or(0.0),
            years_in_industry: row.years_in_industry.unwrap_or(0.0),
        },
        loan: LoanTerms {
            loan_amount,
            collateral_value: row.collateral_value,
            collateral_type,
        },
        debt_to_income_ratio: row.debt_to_income_ratio,
        market_condition_score: row.market_condition_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{CollateralType, EmploymentType};
    use std::io::Cursor;

    const HEADER: &str = "application_id,credit_score,credit_score_date,prior_defaults,annual_income,monthly_income,other_income,monthly_expenses,net_worth,employment_type,years_employed,years_in_industry,loan_amount,collateral_value,collateral_type,debt_to_income_ratio,market_condition_score";

    fn import(rows: &[&str]) -> Result<Vec<ApplicantSnapshot>, ImportError> {
        let mut data = String::from(HEADER);
        for row in rows {
            data.push('\n');
            data.push_str(row);
        }
        ApplicantCsvImporter::from_reader(Cursor::new(data))
    }

    #[test]
    fn parses_a_complete_row() {
        let snapshots = import(&[
            "app-1, 750, 2025-05-15, 0, 72000, 6000, 0, 2000, 150000, full_time, 5, 10, 50000, 80000, Real Estate, 0.30,",
        ])
        .expect("row parses");

        let snapshot = &snapshots[0];
        assert_eq!(snapshot.application_id.0, "app-1");
        assert_eq!(snapshot.credit.credit_score, Some(750));
        assert_eq!(
            snapshot.credit.credit_score_date,
            chrono::NaiveDate::from_ymd_opt(2025, 5, 15)
        );
        assert_eq!(snapshot.employment.employment_type, Some(EmploymentType::FullTime));
        assert_eq!(snapshot.loan.collateral_type, Some(CollateralType::RealEstate));
        assert_eq!(snapshot.debt_to_income_ratio, Some(0.30));
        assert_eq!(snapshot.market_condition_score, None);
    }

    #[test]
    fn empty_cells_become_missing_inputs() {
        let snapshots = import(&["app-2,,,,,5000,,3000,,,,,25000,,,,"]).expect("row parses");

        let snapshot = &snapshots[0];
        assert_eq!(snapshot.credit.credit_score, None);
        assert_eq!(snapshot.credit.prior_defaults, None);
        assert_eq!(snapshot.employment.employment_type, None);
        assert_eq!(snapshot.loan.collateral_value, None);
        assert_eq!(snapshot.debt_to_income_ratio, None);
    }

    #[test]
    fn unknown_labels_report_the_line() {
        let err = import(&[
            "app-1,750,,0,,6000,,2000,,FULL_TIME,5,10,50000,,,0.3,",
            "app-2,700,,0,,6000,,2000,,GIG_WORKER,5,10,50000,,,0.3,",
        ])
        .expect_err("unknown employment type");

        match err {
            ImportError::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("GIG_WORKER"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_cells_are_csv_errors() {
        let err = import(&["app-1,excellent,,0,,6000,,2000,,FULL_TIME,5,10,50000,,,0.3,"])
            .expect_err("credit score is not a number");
        assert!(matches!(err, ImportError::Csv(_)));
    }

    #[test]
    fn loan_amount_is_required() {
        let err = import(&["app-1,750,,0,,6000,,2000,,FULL_TIME,5,10,,,,0.3,"])
            .expect_err("missing loan amount");
        assert!(err.to_string().contains("loan_amount"));
    }
}
