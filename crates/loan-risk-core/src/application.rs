//! Raw loan application fields and their coercion from form strings.
//!
//! Coercion is the only validation performed: numbers must parse and dates
//! must be `YYYY-MM-DD`. Ranges and signs flow through to the models as-is.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{LoanRiskError, LoanRiskResult, Money, Rate};

/// Calendar format for both date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form field names accepted by `POST /predict`, in submission order.
pub const FIELD_NAMES: [&str; 15] = [
    "loan_amount",
    "employment_status",
    "credit_score",
    "income",
    "debt_to_income_ratio",
    "age",
    "interest_rate",
    "existing_loan_balance",
    "previous_default",
    "interest_paid",
    "installment",
    "term",
    "principal_paid",
    "origination_date",
    "last_payment_date",
];

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplicationInput {
    pub loan_amount: Money,
    /// Employment status code as encoded for the risk model.
    pub employment_status: i64,
    pub credit_score: i64,
    pub income: Money,
    pub debt_to_income_ratio: Rate,
    pub age: i64,
    pub interest_rate: Rate,
    pub existing_loan_balance: Money,
    /// 1 when the borrower has defaulted before, 0 otherwise.
    pub previous_default: i64,
    pub interest_paid: Money,
    pub installment: Money,
    /// Loan term as supplied (typically months).
    pub term: i64,
    pub principal_paid: Money,
    #[serde(deserialize_with = "strict_date")]
    pub origination_date: NaiveDate,
    #[serde(deserialize_with = "strict_date")]
    pub last_payment_date: NaiveDate,
}

impl LoanApplicationInput {
    /// Coerce a name-to-string map (a decoded form body) into typed fields.
    ///
    /// Fields are read in `FIELD_NAMES` order so the first bad field is the
    /// one reported.
    pub fn from_fields(fields: &HashMap<String, String>) -> LoanRiskResult<Self> {
        Ok(Self {
            loan_amount: parse_decimal(fields, "loan_amount")?,
            employment_status: parse_integer(fields, "employment_status")?,
            credit_score: parse_integer(fields, "credit_score")?,
            income: parse_decimal(fields, "income")?,
            debt_to_income_ratio: parse_decimal(fields, "debt_to_income_ratio")?,
            age: parse_integer(fields, "age")?,
            interest_rate: parse_decimal(fields, "interest_rate")?,
            existing_loan_balance: parse_decimal(fields, "existing_loan_balance")?,
            previous_default: parse_integer(fields, "previous_default")?,
            interest_paid: parse_decimal(fields, "interest_paid")?,
            installment: parse_decimal(fields, "installment")?,
            term: parse_integer(fields, "term")?,
            principal_paid: parse_decimal(fields, "principal_paid")?,
            origination_date: parse_date(fields, "origination_date")?,
            last_payment_date: parse_date(fields, "last_payment_date")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

fn raw_field<'a>(fields: &'a HashMap<String, String>, name: &str) -> LoanRiskResult<&'a str> {
    fields
        .get(name)
        .map(|v| v.trim())
        .ok_or_else(|| LoanRiskError::invalid(name, "field is missing"))
}

/// Plain or scientific notation (`1500.75`, `1.5e4`).
pub fn parse_decimal(fields: &HashMap<String, String>, name: &str) -> LoanRiskResult<Decimal> {
    let raw = raw_field(fields, name)?;
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| LoanRiskError::invalid(name, format!("'{raw}' is not a number")))
}

pub fn parse_integer(fields: &HashMap<String, String>, name: &str) -> LoanRiskResult<i64> {
    let raw = raw_field(fields, name)?;
    raw.parse::<i64>()
        .map_err(|_| LoanRiskError::invalid(name, format!("'{raw}' is not an integer")))
}

pub fn parse_date(fields: &HashMap<String, String>, name: &str) -> LoanRiskResult<NaiveDate> {
    let raw = raw_field(fields, name)?;
    parse_calendar_date(raw).map_err(|reason| LoanRiskError::DateError {
        field: name.to_string(),
        reason,
    })
}

/// Strict `YYYY-MM-DD`: four-digit year, two-digit month and day.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(format!("'{raw}' does not match YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| format!("'{raw}': {e}"))
}

/// JSON bodies get the same date rule as form submissions.
fn strict_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(raw.trim()).map_err(serde::de::Error::custom)
}
