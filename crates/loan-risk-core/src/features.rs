//! Feature assembly for the risk and grade models.
//!
//! Both vectors have a fixed column order that the fitted artifacts were
//! trained on. Reordering a column silently corrupts every prediction.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::LoanApplicationInput;
use crate::{Money, Rate};

/// Day count used for loan age. Not calendar aware.
pub const DAYS_PER_YEAR: f64 = 365.0;

pub const RISK_FEATURES: [&str; 9] = [
    "loan_amount",
    "employment_status",
    "credit_score",
    "income",
    "debt_to_income_ratio",
    "age",
    "interest_rate",
    "existing_loan_balance",
    "previous_default",
];

pub const GRADE_FEATURES: [&str; 7] = [
    "borrower_rate",
    "interest_paid",
    "installment",
    "term",
    "principal_paid",
    "amount_borrowed",
    "loan_age",
];

// ---------------------------------------------------------------------------
// Vectors
// ---------------------------------------------------------------------------

/// Input to the risk model, columns in `RISK_FEATURES` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFeatureVector(pub [f64; 9]);

/// Input to the grade model, columns in `GRADE_FEATURES` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeFeatureVector(pub [f64; 7]);

impl RiskFeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl GradeFeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Fields computed from the application rather than entered.
///
/// `borrower_rate` and `amount_borrowed` are aliases: the grade model and
/// the warehouse table name them differently from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    /// Alias of `interest_rate`.
    pub borrower_rate: Rate,
    /// Alias of `loan_amount`.
    pub amount_borrowed: Money,
    /// Years between origination and last payment (days / 365).
    pub loan_age: f64,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Whole days between the two dates divided by 365.
///
/// Negative when `last_payment` precedes `origination`; no guard exists.
pub fn loan_age_years(origination: NaiveDate, last_payment: NaiveDate) -> f64 {
    (last_payment - origination).num_days() as f64 / DAYS_PER_YEAR
}

pub fn derive_fields(input: &LoanApplicationInput) -> DerivedFields {
    DerivedFields {
        borrower_rate: input.interest_rate,
        amount_borrowed: input.loan_amount,
        loan_age: loan_age_years(input.origination_date, input.last_payment_date),
    }
}

pub fn risk_vector(input: &LoanApplicationInput) -> RiskFeatureVector {
    RiskFeatureVector([
        to_f64(input.loan_amount),
        input.employment_status as f64,
        input.credit_score as f64,
        to_f64(input.income),
        to_f64(input.debt_to_income_ratio),
        input.age as f64,
        to_f64(input.interest_rate),
        to_f64(input.existing_loan_balance),
        input.previous_default as f64,
    ])
}

pub fn grade_vector(input: &LoanApplicationInput, derived: &DerivedFields) -> GradeFeatureVector {
    GradeFeatureVector([
        to_f64(derived.borrower_rate),
        to_f64(input.interest_paid),
        to_f64(input.installment),
        input.term as f64,
        to_f64(input.principal_paid),
        to_f64(derived.amount_borrowed),
        derived.loan_age,
    ])
}

/// Build both model inputs for one application.
pub fn assemble(input: &LoanApplicationInput) -> (RiskFeatureVector, GradeFeatureVector) {
    let derived = derive_fields(input);
    (risk_vector(input), grade_vector(input, &derived))
}

fn to_f64(value: Decimal) -> f64 {
    // Every Decimal is within f64 range; None never occurs in practice.
    value.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_input() -> LoanApplicationInput {
        LoanApplicationInput {
            loan_amount: dec!(25000),
            employment_status: 2,
            credit_score: 680,
            income: dec!(54000),
            debt_to_income_ratio: dec!(0.41),
            age: 35,
            interest_rate: dec!(11.5),
            existing_loan_balance: dec!(3000),
            previous_default: 1,
            interest_paid: dec!(1200),
            installment: dec!(550),
            term: 36,
            principal_paid: dec!(5400),
            origination_date: date(2020, 1, 1),
            last_payment_date: date(2021, 1, 1),
        }
    }

    #[test]
    fn test_loan_age_counts_leap_day_naively() {
        // 2020 is a leap year: 366 days, still divided by 365
        let age = loan_age_years(date(2020, 1, 1), date(2021, 1, 1));
        assert_eq!(age, 366.0 / 365.0);
    }

    #[test]
    fn test_loan_age_negative_when_dates_reversed() {
        let age = loan_age_years(date(2021, 1, 1), date(2020, 1, 1));
        assert_eq!(age, -366.0 / 365.0);
    }

    #[test]
    fn test_loan_age_zero_for_same_day() {
        assert_eq!(loan_age_years(date(2022, 6, 15), date(2022, 6, 15)), 0.0);
    }

    #[test]
    fn test_derived_fields_alias_inputs() {
        let input = sample_input();
        let derived = derive_fields(&input);
        assert_eq!(derived.borrower_rate, input.interest_rate);
        assert_eq!(derived.amount_borrowed, input.loan_amount);
    }

    #[test]
    fn test_risk_vector_order() {
        let (risk, _) = assemble(&sample_input());
        assert_eq!(
            risk.0,
            [25000.0, 2.0, 680.0, 54000.0, 0.41, 35.0, 11.5, 3000.0, 1.0]
        );
    }

    #[test]
    fn test_grade_vector_order() {
        let (_, grade) = assemble(&sample_input());
        assert_eq!(
            grade.0,
            [11.5, 1200.0, 550.0, 36.0, 5400.0, 25000.0, 366.0 / 365.0]
        );
    }

    #[test]
    fn test_feature_name_tables_match_vector_widths() {
        let (risk, grade) = assemble(&sample_input());
        assert_eq!(RISK_FEATURES.len(), risk.as_slice().len());
        assert_eq!(GRADE_FEATURES.len(), grade.as_slice().len());
    }
}
