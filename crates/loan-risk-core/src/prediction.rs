//! One scored application: assembly, inference, labelling and reconciliation.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::LoanApplicationInput;
use crate::features::{self, DerivedFields};
use crate::labels::{map_grade_label, map_risk_label, reconcile};
use crate::scoring::{GradeCode, LoanScorer, RiskCode};
use crate::{types::*, LoanRiskResult};

/// Warehouse column order for a persisted record.
pub const WAREHOUSE_COLUMNS: [&str; 21] = [
    "loan_amount",
    "employment_status",
    "credit_score",
    "income",
    "debt_to_income_ratio",
    "age",
    "interest_rate",
    "existing_loan_balance",
    "previous_default",
    "borrower_rate",
    "interest_paid",
    "installment",
    "term",
    "principal_paid",
    "amount_borrowed",
    "origination_date",
    "last_payment_date",
    "loan_age",
    "predicted_risk",
    "predicted_grade",
    "final_prediction",
];

/// Everything entered, everything derived, and the three labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    #[serde(flatten)]
    pub application: LoanApplicationInput,
    #[serde(flatten)]
    pub derived: DerivedFields,
    pub predicted_risk: SeverityLabel,
    pub predicted_grade: SeverityLabel,
    pub final_prediction: SeverityLabel,
}

/// A single persisted cell, typed by how the warehouse should bind it.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Integer(i64),
    Number(Decimal),
    Float(f64),
    Text(String),
}

impl PredictionRecord {
    /// Cells in `WAREHOUSE_COLUMNS` order.
    pub fn to_row(&self) -> Vec<ColumnValue> {
        use ColumnValue::*;

        let app = &self.application;
        vec![
            Number(app.loan_amount),
            Integer(app.employment_status),
            Integer(app.credit_score),
            Number(app.income),
            Number(app.debt_to_income_ratio),
            Integer(app.age),
            Number(app.interest_rate),
            Number(app.existing_loan_balance),
            Integer(app.previous_default),
            Number(self.derived.borrower_rate),
            Number(app.interest_paid),
            Number(app.installment),
            Integer(app.term),
            Number(app.principal_paid),
            Number(self.derived.amount_borrowed),
            Text(app.origination_date.to_string()),
            Text(app.last_payment_date.to_string()),
            Float(self.derived.loan_age),
            Text(self.predicted_risk.to_string()),
            Text(self.predicted_grade.to_string()),
            Text(self.final_prediction.to_string()),
        ]
    }
}

/// Record plus the raw class codes the labels came from.
#[derive(Debug, Clone)]
pub struct ScoredApplication {
    pub record: PredictionRecord,
    pub risk_code: RiskCode,
    pub grade_code: GradeCode,
}

impl ScoredApplication {
    /// Informational notes about unusual but accepted outcomes.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.record.predicted_risk == SeverityLabel::Unknown {
            warnings.push(format!(
                "Risk model returned code {} which has no label; recorded as Unknown",
                self.risk_code
            ));
        }
        if self.record.predicted_grade == SeverityLabel::Unknown {
            warnings.push(format!(
                "Grade model returned code '{}' which has no label; recorded as Unknown",
                self.grade_code
            ));
        }
        if self.record.derived.loan_age < 0.0 {
            warnings.push(
                "last_payment_date precedes origination_date; loan_age is negative".to_string(),
            );
        }
        warnings
    }

    /// Wrap the record in the standard envelope, codes kept as assumptions.
    pub fn into_output(self, elapsed_us: u64) -> ComputationOutput<PredictionRecord> {
        let warnings = self.warnings();
        let assumptions = serde_json::json!({
            "risk_code": self.risk_code,
            "grade_code": self.grade_code,
            "risk_labels": {"0": "Low", "1": "Medium", "2": "High"},
            "grade_labels": {"A": "Low", "B": "Medium", "C": "High"},
            "loan_age_days_per_year": features::DAYS_PER_YEAR,
        });
        with_metadata(
            "Scaled risk and grade classifiers reconciled by precedence High > Medium > Low",
            &assumptions,
            warnings,
            elapsed_us,
            self.record,
        )
    }
}

/// Score one application against both models.
pub fn score(input: &LoanApplicationInput, scorer: &dyn LoanScorer) -> LoanRiskResult<ScoredApplication> {
    let derived = features::derive_fields(input);
    let risk_features = features::risk_vector(input);
    let grade_features = features::grade_vector(input, &derived);

    let risk_code = scorer.score_risk(&risk_features)?;
    let grade_code = scorer.score_grade(&grade_features)?;

    let predicted_risk = map_risk_label(risk_code);
    let predicted_grade = map_grade_label(&grade_code);
    let final_prediction = reconcile(predicted_risk, predicted_grade);

    Ok(ScoredApplication {
        record: PredictionRecord {
            application: input.clone(),
            derived,
            predicted_risk,
            predicted_grade,
            final_prediction,
        },
        risk_code,
        grade_code,
    })
}

/// Score one application and wrap the record in the standard envelope.
pub fn score_application(
    input: &LoanApplicationInput,
    scorer: &dyn LoanScorer,
) -> LoanRiskResult<ComputationOutput<PredictionRecord>> {
    let start = Instant::now();
    let scored = score(input, scorer)?;
    Ok(scored.into_output(start.elapsed().as_micros() as u64))
}
