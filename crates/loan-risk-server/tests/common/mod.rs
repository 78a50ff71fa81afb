#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use loan_risk_core::application::LoanApplicationInput;
use loan_risk_core::features::{GradeFeatureVector, RiskFeatureVector};
use loan_risk_core::prediction::{self, PredictionRecord};
use loan_risk_core::scoring::{GradeCode, LoanScorer, RiskCode};
use loan_risk_core::{LoanRiskError, LoanRiskResult};
use loan_risk_server::warehouse::{PersistError, PredictionSink};

/// Scorer returning fixed codes and counting invocations.
pub struct StubScorer {
    pub risk: RiskCode,
    pub grade: &'static str,
    pub calls: Arc<AtomicUsize>,
}

impl StubScorer {
    pub fn new(risk: RiskCode, grade: &'static str) -> Self {
        Self {
            risk,
            grade,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LoanScorer for StubScorer {
    fn score_risk(&self, _: &RiskFeatureVector) -> LoanRiskResult<RiskCode> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.risk)
    }

    fn score_grade(&self, _: &GradeFeatureVector) -> LoanRiskResult<GradeCode> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.grade.to_string())
    }
}

/// Scorer whose artifacts do not fit the feature vectors.
pub struct MismatchedScorer;

impl LoanScorer for MismatchedScorer {
    fn score_risk(&self, features: &RiskFeatureVector) -> LoanRiskResult<RiskCode> {
        Err(LoanRiskError::ShapeMismatch {
            stage: "scaler".to_string(),
            expected: 8,
            actual: features.as_slice().len(),
        })
    }

    fn score_grade(&self, _: &GradeFeatureVector) -> LoanRiskResult<GradeCode> {
        Ok("A".to_string())
    }
}

/// Sink that always fails the way an unreachable warehouse does.
pub struct FailingSink;

#[async_trait]
impl PredictionSink for FailingSink {
    async fn persist(&self, _: &PredictionRecord) -> Result<(), PersistError> {
        Err(PersistError::Connectivity("connection refused".to_string()))
    }
}

pub fn sample_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("loan_amount", "15000"),
        ("employment_status", "1"),
        ("credit_score", "702"),
        ("income", "58000"),
        ("debt_to_income_ratio", "0.27"),
        ("age", "38"),
        ("interest_rate", "9.75"),
        ("existing_loan_balance", "1200"),
        ("previous_default", "0"),
        ("interest_paid", "640.25"),
        ("installment", "320.5"),
        ("term", "48"),
        ("principal_paid", "3800"),
        ("origination_date", "2020-01-01"),
        ("last_payment_date", "2021-01-01"),
    ]
}

/// `application/x-www-form-urlencoded` body, with optional overrides.
pub fn form_body(overrides: &[(&str, &str)]) -> String {
    sample_fields()
        .into_iter()
        .map(|(k, v)| {
            let v = overrides
                .iter()
                .find(|(name, _)| *name == k)
                .map(|(_, value)| *value)
                .unwrap_or(v);
            format!("{k}={v}")
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn sample_input() -> LoanApplicationInput {
    let fields: HashMap<String, String> = sample_fields()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    LoanApplicationInput::from_fields(&fields).unwrap()
}

pub fn sample_record(risk: RiskCode, grade: &'static str) -> PredictionRecord {
    prediction::score(&sample_input(), &StubScorer::new(risk, grade))
        .unwrap()
        .record
}
