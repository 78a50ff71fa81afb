use clap::Args;
use serde_json::{json, Value};

use loan_risk_core::labels::{map_grade_label, map_risk_label, reconcile};
use loan_risk_core::{with_metadata, SeverityLabel};

/// Arguments for label mapping and reconciliation
#[derive(Args)]
pub struct ReconcileArgs {
    /// Risk model class code (0, 1 or 2)
    #[arg(long, allow_hyphen_values = true, required_unless_present = "risk_label")]
    pub risk_code: Option<i64>,

    /// Risk severity given directly
    #[arg(long, conflicts_with = "risk_code")]
    pub risk_label: Option<SeverityLabel>,

    /// Grade model class code (A, B or C)
    #[arg(long, required_unless_present = "grade_label")]
    pub grade_code: Option<String>,

    /// Grade severity given directly
    #[arg(long, conflicts_with = "grade_code")]
    pub grade_label: Option<SeverityLabel>,
}

pub fn run_reconcile(args: ReconcileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let risk = match (args.risk_label, args.risk_code) {
        (Some(label), _) => label,
        (None, Some(code)) => map_risk_label(code),
        (None, None) => return Err("--risk-code or --risk-label is required".into()),
    };
    let grade = match (args.grade_label, args.grade_code.as_deref()) {
        (Some(label), _) => label,
        (None, Some(code)) => map_grade_label(code),
        (None, None) => return Err("--grade-code or --grade-label is required".into()),
    };

    let final_prediction = reconcile(risk, grade);
    let mut warnings = Vec::new();
    if risk == SeverityLabel::Unknown || grade == SeverityLabel::Unknown {
        warnings.push("An input severity is Unknown; reconciliation does not special-case it".to_string());
    }

    let output = with_metadata(
        "Reconciled by precedence High > Medium > Low",
        &json!({
            "risk_code": args.risk_code,
            "grade_code": args.grade_code,
        }),
        warnings,
        0,
        json!({
            "predicted_risk": risk,
            "predicted_grade": grade,
            "final_prediction": final_prediction,
        }),
    );
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(risk_code: i64, grade_code: &str) -> ReconcileArgs {
        ReconcileArgs {
            risk_code: Some(risk_code),
            risk_label: None,
            grade_code: Some(grade_code.to_string()),
            grade_label: None,
        }
    }

    #[test]
    fn test_codes_are_mapped_then_reconciled() {
        let value = run_reconcile(codes(2, "A")).unwrap();
        assert_eq!(value["result"]["predicted_risk"], "High");
        assert_eq!(value["result"]["predicted_grade"], "Low");
        assert_eq!(value["result"]["final_prediction"], "High");
        assert!(value["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_labels_override_codes() {
        let args = ReconcileArgs {
            risk_code: None,
            risk_label: Some(SeverityLabel::Low),
            grade_code: None,
            grade_label: Some(SeverityLabel::Medium),
        };
        let value = run_reconcile(args).unwrap();
        assert_eq!(value["result"]["final_prediction"], "Medium");
    }

    #[test]
    fn test_unlisted_code_warns() {
        let value = run_reconcile(codes(7, "A")).unwrap();
        assert_eq!(value["result"]["predicted_risk"], "Unknown");
        assert_eq!(value["result"]["final_prediction"], "Low");
        assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_side_is_an_error() {
        let args = ReconcileArgs {
            risk_code: Some(1),
            risk_label: None,
            grade_code: None,
            grade_label: None,
        };
        assert!(run_reconcile(args).is_err());
    }
}
