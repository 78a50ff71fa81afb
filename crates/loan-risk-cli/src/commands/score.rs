use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use loan_risk_core::application::LoanApplicationInput;
use loan_risk_core::prediction;
use loan_risk_core::scoring::{ArtifactPaths, ModelSet};

use crate::input;

/// Arguments for scoring one application
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to a JSON application (otherwise read from stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Form-style field, repeatable (e.g. --field credit_score=702)
    #[arg(long = "field", value_name = "NAME=VALUE", conflicts_with = "input")]
    pub fields: Vec<String>,

    /// Risk classifier artifact
    #[arg(long, env = "LOAN_RISK_RISK_MODEL", default_value = "loan_one_model.json")]
    pub risk_model: PathBuf,

    /// Risk scaler artifact
    #[arg(long, env = "LOAN_RISK_RISK_SCALER", default_value = "loan_one_model_scaler.json")]
    pub risk_scaler: PathBuf,

    /// Grade classifier artifact
    #[arg(long, env = "LOAN_RISK_GRADE_MODEL", default_value = "loan_second_model.json")]
    pub grade_model: PathBuf,

    /// Grade scaler artifact
    #[arg(
        long,
        env = "LOAN_RISK_GRADE_SCALER",
        default_value = "loan_second_model_scaler.json"
    )]
    pub grade_scaler: PathBuf,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let application = read_application(&args)?;

    let models = ModelSet::load(&ArtifactPaths {
        risk_model: args.risk_model,
        risk_scaler: args.risk_scaler,
        grade_model: args.grade_model,
        grade_scaler: args.grade_scaler,
    })?;

    let output = prediction::score_application(&application, &models)?;
    Ok(serde_json::to_value(output)?)
}

fn read_application(args: &ScoreArgs) -> Result<LoanApplicationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if !args.fields.is_empty() {
        let fields = parse_fields(&args.fields)?;
        return Ok(LoanApplicationInput::from_fields(&fields)?);
    }
    input::stdin::read_stdin()?
        .ok_or_else(|| "--input <file.json>, --field NAME=VALUE or stdin required".into())
}

/// Split `NAME=VALUE` pairs into the map form submissions decode to.
fn parse_fields(pairs: &[String]) -> Result<HashMap<String, String>, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| format!("expected NAME=VALUE, got '{pair}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let fields = parse_fields(&[
            "credit_score=702".to_string(),
            "origination_date=2020-01-01".to_string(),
        ])
        .unwrap();
        assert_eq!(fields["credit_score"], "702");
        assert_eq!(fields["origination_date"], "2020-01-01");
    }

    #[test]
    fn test_parse_fields_keeps_equals_in_value() {
        let fields = parse_fields(&["note=a=b".to_string()]).unwrap();
        assert_eq!(fields["note"], "a=b");
    }

    #[test]
    fn test_parse_fields_rejects_bare_name() {
        assert!(parse_fields(&["credit_score".to_string()]).is_err());
    }
}
