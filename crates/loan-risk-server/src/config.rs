use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser};

use loan_risk_core::scoring::ArtifactPaths;

/// Loan risk scoring web service
#[derive(Debug, Clone, Parser)]
#[command(
    name = "loan-risk-server",
    version,
    about = "Scores loan applications and records each prediction in the warehouse"
)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "LOAN_RISK_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub warehouse: WarehouseConfig,
}

/// Serialized scaler and classifier locations
#[derive(Debug, Clone, Args)]
pub struct ArtifactArgs {
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

impl ArtifactArgs {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            risk_model: self.risk_model.clone(),
            risk_scaler: self.risk_scaler.clone(),
            grade_model: self.grade_model.clone(),
            grade_scaler: self.grade_scaler.clone(),
        }
    }
}

/// Snowflake connection parameters. Fixed per process, never per request.
#[derive(Debug, Clone, Args)]
pub struct WarehouseConfig {
    /// Account identifier, e.g. `xy12345.us-east-2.aws` or `myorg-myaccount`
    #[arg(long = "snowflake-account", env = "SNOWFLAKE_ACCOUNT")]
    pub account: String,

    /// Login name bound to the key pair
    #[arg(long = "snowflake-user", env = "SNOWFLAKE_USER")]
    pub user: String,

    /// Unencrypted PEM private key registered for the user
    #[arg(long = "snowflake-private-key", env = "SNOWFLAKE_PRIVATE_KEY_PATH", default_value = "rsa_key.pem")]
    pub private_key_path: PathBuf,

    #[arg(long = "snowflake-warehouse", env = "SNOWFLAKE_WAREHOUSE", default_value = "CIBIL_WH")]
    pub warehouse: String,

    #[arg(long = "snowflake-database", env = "SNOWFLAKE_DATABASE", default_value = "CIBIL_DB")]
    pub database: String,

    #[arg(long = "snowflake-schema", env = "SNOWFLAKE_SCHEMA", default_value = "PUBLIC")]
    pub schema: String,

    #[arg(long = "snowflake-role", env = "SNOWFLAKE_ROLE", default_value = "SYSADMIN")]
    pub role: String,

    /// Destination table for prediction records
    #[arg(long = "snowflake-table", env = "SNOWFLAKE_TABLE", default_value = "loan_user_data")]
    pub table: String,

    /// Override the SQL API base URL (defaults to the account host)
    #[arg(long = "snowflake-url", env = "SNOWFLAKE_URL")]
    pub base_url: Option<String>,

    /// Server-side statement timeout in seconds; unset means the warehouse default
    #[arg(long = "snowflake-statement-timeout", env = "SNOWFLAKE_STATEMENT_TIMEOUT")]
    pub statement_timeout: Option<u64>,
}

impl WarehouseConfig {
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.snowflakecomputing.com",
                self.account.to_ascii_lowercase()
            ),
        }
    }

    /// Account part of the JWT issuer: upper-cased, region suffix removed.
    pub fn jwt_account(&self) -> String {
        let account = self.account.split('.').next().unwrap_or_default();
        account.to_ascii_uppercase()
    }

    pub fn jwt_user(&self) -> String {
        self.user.to_ascii_uppercase()
    }
}
