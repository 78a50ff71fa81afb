//! Snowflake SQL API sink authenticated with a key-pair JWT.
//!
//! Each write mints a fresh token and submits a single parameterized INSERT.
//! A `202 Accepted` means the statement is still running; the sink polls the
//! status URL until it finishes so the caller observes a blocking write.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use loan_risk_core::prediction::{ColumnValue, PredictionRecord, WAREHOUSE_COLUMNS};

use super::{KeyPairCredential, PersistError, PredictionSink};
use crate::config::WarehouseConfig;

const STATEMENTS_PATH: &str = "/api/v2/statements";
const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";
const TOKEN_TYPE: &str = "KEYPAIR_JWT";
/// Snowflake rejects key-pair tokens that live longer than one hour.
const TOKEN_LIFETIME_SECS: i64 = 59 * 60;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    database: &'a str,
    schema: &'a str,
    warehouse: &'a str,
    role: &'a str,
    bindings: BTreeMap<String, Binding>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    statement_handle: Option<String>,
    #[serde(default)]
    statement_status_url: Option<String>,
}

pub struct SnowflakeSink {
    client: Client,
    config: WarehouseConfig,
    signing_key: EncodingKey,
    issuer: String,
    subject: String,
    insert_sql: String,
}

impl SnowflakeSink {
    pub fn new(config: WarehouseConfig, credential: &KeyPairCredential) -> Result<Self, PersistError> {
        let key = RsaPrivateKey::from_pkcs8_der(credential.private_key_der())
            .map_err(|e| PersistError::Credential(e.to_string()))?;
        let pkcs1 = key
            .to_pkcs1_der()
            .map_err(|e| PersistError::Credential(e.to_string()))?;
        let subject = format!("{}.{}", config.jwt_account(), config.jwt_user());
        let issuer = format!("{}.{}", subject, credential.public_key_fingerprint());
        let insert_sql = insert_statement(&config.table);
        Ok(Self {
            client: Client::new(),
            signing_key: EncodingKey::from_rsa_der(pkcs1.as_bytes()),
            config,
            issuer,
            subject,
            insert_sql,
        })
    }

    fn token(&self) -> Result<String, PersistError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: self.subject.clone(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| PersistError::Credential(e.to_string()))
    }

    async fn await_completion(&self, mut response: Response, token: &str) -> Result<(), PersistError> {
        loop {
            let status = response.status();
            match status {
                StatusCode::OK => {
                    let body: StatementResponse = response.json().await.unwrap_or_default();
                    info!(
                        statement = body.statement_handle.as_deref().unwrap_or("-"),
                        "prediction record inserted"
                    );
                    return Ok(());
                }
                StatusCode::ACCEPTED => {
                    let body: StatementResponse = response.json().await?;
                    let path = body.statement_status_url.ok_or_else(|| {
                        PersistError::Rejected("202 response without statementStatusUrl".to_string())
                    })?;
                    debug!(status_url = %path, "insert still running; polling");
                    tokio::time::sleep(POLL_INTERVAL).await;
                    response = self
                        .client
                        .get(format!("{}{}", self.config.base_url(), path))
                        .bearer_auth(token)
                        .header(TOKEN_TYPE_HEADER, TOKEN_TYPE)
                        .header(ACCEPT, "application/json")
                        .send()
                        .await?;
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(PersistError::Authentication(error_message(response).await));
                }
                _ => {
                    let message = error_message(response).await;
                    return Err(PersistError::Rejected(format!("{status}: {message}")));
                }
            }
        }
    }
}

#[async_trait]
impl PredictionSink for SnowflakeSink {
    async fn persist(&self, record: &PredictionRecord) -> Result<(), PersistError> {
        let token = self.token()?;
        let body = StatementRequest {
            statement: &self.insert_sql,
            timeout: self.config.statement_timeout,
            database: &self.config.database,
            schema: &self.config.schema,
            warehouse: &self.config.warehouse,
            role: &self.config.role,
            bindings: bindings(record),
        };
        let url = format!("{}{}", self.config.base_url(), STATEMENTS_PATH);
        debug!(%url, table = %self.config.table, "submitting insert");

        let response = self
            .client
            .post(url)
            .query(&[("requestId", Uuid::new_v4().to_string())])
            .bearer_auth(&token)
            .header(TOKEN_TYPE_HEADER, TOKEN_TYPE)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        self.await_completion(response, &token).await
    }
}

/// `INSERT INTO <table> (<columns>) VALUES (?, ...)` in warehouse column order.
pub fn insert_statement(table: &str) -> String {
    let placeholders = vec!["?"; WAREHOUSE_COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        WAREHOUSE_COLUMNS.join(", "),
        placeholders
    )
}

/// Positional bindings keyed "1".."21".
pub fn bindings(record: &PredictionRecord) -> BTreeMap<String, Binding> {
    record
        .to_row()
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            let binding = match cell {
                ColumnValue::Integer(v) => Binding {
                    kind: "FIXED",
                    value: v.to_string(),
                },
                ColumnValue::Number(v) => Binding {
                    kind: "FIXED",
                    value: v.normalize().to_string(),
                },
                ColumnValue::Float(v) => Binding {
                    kind: "REAL",
                    value: v.to_string(),
                },
                ColumnValue::Text(v) => Binding {
                    kind: "TEXT",
                    value: v,
                },
            };
            ((i + 1).to_string(), binding)
        })
        .collect()
}

async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<StatementResponse>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(text)
}
