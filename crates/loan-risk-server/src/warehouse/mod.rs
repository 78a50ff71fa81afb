pub mod keypair;
pub mod memory;
pub mod snowflake;

use async_trait::async_trait;
use thiserror::Error;

use loan_risk_core::prediction::PredictionRecord;

pub use keypair::{KeyPairCredential, KeyError};
pub use memory::InMemorySink;
pub use snowflake::SnowflakeSink;

/// Warehouse write errors. Every variant is a server-side failure.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Warehouse authentication failed: {0}")]
    Authentication(String),

    #[error("Warehouse unreachable: {0}")]
    Connectivity(String),

    #[error("Warehouse rejected the insert: {0}")]
    Rejected(String),

    #[error("Could not sign warehouse credential: {0}")]
    Credential(String),
}

impl From<reqwest::Error> for PersistError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PersistError::Rejected(err.to_string())
        } else {
            PersistError::Connectivity(err.to_string())
        }
    }
}

/// Durable destination for prediction records.
///
/// Called once per scored request; implementations must not retry, since a
/// retried insert can duplicate the row.
#[async_trait]
pub trait PredictionSink: Send + Sync {
    async fn persist(&self, record: &PredictionRecord) -> Result<(), PersistError>;
}
