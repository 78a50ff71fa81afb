use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use loan_risk_core::prediction::PredictionRecord;

use super::{PersistError, PredictionSink};

/// In-memory sink for development and testing
#[derive(Clone, Default)]
pub struct InMemorySink {
    records: Arc<Mutex<Vec<PredictionRecord>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PredictionRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PredictionSink for InMemorySink {
    async fn persist(&self, record: &PredictionRecord) -> Result<(), PersistError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistError::Rejected("in-memory sink lock poisoned".to_string()))?;
        records.push(record.clone());
        Ok(())
    }
}
