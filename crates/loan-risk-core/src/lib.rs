pub mod application;
pub mod error;
pub mod features;
pub mod labels;
pub mod prediction;
pub mod scoring;
pub mod types;

pub use error::LoanRiskError;
pub use types::*;

/// Standard result type for all loan-risk operations
pub type LoanRiskResult<T> = Result<T, LoanRiskError>;
