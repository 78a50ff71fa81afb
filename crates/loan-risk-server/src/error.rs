use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use loan_risk_core::LoanRiskError;

use crate::render;
use crate::warehouse::PersistError;

/// Request-scoped failures. None of them touch shared state.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Input(LoanRiskError),

    #[error("Malformed request body: {message}")]
    Body { status: StatusCode, message: String },

    #[error("{0}")]
    Inference(LoanRiskError),

    #[error(transparent)]
    Persistence(#[from] PersistError),
}

impl From<LoanRiskError> for AppError {
    fn from(err: LoanRiskError) -> Self {
        if err.is_client_error() {
            AppError::Input(err)
        } else {
            AppError::Inference(err)
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rej: JsonRejection) -> Self {
        let status = match rej {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::Body {
            status,
            message: rej.body_text(),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rej: FormRejection) -> Self {
        AppError::Body {
            status: rej.status(),
            message: rej.body_text(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Body { status, .. } => *status,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Persistence(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Input(_) | AppError::Body { .. } => "invalid_input",
            AppError::Inference(_) => "inference_failed",
            AppError::Persistence(_) => "persistence_failed",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            AppError::Input(_) | AppError::Body { .. } => "Invalid application",
            AppError::Inference(_) => "Scoring failed",
            AppError::Persistence(_) => "Prediction could not be saved",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({
                "error": self.to_string(),
                "kind": self.kind(),
            })),
        )
            .into_response()
    }
}

/// Same failure rendered as an HTML page for the form route.
#[derive(Debug)]
pub struct HtmlError(pub AppError);

impl<E: Into<AppError>> From<E> for HtmlError {
    fn from(err: E) -> Self {
        HtmlError(err.into())
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let page = render::error_page(self.0.title(), &self.0.to_string());
        (status, page).into_response()
    }
}
