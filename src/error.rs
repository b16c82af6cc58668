use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::db::SqlParam;

#[derive(Debug, ThisError)]
pub enum PortfolioError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("storage error: {source}; statement: {statement}")]
    Storage {
        statement: String,
        params: Vec<SqlParam>,
        source: SqlxError,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortfolioError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PortfolioError::Validation(msg.into())
    }

    /// Status code the route layer answers with for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            PortfolioError::Validation(_) => StatusCode::BAD_REQUEST,
            PortfolioError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PortfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            PortfolioError::Storage { .. }
            | PortfolioError::DatabaseError(_)
            | PortfolioError::Session(_)
            | PortfolioError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortfolioError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let (code, message) = match self {
            PortfolioError::Validation(msg) => ("BAD_REQUEST", msg),
            PortfolioError::Unauthorized(msg) => ("UNAUTHORIZED", msg.to_string()),
            PortfolioError::NotFound(what) => ("NOT_FOUND", format!("{what} not found")),
            PortfolioError::Session(reason) => {
                error!(%reason, "session teardown failed");
                ("SESSION_ERROR", "Logout failed".to_string())
            }
            other @ (PortfolioError::Storage { .. }
            | PortfolioError::DatabaseError(_)
            | PortfolioError::Io(_)) => {
                error!(error = %other, "request failed with internal error");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        (
            status,
            Json(ApiErrorResponse {
                success: false,
                code,
                message,
            }),
        )
            .into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
}
