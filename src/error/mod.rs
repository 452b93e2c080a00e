//! Application error types mapped to HTTP responses at the boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::email::DispatchError;
use crate::services::AccountError;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Account already exists.")]
    AlreadyExists,

    /// Login against an email with no account.
    #[error("Account doesn't exist. Please create an account.")]
    UnknownAccount,

    #[error("Account does not exist.")]
    AccountNotFound,

    #[error("Incorrect password.")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Password reset failed")]
    UpdateFailed,

    /// The whole-request deadline elapsed.
    #[error("Request timed out")]
    Timeout,

    /// Persistence failure while creating an account.
    #[error("Signup error: {0}")]
    Signup(#[source] StoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Email dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::AlreadyExists => AppError::AlreadyExists,
            AccountError::AccountNotFound => AppError::AccountNotFound,
            AccountError::InvalidCredentials => AppError::InvalidCredentials,
            AccountError::InvalidOrExpiredToken => AppError::InvalidOrExpiredToken,
            AccountError::UpdateFailed => AppError::UpdateFailed,
            AccountError::Store(e) => AppError::Store(e),
            AccountError::Dispatch(e) => AppError::Dispatch(e),
            AccountError::Internal(e) => AppError::Internal(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::AlreadyExists
            | AppError::UnknownAccount
            | AppError::InvalidCredentials
            | AppError::InvalidOrExpiredToken
            | AppError::UpdateFailed
            | AppError::Signup(_) => StatusCode::BAD_REQUEST,
            AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Store(_) | AppError::Dispatch(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Signup(e) => {
                tracing::error!(error = %e, "signup failed");
                "Signup Error".to_string()
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                "Error: store unavailable".to_string()
            }
            AppError::Dispatch(e) => {
                tracing::error!(error = %e, "email dispatch failure");
                format!("Error: {}", e)
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "Error: internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "detail": detail }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
