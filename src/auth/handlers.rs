//! Account HTTP handlers: signup, login, forgot password, reset password.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{ValidatedForm, ValidatedJson};
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::services::AccountError;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub data: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    let user = state
        .accounts()
        .signup(&body.name, &body.email, &body.password)
        .await
        .map_err(|e| match e {
            AccountError::Store(e) => AppError::Signup(e),
            other => other.into(),
        })?;

    Ok(Json(SignupResponse {
        message: "Successful".to_string(),
        data: UserInfo {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
        },
    }))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let access_token = state
        .accounts()
        .login(&body.email, &body.password)
        .await
        .map_err(|e| match e {
            AccountError::AccountNotFound => AppError::UnknownAccount,
            other => other.into(),
        })?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /forgotPassword
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts().forgot_password(&body.email).await?;
    Ok(MessageResponse::new("Password reset email sent successfully!"))
}

/// POST /reset-password (form fields `token`, `new_password`)
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<ResetPasswordForm>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .accounts()
        .reset_password(&form.token, &form.new_password)
        .await?;
    Ok(MessageResponse::new("Password has been reset successfully"))
}
