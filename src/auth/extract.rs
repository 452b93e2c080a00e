//! Request extractors that deserialize and validate in one step.
//!
//! Any rejection, whether malformed body, unknown field or failed rule, becomes
//! [`AppError::Validation`] so it answers 400 with a `detail` message.

use axum::{
    extract::{FromRequest, Request},
    Form, Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Field names and rule codes only. `ValidationErrors`' own `Display` echoes the
/// rejected value, which for password fields is the password itself.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .map(|(field, errs)| {
            let rules: Vec<&str> = errs
                .iter()
                .map(|err| err.message.as_deref().unwrap_or(&err.code))
                .collect();
            format!("{}: {}", field, rules.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// JSON body validated with `validator` after deserialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::Validation(describe(&e)))?;
        Ok(ValidatedJson(value))
    }
}

/// `application/x-www-form-urlencoded` body validated like [`ValidatedJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedForm<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::Validation(describe(&e)))?;
        Ok(ValidatedForm(value))
    }
}
