//! User account service: signup, login, forgot password and password reset
//! over a pooled credential store, with stateless HS256 tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod handlers;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{AccountService, AccountSettings};

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use handlers::http;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", get(http::root))
        .route("/health", get(http::health))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/forgotPassword", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bound every request by `timeout`. An elapsed request answers 408 with the
/// same `{detail}` body as every other failure.
pub fn with_request_timeout(app: axum::Router, timeout: Duration) -> axum::Router {
    app.layer(TimeoutLayer::new(timeout))
        .layer(middleware::map_response(timeout_detail))
}

async fn timeout_detail(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        AppError::Timeout.into_response()
    } else {
        response
    }
}
