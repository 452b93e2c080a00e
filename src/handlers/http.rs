//! Shared state plus the root and health endpoints.

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::services::AccountService;

/// Shared application state: constructed once at startup, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
}

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Account service is up and running" }))
}

/// GET /health (liveness check)
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "accounts" })),
    )
}
