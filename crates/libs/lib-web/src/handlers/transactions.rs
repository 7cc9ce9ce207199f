//! # Transaction Log Handlers
//!
//! Session transaction history: list for display, clear on user request.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::tx_log::{TransactionLog, TransactionLogEntry};

/// List the session transaction log, oldest first.
///
/// **Route**: `GET /api/transactions`
pub async fn list(State(log): State<Arc<TransactionLog>>) -> Json<Vec<TransactionLogEntry>> {
    Json(log.snapshot().await)
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

/// Clear the session transaction log.
///
/// **Route**: `POST /api/transactions/clear`
pub async fn clear(State(log): State<Arc<TransactionLog>>) -> Json<ClearResponse> {
    Json(ClearResponse { cleared: log.clear().await })
}
