//! # Execute Handler
//!
//! Submits a signed order to the execution service.

use axum::extract::State;
use axum::Json;
use lib_core::Result;
use lib_solana::jupiter::UltraClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    /// Base64 signed transaction from the wallet.
    #[serde(rename = "signedTransaction")]
    pub signed_transaction: String,
    /// Request id issued with the order this transaction signs.
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct SignatureResponse {
    pub signature: String,
}

/// Execute a signed order.
///
/// **Route**: `POST /api/execute`
///
/// On success the swap has landed on chain and `{signature}` identifies it.
/// A confirmed provider failure comes back as 502 with the provider's
/// code/message; a transport failure comes back as an ambiguous-outcome
/// error, because the order may have been consumed — the UI must not retry
/// it blindly.
#[instrument(skip(ultra, payload), fields(request_id = %payload.request_id))]
pub async fn execute_order(
    State(ultra): State<Arc<UltraClient>>,
    Json(payload): Json<ExecuteRequest>,
) -> Result<Json<SignatureResponse>> {
    let signature = ultra
        .execute_order(&payload.signed_transaction, &payload.request_id)
        .await?;
    Ok(Json(SignatureResponse { signature }))
}
