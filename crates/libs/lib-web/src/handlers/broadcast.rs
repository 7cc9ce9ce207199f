//! # Broadcast Handler
//!
//! Sends a locally-signed transaction straight to a node.

use axum::extract::State;
use axum::Json;
use lib_core::Result;
use lib_solana::broadcast::broadcast_transaction;
use lib_solana::rotation::RpcEndpointPool;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use super::execute::SignatureResponse;

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    /// Base64 signed transaction from the wallet.
    #[serde(rename = "signedTransaction")]
    pub signed_transaction: String,
}

/// Broadcast a signed transaction.
///
/// **Route**: `POST /api/broadcast`
///
/// Used for transactions built locally (account closes) that never touch the
/// quoting service. Node rejections surface as 502 once the endpoint pool is
/// exhausted.
#[instrument(skip(pool, payload))]
pub async fn broadcast(
    State(pool): State<Arc<RpcEndpointPool>>,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Json<SignatureResponse>> {
    let signature = broadcast_transaction(&pool, &payload.signed_transaction).await?;
    Ok(Json(SignatureResponse { signature }))
}
