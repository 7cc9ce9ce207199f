//! # Order Handler
//!
//! Proxies order creation to the quoting service.

use axum::extract::State;
use axum::Json;
use lib_core::Result;
use lib_solana::jupiter::{OrderResponse, UltraClient};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub user: String,
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    /// Base-unit amount as a decimal string, passed through verbatim.
    pub amount: String,
}

/// Create an unsigned swap order.
///
/// **Route**: `POST /api/order`
///
/// Returns `{transaction, requestId}`; the UI deserializes and signs the
/// transaction, then pairs the signed blob with the SAME `requestId` on
/// `/api/execute`. The amount field is a string end to end so base-unit
/// precision survives the trip.
#[instrument(skip(ultra), fields(input_mint = %payload.input_mint, amount = %payload.amount))]
pub async fn create_order(
    State(ultra): State<Arc<UltraClient>>,
    Json(payload): Json<OrderRequest>,
) -> Result<Json<OrderResponse>> {
    let order = ultra
        .create_order(
            &payload.user,
            &payload.input_mint,
            &payload.output_mint,
            &payload.amount,
        )
        .await?;
    Ok(Json(order))
}
