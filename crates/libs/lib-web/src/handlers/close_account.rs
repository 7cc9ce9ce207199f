//! # Close-Account Handler
//!
//! Builds the unsigned transaction that closes an emptied token account.

use axum::extract::State;
use axum::Json;
use lib_core::Result;
use lib_solana::close_account::build_close_account_transaction;
use lib_solana::rotation::RpcEndpointPool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct CloseAccountRequest {
    /// Wallet that owns the account and receives the rent.
    pub user: String,
    /// Token account to close.
    #[serde(rename = "tokenAccount")]
    pub token_account: String,
}

#[derive(Debug, Serialize)]
pub struct CloseAccountResponse {
    /// Base64 unsigned close transaction for the wallet to sign.
    pub transaction: String,
}

/// Build an unsigned close-account transaction.
///
/// **Route**: `POST /api/close-account`
///
/// The wallet signs the returned blob and hands it to `/api/broadcast`.
#[instrument(skip(pool), fields(token_account = %payload.token_account))]
pub async fn build_close_account(
    State(pool): State<Arc<RpcEndpointPool>>,
    Json(payload): Json<CloseAccountRequest>,
) -> Result<Json<CloseAccountResponse>> {
    let transaction =
        build_close_account_transaction(&pool, &payload.user, &payload.token_account).await?;
    Ok(Json(CloseAccountResponse { transaction }))
}
