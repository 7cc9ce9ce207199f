//! # Balance Handler
//!
//! Serves the mint-keyed balance map the UI renders its tables from.

use axum::extract::State;
use axum::Json;
use lib_core::Result;
use lib_solana::balances::{read_balances, BalanceMap};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct BalancesRequest {
    /// Wallet address whose balances to read.
    pub user: String,
}

/// Read all balances of a wallet.
///
/// **Route**: `POST /api/balances`
///
/// Returns a map keyed by mint (native under `"SOL"`); each entry carries the
/// display amount, the exact base-unit amount and the token account address.
/// Zero-balance accounts are included — they feed the rent-reclaim table.
/// Also kicks off a background metadata refresh for the returned mints.
#[instrument(skip(state), fields(user = %payload.user))]
pub async fn get_balances(
    State(state): State<AppState>,
    Json(payload): Json<BalancesRequest>,
) -> Result<Json<BalanceMap>> {
    let balances = read_balances(&state.pool, &payload.user).await?;
    Arc::clone(&state.metadata).refresh_in_background(balances.keys().cloned().collect());
    Ok(Json(balances))
}
