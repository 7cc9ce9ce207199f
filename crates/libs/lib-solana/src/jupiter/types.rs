//! # Ultra API Types
//!
//! Type definitions for the quoting/execution service responses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response to an order request: an unsigned transaction plus the request id
/// that must be sent back, unchanged, with the signed counterpart.
///
/// The pairing is positional, not content-addressed — the service will not
/// match a signed transaction against a different order's `request_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    /// Base64-encoded unsigned versioned transaction.
    pub transaction: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// Raw response of the execute endpoint.
#[derive(Debug, Deserialize)]
pub struct ExecuteResponse {
    /// `"Success"` is the only status that counts; anything else is failure.
    pub status: String,
    pub signature: Option<String>,
    pub code: Option<i64>,
    pub error: Option<String>,
}

/// One balance as reported by the provider's balances endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakerBalance {
    pub amount: f64,
}

/// Mint-keyed balances as reported by the provider.
pub type TakerBalances = HashMap<String, TakerBalance>;
