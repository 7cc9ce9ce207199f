//! # Wallet Balance Reader
//!
//! Reads the native balance and every token account of a wallet through the
//! endpoint pool, producing the mint-keyed map the rest of the system works
//! from.
//!
//! The whole read is a single pass through one endpoint (the operation either
//! completes against one node or fails over wholesale), so a returned map is
//! never stitched together from two nodes' views. Zero-balance token accounts
//! are included on purpose: they are exactly the accounts worth closing for
//! rent.

use crate::rotation::RpcEndpointPool;
use async_trait::async_trait;
use lib_core::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_account_decoder::UiAccountData;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

/// Sentinel key for the native balance entry.
pub const NATIVE_KEY: &str = "SOL";

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// One wallet balance, keyed by mint in a [`BalanceMap`].
///
/// `amount` is the display amount and exists for the UI only. `raw_amount`
/// is the base-unit integer string and is the ONLY value transactions may be
/// built from; the float has already lost precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Display amount (float, lossy).
    pub amount: f64,
    /// Exact base-unit amount as a decimal string. Absent for the native entry.
    #[serde(rename = "rawAmount", skip_serializing_if = "Option::is_none")]
    pub raw_amount: Option<String>,
    /// Token account address holding this balance. Absent for the native entry.
    #[serde(rename = "tokenAccount", skip_serializing_if = "Option::is_none")]
    pub token_account: Option<String>,
}

/// Mint-keyed wallet balances, with the native entry under [`NATIVE_KEY`].
pub type BalanceMap = BTreeMap<String, BalanceEntry>;

/// Read all balances of `owner` through the endpoint pool.
///
/// Produces a fresh map on every call; callers replace their previous view
/// wholesale rather than patching it.
pub async fn read_balances(pool: &RpcEndpointPool, owner: &str) -> Result<BalanceMap> {
    let owner_pk = Pubkey::from_str(owner)
        .map_err(|e| AppError::InvalidInput(format!("Invalid owner address: {}", e)))?;

    let balances = pool
        .with_failover(|client| async move {
            let lamports = client
                .get_balance(&owner_pk)
                .await
                .map_err(|e| AppError::Rpc(format!("get_balance: {}", e)))?;

            let accounts = client
                .get_token_accounts_by_owner(
                    &owner_pk,
                    TokenAccountsFilter::ProgramId(spl_token::id()),
                )
                .await
                .map_err(|e| AppError::Rpc(format!("get_token_accounts_by_owner: {}", e)))?;

            let mut balances = BalanceMap::new();
            balances.insert(
                NATIVE_KEY.to_string(),
                BalanceEntry {
                    amount: lamports as f64 / LAMPORTS_PER_SOL,
                    raw_amount: None,
                    token_account: None,
                },
            );

            for keyed in accounts {
                if let Some((mint, entry)) = entry_from_account(&keyed.pubkey, &keyed.account.data)
                {
                    balances.insert(mint, entry);
                }
            }

            Ok(balances)
        })
        .await?;

    debug!("Read {} balance entries for {}", balances.len(), owner);
    Ok(balances)
}

/// Source of wallet balance snapshots.
///
/// The batch orchestrator refetches balances through this seam, so tests can
/// script wallet states without a node.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn read_balances(&self, owner: &str) -> Result<BalanceMap>;
}

/// [`BalanceSource`] backed by the real endpoint pool.
pub struct NodeBalanceSource {
    pool: std::sync::Arc<RpcEndpointPool>,
}

impl NodeBalanceSource {
    pub fn new(pool: std::sync::Arc<RpcEndpointPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BalanceSource for NodeBalanceSource {
    async fn read_balances(&self, owner: &str) -> Result<BalanceMap> {
        read_balances(&self.pool, owner).await
    }
}

/// Extract a `(mint, entry)` pair from one parsed token account.
///
/// Accounts the node fails to parse into the json shape are skipped rather
/// than failing the whole read.
fn entry_from_account(token_account: &str, data: &UiAccountData) -> Option<(String, BalanceEntry)> {
    let UiAccountData::Json(parsed) = data else {
        return None;
    };
    let info = parsed.parsed.get("info")?;
    let mint = info.get("mint")?.as_str()?.to_string();
    let token_amount = info.get("tokenAmount")?;

    let amount = token_amount
        .get("uiAmount")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let raw_amount = token_amount.get("amount")?.as_str()?.to_string();

    Some((
        mint,
        BalanceEntry {
            amount,
            raw_amount: Some(raw_amount),
            token_account: Some(token_account.to_string()),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_account_decoder::parse_account_data::ParsedAccount;
    use serde_json::json;

    fn parsed_token_account(mint: &str, ui_amount: Value, raw: &str) -> UiAccountData {
        UiAccountData::Json(ParsedAccount {
            program: "spl-token".to_string(),
            parsed: json!({
                "type": "account",
                "info": {
                    "mint": mint,
                    "owner": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
                    "tokenAmount": {
                        "uiAmount": ui_amount,
                        "amount": raw,
                        "decimals": 6,
                        "uiAmountString": "1.5"
                    }
                }
            }),
            space: 165,
        })
    }

    #[test]
    fn test_entry_keeps_raw_amount_as_string() {
        let data = parsed_token_account("MintA", json!(1.5), "1500000");
        let (mint, entry) = entry_from_account("AtaAddr", &data).unwrap();

        assert_eq!(mint, "MintA");
        assert_eq!(entry.amount, 1.5);
        assert_eq!(entry.raw_amount.as_deref(), Some("1500000"));
        assert_eq!(entry.token_account.as_deref(), Some("AtaAddr"));
    }

    #[test]
    fn test_entry_defaults_missing_ui_amount_to_zero() {
        // Nodes report null uiAmount for some zero-balance accounts
        let data = parsed_token_account("MintB", Value::Null, "0");
        let (_, entry) = entry_from_account("AtaAddr", &data).unwrap();

        assert_eq!(entry.amount, 0.0);
        assert_eq!(entry.raw_amount.as_deref(), Some("0"));
    }

    #[test]
    fn test_non_json_account_data_is_skipped() {
        let data = UiAccountData::LegacyBinary("AAAA".to_string());
        assert!(entry_from_account("AtaAddr", &data).is_none());
    }

    #[tokio::test]
    async fn test_invalid_owner_fails_before_any_attempt() {
        let pool = RpcEndpointPool::new(vec!["http://rpc-0.example:8899".to_string()]);
        let result = read_balances(&pool, "not-a-pubkey").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    #[ignore] // Requires RPC connection
    async fn test_read_balances_is_idempotent_without_chain_activity() {
        let pool = RpcEndpointPool::new(vec!["https://api.mainnet-beta.solana.com".to_string()]);
        let owner = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

        let first = read_balances(&pool, owner).await.unwrap();
        let second = read_balances(&pool, owner).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wire_shape_matches_ui_contract() {
        let entry = BalanceEntry {
            amount: 0.5,
            raw_amount: Some("500000".to_string()),
            token_account: Some("AtaAddr".to_string()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"amount": 0.5, "rawAmount": "500000", "tokenAccount": "AtaAddr"})
        );

        let native = BalanceEntry { amount: 1.0, raw_amount: None, token_account: None };
        assert_eq!(serde_json::to_value(&native).unwrap(), json!({"amount": 1.0}));
    }
}
