//! # Batch Sweep Orchestrator
//!
//! Drives the sweep-all and close-all workflows: candidate selection, a
//! concurrent quote/build fan-out, ONE batched signing interaction, a
//! concurrent execute/broadcast fan-out, and per-item reconciliation.
//!
//! ## Per-item independence
//!
//! A batch looks atomic to the user but every item succeeds or fails on its
//! own. A failed quote drops that item and nothing else; a failed execution
//! marks that item and nothing else. Only two things abort a whole batch:
//! an empty candidate set (reported, not an error) and a signer that cannot
//! batch-sign (nothing has touched the network yet at that point).
//!
//! ## Positional integrity
//!
//! Each candidate becomes a [`BatchItem`] with an immutable `index` assigned
//! at selection time. The quote, signing and execution stages carry that
//! index instead of relying on array positions, so results can never be
//! attributed to the wrong token no matter which items drop out along the
//! way. Fan-out initiation follows index order; completion order is
//! unconstrained and irrelevant to reconciliation.
//!
//! ## Batch lifecycle
//!
//! ```text
//! Idle → CollectingCandidates → QuotingAll (parallel)
//!      → AwaitingSignature (single wallet interaction)
//!      → ExecutingAll (parallel) → Reconciling → Idle
//! ```
//!
//! Whatever happens inside the pipeline, balances are re-read afterwards so
//! the caller always sees the post-batch wallet state.

use crate::tx_log::{TransactionLog, TransactionLogEntry};
use futures_util::future::join_all;
use lib_core::{AppError, Result};
use lib_solana::balances::{BalanceMap, BalanceSource, NATIVE_KEY};
use lib_solana::broadcast::TransactionBroadcaster;
use lib_solana::codec::{decode_transaction, encode_transaction};
use lib_solana::jupiter::OrderProvider;
use lib_solana::metadata::TokenMetadataCache;
use lib_solana::signer::BatchSigner;
use solana_sdk::transaction::VersionedTransaction;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Batch state machine phases, surfaced in log breadcrumbs.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BatchPhase {
    CollectingCandidates,
    QuotingAll,
    AwaitingSignature,
    ExecutingAll,
    Reconciling,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchPhase::CollectingCandidates => "collecting-candidates",
            BatchPhase::QuotingAll => "quoting-all",
            BatchPhase::AwaitingSignature => "awaiting-signature",
            BatchPhase::ExecutingAll => "executing-all",
            BatchPhase::Reconciling => "reconciling",
        };
        f.write_str(name)
    }
}

/// How signed transactions of this batch reach the chain.
#[derive(Debug, Clone, Copy)]
enum Dispatch {
    /// Through the order service's execute endpoint (sweeps).
    Execute,
    /// Straight to a node (account closes).
    Broadcast,
}

/// Final outcome of one batch item.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Landed on chain with a confirmed signature.
    Confirmed { signature: String },
    /// Failed at some stage; siblings were unaffected.
    Failed { error: AppError },
}

/// One candidate flowing through a batch, bound to its immutable index.
#[derive(Debug)]
pub struct BatchItem {
    pub index: usize,
    pub mint: String,
    pub display_name: String,
    /// Base-unit amount string (sweep batches).
    pub raw_amount: Option<String>,
    /// Token account address (close batches).
    pub token_account: Option<String>,
    pub outcome: Option<ItemOutcome>,
}

/// An item that cleared the quote/build stage: its unsigned transaction and,
/// for order items, the request id that must travel with it.
struct PendingItem {
    index: usize,
    tx: VersionedTransaction,
    request_id: Option<String>,
}

/// Static sweep policy: the target token and the user's keep list.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Mint everything is swept into; never itself swept.
    pub target_mint: String,
    /// Mints the user flagged to keep.
    pub keep: HashSet<String>,
}

impl SweepConfig {
    pub fn new(target_mint: impl Into<String>) -> Self {
        Self { target_mint: target_mint.into(), keep: HashSet::new() }
    }

    /// The fixed exclusion set: native currency and the target token.
    fn is_excluded(&self, mint: &str) -> bool {
        mint == NATIVE_KEY || mint == self.target_mint
    }
}

/// Aggregate, best-effort summary of one batch.
#[derive(Debug)]
pub struct SweepReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Log entries appended by this batch, in item order.
    pub entries: Vec<TransactionLogEntry>,
    /// User-facing note: the nothing-to-do reason or the first item failure.
    pub message: Option<String>,
    pub items: Vec<BatchItem>,
    /// Wallet state re-read after the batch.
    pub balances: BalanceMap,
}

/// Pipeline output before the unconditional balance re-read.
struct BatchResult {
    attempted: usize,
    succeeded: usize,
    failed: usize,
    entries: Vec<TransactionLogEntry>,
    message: Option<String>,
    items: Vec<BatchItem>,
}

impl BatchResult {
    fn nothing_to_do(message: &str) -> Self {
        Self {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            entries: Vec::new(),
            message: Some(message.to_string()),
            items: Vec::new(),
        }
    }

    fn into_report(self, balances: BalanceMap) -> SweepReport {
        SweepReport {
            attempted: self.attempted,
            succeeded: self.succeeded,
            failed: self.failed,
            entries: self.entries,
            message: self.message,
            items: self.items,
            balances,
        }
    }
}

/// Coordinates the multi-item sweep and close-all workflows.
pub struct SweepOrchestrator {
    balances: Arc<dyn BalanceSource>,
    orders: Arc<dyn OrderProvider>,
    broadcaster: Arc<dyn TransactionBroadcaster>,
    signer: Arc<dyn BatchSigner>,
    metadata: Arc<TokenMetadataCache>,
    log: Arc<TransactionLog>,
    config: SweepConfig,
}

impl SweepOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        balances: Arc<dyn BalanceSource>,
        orders: Arc<dyn OrderProvider>,
        broadcaster: Arc<dyn TransactionBroadcaster>,
        signer: Arc<dyn BatchSigner>,
        metadata: Arc<TokenMetadataCache>,
        log: Arc<TransactionLog>,
        config: SweepConfig,
    ) -> Self {
        Self { balances, orders, broadcaster, signer, metadata, log, config }
    }

    /// Sweep every positive, non-excluded, non-kept balance into the target
    /// token.
    #[instrument(skip(self))]
    pub async fn sweep_all(&self) -> Result<SweepReport> {
        let owner = self.signer.address();
        let result = self.run_sweep(&owner, None).await;
        self.finalize(&owner, result).await
    }

    /// Sweep a single mint through the same pipeline.
    #[instrument(skip(self), fields(mint = %mint))]
    pub async fn sweep_one(&self, mint: &str) -> Result<SweepReport> {
        let owner = self.signer.address();
        let result = self.run_sweep(&owner, Some(mint)).await;
        self.finalize(&owner, result).await
    }

    /// Close every zero-balance, non-excluded token account and reclaim its
    /// rent.
    #[instrument(skip(self))]
    pub async fn close_all(&self) -> Result<SweepReport> {
        let owner = self.signer.address();
        let result = self.run_close(&owner, None).await;
        self.finalize(&owner, result).await
    }

    /// Close a single token account through the same pipeline.
    #[instrument(skip(self), fields(token_account = %token_account))]
    pub async fn close_one(&self, token_account: &str) -> Result<SweepReport> {
        let owner = self.signer.address();
        let result = self.run_close(&owner, Some(token_account)).await;
        self.finalize(&owner, result).await
    }

    /// Sweep pipeline: candidates → orders → batch-sign → execute → reconcile.
    async fn run_sweep(&self, owner: &str, only_mint: Option<&str>) -> Result<BatchResult> {
        debug!(phase = %BatchPhase::CollectingCandidates, "sweep batch starting");
        let balances = self.balances.read_balances(owner).await?;

        let mut items = Vec::new();
        for (mint, entry) in &balances {
            if self.config.is_excluded(mint) || self.config.keep.contains(mint) {
                continue;
            }
            if only_mint.is_some_and(|only| only != mint.as_str()) {
                continue;
            }
            let Some(raw_amount) = entry.raw_amount.as_deref() else {
                continue;
            };
            if !raw_amount_is_positive(raw_amount) {
                continue;
            }
            items.push(BatchItem {
                index: items.len(),
                mint: mint.clone(),
                display_name: self.metadata.display_name(mint).await,
                raw_amount: Some(raw_amount.to_string()),
                token_account: entry.token_account.clone(),
                outcome: None,
            });
        }

        if items.is_empty() {
            return Ok(BatchResult::nothing_to_do("No tokens to sweep (or all are kept)."));
        }

        debug!(phase = %BatchPhase::QuotingAll, candidates = items.len(), "requesting orders");
        let orders = join_all(items.iter().map(|item| {
            // raw_amount is always present on sweep items
            let raw_amount = item.raw_amount.clone().unwrap_or_default();
            async move {
                self.orders
                    .create_order(owner, &item.mint, &self.config.target_mint, &raw_amount)
                    .await
            }
        }))
        .await;

        let mut pending = Vec::new();
        for (item, order) in items.iter_mut().zip(orders) {
            let decoded = order.and_then(|order| {
                decode_transaction(&order.transaction).map(|tx| (tx, order.request_id))
            });
            match decoded {
                Ok((tx, request_id)) => pending.push(PendingItem {
                    index: item.index,
                    tx,
                    request_id: Some(request_id),
                }),
                Err(error) => {
                    warn!("Order for {} failed: {}", item.mint, error);
                    item.outcome = Some(ItemOutcome::Failed { error });
                }
            }
        }

        self.sign_and_dispatch(items, pending, Dispatch::Execute).await
    }

    /// Close pipeline: candidates → close transactions → batch-sign →
    /// broadcast → reconcile.
    async fn run_close(&self, owner: &str, only_account: Option<&str>) -> Result<BatchResult> {
        debug!(phase = %BatchPhase::CollectingCandidates, "close batch starting");
        let balances = self.balances.read_balances(owner).await?;

        let mut items = Vec::new();
        for (mint, entry) in &balances {
            if self.config.is_excluded(mint) {
                continue;
            }
            let Some(token_account) = entry.token_account.as_deref() else {
                continue;
            };
            if only_account.is_some_and(|only| only != token_account) {
                continue;
            }
            let zero = entry
                .raw_amount
                .as_deref()
                .is_some_and(|raw| raw.parse::<u128>() == Ok(0));
            if !zero {
                continue;
            }
            items.push(BatchItem {
                index: items.len(),
                mint: mint.clone(),
                display_name: self.metadata.display_name(mint).await,
                raw_amount: None,
                token_account: Some(token_account.to_string()),
                outcome: None,
            });
        }

        if items.is_empty() {
            return Ok(BatchResult::nothing_to_do("No closeable accounts."));
        }

        debug!(phase = %BatchPhase::QuotingAll, candidates = items.len(), "building close transactions");
        let built = join_all(items.iter().map(|item| {
            // token_account is always present on close items
            let token_account = item.token_account.clone().unwrap_or_default();
            async move {
                self.broadcaster
                    .build_close_transaction(owner, &token_account)
                    .await
            }
        }))
        .await;

        let mut pending = Vec::new();
        for (item, blob) in items.iter_mut().zip(built) {
            match blob.and_then(|blob| decode_transaction(&blob)) {
                Ok(tx) => pending.push(PendingItem { index: item.index, tx, request_id: None }),
                Err(error) => {
                    warn!("Close transaction for {} failed: {}", item.mint, error);
                    item.outcome = Some(ItemOutcome::Failed { error });
                }
            }
        }

        self.sign_and_dispatch(items, pending, Dispatch::Broadcast).await
    }

    /// One batched signing interaction, then the execution/broadcast fan-out
    /// with allSettled semantics, then reconciliation.
    async fn sign_and_dispatch(
        &self,
        mut items: Vec<BatchItem>,
        pending: Vec<PendingItem>,
        dispatch: Dispatch,
    ) -> Result<BatchResult> {
        if pending.is_empty() {
            // Every candidate already failed the quote/build stage
            return Ok(self.reconcile(items).await);
        }

        debug!(phase = %BatchPhase::AwaitingSignature, count = pending.len(), "requesting batch signature");
        let unsigned: Vec<VersionedTransaction> = pending.iter().map(|p| p.tx.clone()).collect();
        let signed = self.signer.sign_all(unsigned).await?;
        if signed.len() != pending.len() {
            return Err(AppError::WalletCapability(format!(
                "signer returned {} of {} transactions",
                signed.len(),
                pending.len()
            )));
        }

        debug!(phase = %BatchPhase::ExecutingAll, count = pending.len(), "dispatching signed transactions");
        let results = join_all(signed.iter().zip(pending.iter()).map(|(tx, item)| async move {
            let blob = encode_transaction(tx)?;
            match dispatch {
                Dispatch::Execute => {
                    let request_id = item.request_id.as_deref().ok_or_else(|| {
                        AppError::Internal("order item lost its request id".to_string())
                    })?;
                    self.orders.execute_order(&blob, request_id).await
                }
                Dispatch::Broadcast => self.broadcaster.broadcast(&blob).await,
            }
        }))
        .await;

        for (item, result) in pending.iter().zip(results) {
            items[item.index].outcome = Some(match result {
                Ok(signature) => ItemOutcome::Confirmed { signature },
                Err(error) => ItemOutcome::Failed { error },
            });
        }

        Ok(self.reconcile(items).await)
    }

    /// Aggregate per-item outcomes and append landed signatures to the log.
    async fn reconcile(&self, items: Vec<BatchItem>) -> BatchResult {
        debug!(phase = %BatchPhase::Reconciling, items = items.len(), "reconciling batch");

        let mut entries = Vec::new();
        let mut succeeded = 0;
        let mut failed = 0;
        let mut message = None;

        for item in &items {
            match &item.outcome {
                Some(ItemOutcome::Confirmed { signature }) => {
                    succeeded += 1;
                    let entry = TransactionLogEntry::new(
                        signature.clone(),
                        vec![item.display_name.clone()],
                    );
                    self.log.append(entry.clone()).await;
                    entries.push(entry);
                }
                Some(ItemOutcome::Failed { error }) => {
                    failed += 1;
                    // Operator log only; item failures never become batch failures
                    warn!("Batch item {} ({}) failed: {}", item.index, item.mint, error);
                    if message.is_none() {
                        message = Some(error.user_message());
                    }
                }
                None => {}
            }
        }

        BatchResult {
            attempted: items.len(),
            succeeded,
            failed,
            entries,
            message,
            items,
        }
    }

    /// Unconditional epilogue: re-read balances whether the pipeline
    /// succeeded or not, so the caller always sees post-batch state.
    async fn finalize(&self, owner: &str, result: Result<BatchResult>) -> Result<SweepReport> {
        let balances = match self.balances.read_balances(owner).await {
            Ok(balances) => balances,
            Err(e) => {
                warn!("Post-batch balance refresh failed: {}", e);
                BalanceMap::new()
            }
        };
        Arc::clone(&self.metadata).refresh_in_background(balances.keys().cloned().collect());

        match result {
            Ok(batch) => Ok(batch.into_report(balances)),
            Err(e) => Err(e),
        }
    }
}

/// Whether a base-unit amount string is a positive integer.
///
/// Amounts stay strings end to end; parsing here is only a positivity test,
/// never a conversion feeding a transaction.
fn raw_amount_is_positive(raw: &str) -> bool {
    raw.parse::<u128>().map(|v| v > 0).unwrap_or(false)
}
