//! # Sweep Utility
//!
//! This binary sweeps every eligible token balance of the operator wallet
//! into the target token, and can close emptied token accounts to reclaim
//! their rent.
//!
//! **WARNING**: Sweeps are irreversible on-chain swaps.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package sweep-cli --bin sweep_cli -- sweep   # swap all balances
//! cargo run --package sweep-cli --bin sweep_cli -- close   # close empty accounts
//! ```
//!
//! Environment:
//! - `SOLANA_RPC_URLS` — comma-separated node endpoints
//! - `SWEEP_KEYPAIR_PATH` — operator keypair file
//! - `TARGET_MINT` — token to sweep into (defaults to JUP)
//! - `SWEEP_KEEP_MINTS` — comma-separated mints to keep
//!
//! The program will:
//! 1. Read the wallet's balances
//! 2. Show what would be swept or closed
//! 3. Ask for confirmation
//! 4. Run the batch and report per-item results

use lib_core::Config;
use lib_solana::balances::{BalanceSource, NodeBalanceSource};
use lib_solana::broadcast::NodeBroadcaster;
use lib_solana::jupiter::UltraClient;
use lib_solana::metadata::TokenMetadataCache;
use lib_solana::rotation::RpcEndpointPool;
use lib_solana::signer::{BatchSigner, LocalKeypairSigner};
use lib_utils::get_env_list;
use lib_web::services::sweep::{SweepConfig, SweepOrchestrator, SweepReport};
use lib_web::tx_log::TransactionLog;
use std::io::{self, Write};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "sweep".to_string());
    if mode != "sweep" && mode != "close" {
        eprintln!("Usage: sweep_cli [sweep|close]");
        std::process::exit(2);
    }

    println!("============================================");
    println!("  Sweep Utility ({})", mode);
    println!("============================================");
    println!();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    if config.rpc_urls.is_empty() {
        anyhow::bail!("SOLANA_RPC_URLS must list at least one endpoint");
    }

    let pool = Arc::new(RpcEndpointPool::new(config.rpc_urls.clone()));
    let signer = Arc::new(LocalKeypairSigner::from_env()?);
    let owner = signer.address();

    let mut sweep_config = SweepConfig::new(config.target_mint.clone());
    sweep_config.keep = get_env_list("SWEEP_KEEP_MINTS").into_iter().collect();

    println!("Wallet:  {}", owner);
    println!("Target:  {}", config.target_mint);
    if !sweep_config.keep.is_empty() {
        println!("Keeping: {} mint(s)", sweep_config.keep.len());
    }
    println!();

    // Preview the wallet before asking for confirmation
    println!("Reading balances...");
    let balances = Arc::new(NodeBalanceSource::new(Arc::clone(&pool)));
    let snapshot = balances.read_balances(&owner).await?;
    let positive = snapshot
        .values()
        .filter(|e| e.raw_amount.as_deref().is_some_and(|r| r.parse::<u128>().map(|v| v > 0).unwrap_or(false)))
        .count();
    let empty = snapshot
        .values()
        .filter(|e| e.token_account.is_some() && e.raw_amount.as_deref() == Some("0"))
        .count();
    println!(
        "Found {} token balance(s): {} with funds, {} empty account(s).",
        snapshot.len().saturating_sub(1),
        positive,
        empty
    );
    println!();

    if mode == "sweep" {
        println!("WARNING: Sweeping swaps every eligible balance into the target token.");
    } else {
        println!("Closing reclaims rent from every empty token account.");
    }
    print!("Proceed? (yes/no): ");
    io::stdout().flush()?;

    let mut confirmation = String::new();
    io::stdin().read_line(&mut confirmation)?;
    let confirmation = confirmation.trim().to_lowercase();
    if confirmation != "yes" && confirmation != "y" {
        println!("Operation cancelled.");
        return Ok(());
    }
    println!();

    let ultra = Arc::new(UltraClient::new(config.ultra_api_base.clone())?);
    let metadata = Arc::new(TokenMetadataCache::new(config.token_api_base.clone())?);
    let tx_log = Arc::new(TransactionLog::new());

    let orchestrator = SweepOrchestrator::new(
        balances,
        ultra,
        Arc::new(NodeBroadcaster::new(Arc::clone(&pool))),
        signer,
        metadata,
        Arc::clone(&tx_log),
        sweep_config,
    );

    let report = if mode == "sweep" {
        println!("Sweeping...");
        orchestrator.sweep_all().await?
    } else {
        println!("Closing accounts...");
        orchestrator.close_all().await?
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &SweepReport) {
    println!();
    println!(
        "Batch finished: {} attempted, {} landed, {} failed.",
        report.attempted, report.succeeded, report.failed
    );
    if let Some(message) = &report.message {
        println!("Note: {}", message);
    }
    for entry in &report.entries {
        println!("  {}  ({})", entry.signature, entry.tokens.join(", "));
    }
}
