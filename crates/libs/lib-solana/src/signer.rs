//! # Batch Signing Seam
//!
//! The orchestrator signs a whole batch in ONE signer interaction — one
//! wallet prompt for a browser wallet, one pass over a local keypair for the
//! operator CLI. A signer that cannot batch-sign rejects the entire batch
//! before any network call is made.

use async_trait::async_trait;
use lib_core::{AppError, Result};
use solana_sdk::signer::Signer;
use solana_sdk::signer::keypair::{read_keypair_file, Keypair};
use solana_sdk::transaction::VersionedTransaction;

/// Environment variable holding the path of the operator keypair file.
pub const KEYPAIR_PATH_ENV: &str = "SWEEP_KEYPAIR_PATH";

/// A wallet able to sign a list of transactions in a single interaction.
#[async_trait]
pub trait BatchSigner: Send + Sync {
    /// The wallet address whose balances are being swept.
    fn address(&self) -> String;

    /// Sign all transactions at once, preserving order.
    ///
    /// Returns [`AppError::WalletCapability`] if the signer cannot sign the
    /// batch in one interaction.
    async fn sign_all(&self, txs: Vec<VersionedTransaction>) -> Result<Vec<VersionedTransaction>>;
}

/// [`BatchSigner`] over a locally-held keypair, used by the operator CLI.
pub struct LocalKeypairSigner {
    keypair: Keypair,
}

impl LocalKeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Load the keypair named by `SWEEP_KEYPAIR_PATH`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(KEYPAIR_PATH_ENV)
            .map_err(|_| AppError::Config(format!("{} must be set", KEYPAIR_PATH_ENV)))?;
        let keypair = read_keypair_file(&path)
            .map_err(|e| AppError::Config(format!("could not read keypair {}: {}", path, e)))?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl BatchSigner for LocalKeypairSigner {
    fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    async fn sign_all(&self, txs: Vec<VersionedTransaction>) -> Result<Vec<VersionedTransaction>> {
        txs.into_iter()
            .map(|tx| {
                VersionedTransaction::try_new(tx.message, &[&self.keypair])
                    .map_err(|e| AppError::Internal(format!("signing failed: {}", e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::message::{v0, VersionedMessage};
    use solana_sdk::signature::Signature;

    fn unsigned_tx(payer: &Keypair) -> VersionedTransaction {
        let message = v0::Message::try_compile(&payer.pubkey(), &[], &[], Hash::default()).unwrap();
        VersionedTransaction {
            signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
            message: VersionedMessage::V0(message),
        }
    }

    #[tokio::test]
    async fn test_sign_all_preserves_order_and_fills_signatures() {
        let keypair = Keypair::new();
        let signer = LocalKeypairSigner::new(keypair);

        let txs = vec![unsigned_tx(&signer.keypair), unsigned_tx(&signer.keypair)];
        let signed = signer.sign_all(txs).await.unwrap();

        assert_eq!(signed.len(), 2);
        for tx in &signed {
            assert!(tx.signatures.iter().all(|s| *s != Signature::default()));
        }
    }

    #[tokio::test]
    async fn test_address_matches_keypair() {
        let keypair = Keypair::new();
        let expected = keypair.pubkey().to_string();
        let signer = LocalKeypairSigner::new(keypair);
        assert_eq!(signer.address(), expected);
    }
}
