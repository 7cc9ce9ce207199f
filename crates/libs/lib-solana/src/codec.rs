//! # Transaction Wire Codec
//!
//! Versioned transactions travel between the UI, the quoting service and the
//! node as base64-wrapped bincode. Both directions live here so every module
//! agrees on the framing.

use lib_core::{AppError, Result};
use lib_utils::b64::{b64_decode, b64_encode};
use solana_sdk::transaction::VersionedTransaction;

/// Decode a base64 blob into a versioned transaction.
pub fn decode_transaction(blob: &str) -> Result<VersionedTransaction> {
    let bytes = b64_decode(blob)
        .map_err(|_| AppError::Decoding("transaction blob is not valid base64".to_string()))?;
    bincode::deserialize(&bytes)
        .map_err(|e| AppError::Decoding(format!("transaction blob did not deserialize: {}", e)))
}

/// Encode a versioned transaction as a base64 blob.
pub fn encode_transaction(tx: &VersionedTransaction) -> Result<String> {
    let bytes = bincode::serialize(tx)
        .map_err(|e| AppError::Internal(format!("transaction did not serialize: {}", e)))?;
    Ok(b64_encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::message::{v0, VersionedMessage};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Signature;

    fn unsigned_tx(payer: Pubkey) -> VersionedTransaction {
        let message = v0::Message::try_compile(&payer, &[], &[], Hash::default()).unwrap();
        VersionedTransaction {
            signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
            message: VersionedMessage::V0(message),
        }
    }

    #[test]
    fn test_round_trip() {
        let tx = unsigned_tx(Pubkey::new_unique());
        let blob = encode_transaction(&tx).unwrap();
        let back = decode_transaction(&blob).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(matches!(
            decode_transaction("@@not-base64@@"),
            Err(AppError::Decoding(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_bytes() {
        let blob = lib_utils::b64_encode([0u8; 3]);
        assert!(matches!(
            decode_transaction(&blob),
            Err(AppError::Decoding(_))
        ));
    }
}
