//! Extrinsic signing for TFChain.
//!
//! TFChain uses the default Polkadot extrinsic parameters, so the signer
//! targets subxt's `PolkadotConfig` and produces `MultiSignature::Sr25519`.

use sp_core::{sr25519, Pair};
use sp_runtime::traits::Verify;
use subxt::{
    config::substrate::{AccountId32, MultiSignature},
    tx::Signer,
    PolkadotConfig,
};

/// Signs extrinsics with an identity's sr25519 key
#[derive(Clone)]
pub struct TfchainSigner {
    account_id: AccountId32,
    pair: sr25519::Pair,
}

impl TfchainSigner {
    pub fn new(pair: sr25519::Pair) -> Self {
        Self {
            account_id: AccountId32(pair.public().0),
            pair,
        }
    }

    pub fn account_id(&self) -> &AccountId32 {
        &self.account_id
    }
}

impl Signer<PolkadotConfig> for TfchainSigner {
    fn account_id(&self) -> AccountId32 {
        self.account_id.clone()
    }

    fn sign(&self, signer_payload: &[u8]) -> MultiSignature {
        MultiSignature::Sr25519(self.pair.sign(signer_payload).0)
    }
}

/// Check a raw sr25519 signature the way the runtime checks extrinsic
/// signatures.
pub fn verify_sr25519(message: &[u8], signature: &[u8], public_key: &[u8; 32]) -> bool {
    let Ok(raw) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let signature = sp_runtime::MultiSignature::Sr25519(sr25519::Signature::from_raw(raw));
    let signer = sp_runtime::AccountId32::new(*public_key);
    signature.verify(message, &signer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_account_matches_public_key() {
        let pair = sr25519::Pair::from_string("//Alice", None).unwrap();
        let signer = TfchainSigner::new(pair.clone());
        assert_eq!(signer.account_id().0, pair.public().0);
    }

    #[test]
    fn test_extrinsic_signature_verifies() {
        let pair = sr25519::Pair::from_string("//Bob", None).unwrap();
        let signer = TfchainSigner::new(pair.clone());
        let payload = b"signer payload";

        let MultiSignature::Sr25519(raw) = Signer::<PolkadotConfig>::sign(&signer, payload) else {
            panic!("expected an sr25519 signature");
        };
        assert!(verify_sr25519(payload, &raw, &pair.public().0));
        assert!(!verify_sr25519(b"other payload", &raw, &pair.public().0));
    }
}
