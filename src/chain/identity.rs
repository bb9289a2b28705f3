//! Signing identity derived from a mnemonic.
//!
//! The identity authorizes extrinsics, signs arbitrary hashes and
//! authenticates the RMB peer against the relay. It is derived once per
//! invocation and never persisted.

// ZeroizeOnDrop's generated drop glue trips this lint on skipped fields
#![allow(unused_assignments)]

use bip39::Mnemonic as Bip39Mnemonic;
use sp_core::{
    crypto::{AccountId32, Ss58AddressFormat, Ss58Codec},
    sr25519, Pair,
};
use zeroize::ZeroizeOnDrop;

use crate::chain::signer::{verify_sr25519, TfchainSigner};
use crate::error::{Error, Result};

/// TFChain uses the generic substrate SS58 prefix
pub const TFCHAIN_SS58_FORMAT: u16 = 42;

/// An sr25519 identity.
///
/// `sr25519::Pair` does not implement `Zeroize`; only the copied public key
/// is wiped on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Identity {
    #[zeroize(skip)]
    pair: sr25519::Pair,
    public_key: [u8; 32],
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("ss58_address", &self.ss58_address())
            .finish()
    }
}

impl Identity {
    fn from_pair(pair: sr25519::Pair) -> Self {
        let public_key = pair.public().0;
        Self { pair, public_key }
    }

    /// Derive an identity from a BIP39 phrase or a substrate secret URI
    /// (`//Alice`, `0x<seed>`, `<phrase>//hard/soft`).
    ///
    /// # Example
    /// ```
    /// use tfgrid_vclient::chain::Identity;
    /// let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    /// let identity = Identity::from_phrase(phrase).unwrap();
    /// assert!(identity.ss58_address().starts_with('5'));
    /// ```
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(Error::identity("please provide mnemonics"));
        }

        validate_phrase(phrase)?;

        let pair = sr25519::Pair::from_string(phrase, None).map_err(|e| {
            Error::identity(format!(
                "failed to create identity from provided mnemonics: {:?}",
                e
            ))
        })?;

        Ok(Self::from_pair(pair))
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn account_id(&self) -> AccountId32 {
        AccountId32::from(self.public_key)
    }

    pub fn ss58_address(&self) -> String {
        self.pair
            .public()
            .to_ss58check_with_version(Ss58AddressFormat::custom(TFCHAIN_SS58_FORMAT))
    }

    /// Signer for submitting extrinsics
    pub fn signer(&self) -> TfchainSigner {
        TfchainSigner::new(self.pair.clone())
    }

    /// Sign a message; returns the raw 64-byte sr25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.pair.sign(message).0
    }

    /// Verify a signature against this identity's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        verify_with_public(message, signature, &self.public_key)
    }
}

/// Verify an sr25519 signature against a raw public key.
pub fn verify_with_public(message: &[u8], signature: &[u8], public_key: &[u8; 32]) -> bool {
    verify_sr25519(message, signature, public_key)
}

/// Check the phrase part of a secret URI against the BIP39 word list.
/// Dev URIs (`//Alice`) and raw hex seeds carry no phrase.
fn validate_phrase(uri: &str) -> Result<()> {
    let phrase = match uri.find('/') {
        Some(idx) => &uri[..idx],
        None => uri,
    };

    if phrase.is_empty() || phrase.starts_with("0x") {
        return Ok(());
    }

    let normalized = phrase.trim().to_lowercase();
    Bip39Mnemonic::parse_normalized(&normalized)
        .map(|_| ())
        .map_err(|e| Error::identity(format!("invalid mnemonic phrase: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_from_phrase_is_deterministic() {
        let a = Identity::from_phrase(PHRASE).unwrap();
        let b = Identity::from_phrase(PHRASE).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.ss58_address(), b.ss58_address());
    }

    #[test]
    fn test_empty_phrase() {
        let err = Identity::from_phrase("   ").unwrap_err();
        assert!(matches!(err, Error::Identity(_)));
    }

    #[test]
    fn test_malformed_phrase() {
        let err = Identity::from_phrase("not a real mnemonic at all").unwrap_err();
        assert!(matches!(err, Error::Identity(_)));
    }

    #[test]
    fn test_dev_uri() {
        let alice = Identity::from_phrase("//Alice").unwrap();
        assert_eq!(
            alice.ss58_address(),
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        );
    }

    #[test]
    fn test_derivation_path_changes_key() {
        let root = Identity::from_phrase(PHRASE).unwrap();
        let derived = Identity::from_phrase(&format!("{}//0", PHRASE)).unwrap();
        assert_ne!(root.public_key(), derived.public_key());
    }

    #[test]
    fn test_sign_and_verify() {
        let identity = Identity::from_phrase(PHRASE).unwrap();
        let message = b"deployment hash";
        let sig = identity.sign(message);
        assert!(identity.verify(message, &sig));
        assert!(!identity.verify(b"other", &sig));
        assert!(!identity.verify(message, &sig[..32]));
    }

    #[test]
    fn test_signer_account() {
        let identity = Identity::from_phrase("//Bob").unwrap();
        assert_eq!(identity.signer().account_id().0, *identity.public_key());
        assert_eq!(identity.account_id(), AccountId32::from(*identity.public_key()));
    }

    #[test]
    fn test_debug_hides_secret() {
        let identity = Identity::from_phrase(PHRASE).unwrap();
        let debug = format!("{:?}", identity);
        assert!(!debug.contains("abandon"));
        assert!(debug.contains("ss58_address"));
    }
}
