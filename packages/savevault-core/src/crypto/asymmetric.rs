//! # Asymmetric Key Wrapping
//!
//! RSA key pair and the cipher that wraps short secrets with it.
//!
//! ## Wrap Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KEY WRAPPING                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  wrap_small()                                                          │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  AES key (32 bytes) or IV (12 bytes)                         │       │
//! │  │           ↓                                                  │       │
//! │  │  RSA encrypt with PUBLIC component                           │       │
//! │  │  (RSAES-OAEP, SHA-256 digest and MGF1)                       │       │
//! │  │           ↓                                                  │       │
//! │  │  Wrapped bytes (modulus length, 256 bytes at 2048 bits)      │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  unwrap_small()                                                        │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  Wrapped bytes                                               │       │
//! │  │           ↓                                                  │       │
//! │  │  RSA decrypt with PRIVATE component (blinded)                │       │
//! │  │           ↓                                                  │       │
//! │  │  Original secret, or CryptoFailure                           │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Capacity
//!
//! OAEP with SHA-256 consumes 66 bytes of the modulus, so a 2048-bit key wraps
//! at most 190 bytes. Only symmetric keys and IVs go through here, never the
//! payload itself.
//!
//! PKCS#1 v1.5 encryption padding is not offered. It has no chosen-ciphertext
//! security, and records from the CBC-based format could not be read here
//! anyway.

use std::fmt;

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Bytes OAEP with SHA-256 consumes (2 * hash length + 2)
const OAEP_SHA256_OVERHEAD: usize = 2 * 32 + 2;

/// RSA key pair owned by the key store
///
/// Built once at generate or load time and never mutated afterwards. The
/// public component is always derived from, or checked against, the private
/// component so the two cannot drift apart.
#[derive(Clone)]
pub struct AsymmetricKeyPair {
    public: RsaPublicKey,
    private: RsaPrivateKey,
}

impl AsymmetricKeyPair {
    /// Generate a new random key pair with a modulus of `bits` bits
    ///
    /// Uses the operating system's secure random number generator.
    pub fn generate(bits: usize) -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| Error::KeyGenerationFailed(e.to_string()))?;
        Ok(Self::from_private(private))
    }

    /// Build a key pair from its private component
    pub fn from_private(private: RsaPrivateKey) -> Self {
        let public = private.to_public_key();
        Self { public, private }
    }

    /// Build a key pair from separately stored components
    ///
    /// Fails with `InvalidKey` when the public modulus or exponent differ
    /// from the private component's.
    pub fn from_parts(public: RsaPublicKey, private: RsaPrivateKey) -> Result<Self> {
        if public.n() != private.n() {
            return Err(Error::InvalidKey(
                "Public modulus does not match private modulus".into(),
            ));
        }
        if public.e() != private.e() {
            return Err(Error::InvalidKey(
                "Public exponent does not match private exponent".into(),
            ));
        }
        Ok(Self { public, private })
    }

    /// The public component (wraps)
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// The private component (unwraps)
    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Modulus length in bytes
    pub fn modulus_len(&self) -> usize {
        self.public.size()
    }

    /// Modulus length in bits
    pub fn modulus_bits(&self) -> usize {
        self.public.n().bits()
    }

    /// Short identifier for logs: SHA-256 over modulus and exponent
    ///
    /// Safe to print. Reveals nothing beyond the public component.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.public.n().to_bytes_be());
        hasher.update(self.public.e().to_bytes_be());
        hex::encode(&hasher.finalize()[..16])
    }
}

impl PartialEq for AsymmetricKeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public && self.private == other.private
    }
}

impl Eq for AsymmetricKeyPair {}

impl fmt::Debug for AsymmetricKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsymmetricKeyPair")
            .field("bits", &self.modulus_bits())
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

/// Wraps and unwraps short secrets with an RSA key pair using OAEP-SHA256
#[derive(Debug, Clone, Copy, Default)]
pub struct AsymmetricCipher;

impl AsymmetricCipher {
    /// Create a cipher
    pub fn new() -> Self {
        Self
    }

    /// Largest input `wrap_small` accepts for this public key
    pub fn max_wrap_len(&self, public: &RsaPublicKey) -> usize {
        public.size().saturating_sub(OAEP_SHA256_OVERHEAD)
    }

    /// Encrypt a short secret with the public component
    ///
    /// ## Errors
    ///
    /// Returns `EncryptionFailed` if `plain` exceeds [`Self::max_wrap_len`].
    pub fn wrap_small(&self, plain: &[u8], public: &RsaPublicKey) -> Result<Vec<u8>> {
        let max = self.max_wrap_len(public);
        if plain.len() > max {
            return Err(Error::EncryptionFailed(format!(
                "{} bytes exceeds the {} byte wrap capacity",
                plain.len(),
                max
            )));
        }

        public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plain)
            .map_err(|e| Error::EncryptionFailed(format!("RSA wrap failed: {}", e)))
    }

    /// Decrypt a wrapped secret with the private component
    ///
    /// ## Errors
    ///
    /// Returns `CryptoFailure` if the bytes were not produced by the matching
    /// public component. The message is the same for every cause.
    pub fn unwrap_small(&self, wrapped: &[u8], private: &RsaPrivateKey) -> Result<Vec<u8>> {
        private
            .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), wrapped)
            .map_err(|_| Error::CryptoFailure("Unable to unwrap key material".into()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing::{other_key_pair, test_key_pair};

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let keys = test_key_pair();
        let cipher = AsymmetricCipher::new();

        for secret in [&[7u8; 32][..], &[9u8; 12][..]] {
            let wrapped = cipher.wrap_small(secret, keys.public_key()).unwrap();

            assert_eq!(wrapped.len(), keys.modulus_len());
            let unwrapped = cipher.unwrap_small(&wrapped, keys.private_key()).unwrap();
            assert_eq!(unwrapped, secret);
        }
    }

    #[test]
    fn test_wrap_is_randomized() {
        let keys = test_key_pair();
        let cipher = AsymmetricCipher::default();

        let first = cipher.wrap_small(b"iv-bytes", keys.public_key()).unwrap();
        let second = cipher.wrap_small(b"iv-bytes", keys.public_key()).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_unwrap_with_wrong_key_fails() {
        let keys = test_key_pair();
        let other = other_key_pair();
        let cipher = AsymmetricCipher::default();

        let wrapped = cipher.wrap_small(&[1u8; 32], keys.public_key()).unwrap();
        let result = cipher.unwrap_small(&wrapped, other.private_key());

        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_unwrap_tampered_fails() {
        let keys = test_key_pair();
        let cipher = AsymmetricCipher::default();

        let mut wrapped = cipher.wrap_small(&[1u8; 32], keys.public_key()).unwrap();
        wrapped[10] ^= 0x01;

        let result = cipher.unwrap_small(&wrapped, keys.private_key());
        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_unwrap_garbage_length_fails() {
        let keys = test_key_pair();
        let cipher = AsymmetricCipher::default();

        let result = cipher.unwrap_small(&[0u8; 5], keys.private_key());
        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_oversized_input_rejected() {
        let keys = test_key_pair();
        let cipher = AsymmetricCipher::new();
        let max = cipher.max_wrap_len(keys.public_key());

        assert_eq!(max, keys.modulus_len() - 66);
        let fits = vec![0u8; max];
        assert!(cipher.wrap_small(&fits, keys.public_key()).is_ok());

        let result = cipher.wrap_small(&vec![0u8; max + 1], keys.public_key());
        assert!(matches!(result, Err(Error::EncryptionFailed(_))));
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        let keys = test_key_pair();
        let other = other_key_pair();

        let result =
            AsymmetricKeyPair::from_parts(other.public_key().clone(), keys.private_key().clone());
        assert!(matches!(result, Err(Error::InvalidKey(_))));

        let rebuilt =
            AsymmetricKeyPair::from_parts(keys.public_key().clone(), keys.private_key().clone())
                .unwrap();
        assert_eq!(&rebuilt, keys);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let keys = test_key_pair();
        let other = other_key_pair();

        assert_eq!(keys.fingerprint(), keys.clone().fingerprint());
        assert_eq!(keys.fingerprint().len(), 32);
        assert_ne!(keys.fingerprint(), other.fingerprint());
    }

    #[test]
    fn test_debug_hides_private_material() {
        let keys = test_key_pair();
        let debug = format!("{:?}", keys);

        assert!(debug.contains("fingerprint"));
        assert!(!debug.contains("primes"));
    }
}
