//! # Symmetric Payload Encryption
//!
//! AES-256-GCM over the whole save payload, keyed by a one-time secret.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SymmetricSecret::generate()  (manager, once per save)                 │
//! │           ↓                                                             │
//! │  SymmetricCipher::new(&secret)                                          │
//! │           ↓                                                             │
//! │  AES-256-GCM(key, iv, payload, associated_data)                         │
//! │           ↓                                                             │
//! │  Ciphertext + 16-byte Auth Tag                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cipher never generates its own key or IV. Keeping generation in the
//! manager means every secret is visibly created fresh at the call site.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// One-time key and IV for a single save
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a secret for two saves.** An IV repeated under the same key
/// breaks GCM confidentiality and lets an attacker forge records. Generate a
/// new secret for every save and let it drop (and zeroize) afterwards.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricSecret {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl SymmetricSecret {
    /// Generate a uniformly random key and IV
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        let mut iv = [0u8; IV_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut key);
        rand::rngs::OsRng.fill_bytes(&mut iv);
        Self { key, iv }
    }

    /// Rebuild a secret from unwrapped key and IV bytes
    ///
    /// Wrong lengths mean the wrapped fields were not produced by a save, so
    /// they fail as `CryptoFailure`.
    pub fn from_parts(key: &[u8], iv: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| Error::CryptoFailure("Unwrapped key has the wrong length".into()))?;
        let iv: [u8; IV_SIZE] = iv
            .try_into()
            .map_err(|_| Error::CryptoFailure("Unwrapped IV has the wrong length".into()))?;
        Ok(Self { key, iv })
    }

    /// Raw key bytes (for wrapping only)
    pub fn key_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Raw IV bytes (for wrapping only)
    pub fn iv_bytes(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }
}

/// AES-256-GCM cipher bound to one key and IV
pub struct SymmetricCipher {
    cipher: Aes256Gcm,
    iv: [u8; IV_SIZE],
}

impl SymmetricCipher {
    /// Create a cipher from an explicit secret
    pub fn new(secret: &SymmetricSecret) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&secret.key)),
            iv: secret.iv,
        }
    }

    /// Encrypt `plaintext`, authenticating `aad` alongside it
    ///
    /// Output is `plaintext.len() + TAG_SIZE` bytes.
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let payload = Payload {
            msg: plaintext,
            aad,
        };

        self.cipher
            .encrypt(AesNonce::from_slice(&self.iv), payload)
            .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))
    }

    /// Decrypt `ciphertext`, verifying the tag over it and `aad`
    ///
    /// ## Errors
    ///
    /// Returns `CryptoFailure` if:
    /// - The ciphertext was tampered with
    /// - The AAD doesn't match
    /// - The key or IV is wrong
    pub fn decrypt(&self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < TAG_SIZE {
            return Err(Error::CryptoFailure("Ciphertext shorter than its tag".into()));
        }

        let payload = Payload {
            msg: ciphertext,
            aad,
        };

        self.cipher
            .decrypt(AesNonce::from_slice(&self.iv), payload)
            .map_err(|_| Error::CryptoFailure("Authentication tag mismatch".into()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_secret(byte: u8) -> SymmetricSecret {
        SymmetricSecret::from_parts(&[byte; KEY_SIZE], &[byte; IV_SIZE]).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_basic() {
        let cipher = SymmetricCipher::new(&fixed_secret(42));

        let ciphertext = cipher.encrypt(b"Hello, World!", b"context").unwrap();
        let decrypted = cipher.decrypt(&ciphertext, b"context").unwrap();

        assert_eq!(decrypted, b"Hello, World!");
        assert_eq!(ciphertext.len(), 13 + TAG_SIZE);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let cipher = SymmetricCipher::new(&fixed_secret(42));

        let ciphertext = cipher.encrypt(b"", b"").unwrap();
        assert_eq!(ciphertext.len(), TAG_SIZE);

        let decrypted = cipher.decrypt(&ciphertext, b"").unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = SymmetricCipher::new(&fixed_secret(42));
        let mut ciphertext = cipher.encrypt(b"Hello, World!", b"context").unwrap();

        ciphertext[0] ^= 0xFF;

        let result = cipher.decrypt(&ciphertext, b"context");
        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let cipher = SymmetricCipher::new(&fixed_secret(42));
        let ciphertext = cipher.encrypt(b"Hello, World!", b"context").unwrap();

        let result = cipher.decrypt(&ciphertext, b"wrong context");
        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_wrong_key_fails() {
        let ciphertext = SymmetricCipher::new(&fixed_secret(42))
            .encrypt(b"secret save", b"")
            .unwrap();

        let result = SymmetricCipher::new(&fixed_secret(99)).decrypt(&ciphertext, b"");
        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let cipher = SymmetricCipher::new(&fixed_secret(42));

        let result = cipher.decrypt(&[0u8; TAG_SIZE - 1], b"");
        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = SymmetricSecret::generate();
        let b = SymmetricSecret::generate();

        assert_ne!(a.key_bytes(), b.key_bytes());
        assert_ne!(a.iv_bytes(), b.iv_bytes());
    }

    #[test]
    fn test_from_parts_rejects_wrong_lengths() {
        assert!(matches!(
            SymmetricSecret::from_parts(&[0u8; 16], &[0u8; IV_SIZE]),
            Err(Error::CryptoFailure(_))
        ));
        assert!(matches!(
            SymmetricSecret::from_parts(&[0u8; KEY_SIZE], &[0u8; 16]),
            Err(Error::CryptoFailure(_))
        ));
    }
}
