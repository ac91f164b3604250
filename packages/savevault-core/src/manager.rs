//! # Hybrid Encryption Manager
//!
//! Orchestrates save and load on top of the key store and the two ciphers.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MANAGER LIFECYCLE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │     ┌───────────────┐   initialize()    ┌───────────────┐              │
//! │     │ Uninitialized │ ────────────────► │     Ready     │              │
//! │     └───────────────┘  KeyStore::load_  └───────────────┘              │
//! │       save/load →        or_create()      terminal for the             │
//! │       NotInitialized                      process lifetime             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `has_save` and `delete_save` only look at the save file, never at key
//! material, so they work in either state.
//!
//! ## Save Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. SymmetricSecret::generate()            fresh key + IV              │
//! │  2. wrap key, wrap IV                      public component            │
//! │  3. AES-GCM(payload, aad = wrapped fields) symmetric cipher            │
//! │  4. base64 × 3, newline separated          SaveRecord::encode          │
//! │  5. atomic replace of the save file                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Load runs the same steps in reverse and returns nothing at all unless every
//! step verifies.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::VaultConfig;
use crate::crypto::{AsymmetricCipher, AsymmetricKeyPair, SymmetricCipher, SymmetricSecret};
use crate::error::{Error, Result};
use crate::storage::{fs, record_aad, KeyStore, SaveRecord};

/// Lifecycle state of a [`HybridEncryptionManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// No key pair loaded; save and load are rejected
    Uninitialized,
    /// Key pair loaded; save and load are available
    Ready,
}

/// Saves and loads a payload using hybrid RSA + AES-GCM encryption
///
/// The manager holds no persisted state of its own. It borrows the key pair
/// loaded by the [`KeyStore`] and reads and writes a single save file.
pub struct HybridEncryptionManager {
    config: VaultConfig,
    cipher: AsymmetricCipher,
    keys: Option<Arc<AsymmetricKeyPair>>,
}

impl HybridEncryptionManager {
    /// Create an uninitialized manager
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            cipher: AsymmetricCipher::new(),
            keys: None,
        }
    }

    /// Create a manager that is ready immediately with an already loaded key
    /// pair
    ///
    /// The configuration is validated exactly as [`Self::initialize`] would.
    pub fn with_key_pair(config: VaultConfig, keys: Arc<AsymmetricKeyPair>) -> Result<Self> {
        config.validate()?;
        let mut manager = Self::new(config);
        manager.keys = Some(keys);
        Ok(manager)
    }

    /// Load or create the key pair, moving to [`ManagerState::Ready`]
    ///
    /// Must complete before any save or load. Calling it a second time
    /// returns `AlreadyInitialized` and keeps the loaded key pair.
    pub fn initialize(&mut self) -> Result<()> {
        if self.keys.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let keys = KeyStore::new(self.config.clone())?.load_or_create()?;
        tracing::info!(fingerprint = %keys.fingerprint(), "Encryption manager ready");
        self.keys = Some(Arc::new(keys));
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> ManagerState {
        if self.keys.is_some() {
            ManagerState::Ready
        } else {
            ManagerState::Uninitialized
        }
    }

    /// Whether save and load are available
    pub fn is_ready(&self) -> bool {
        self.state() == ManagerState::Ready
    }

    /// The configuration this manager was built with
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Path of the save file
    pub fn save_path(&self) -> PathBuf {
        self.config.save_file_path()
    }

    /// The loaded key pair
    pub fn key_pair(&self) -> Result<&Arc<AsymmetricKeyPair>> {
        self.keys.as_ref().ok_or(Error::NotInitialized)
    }

    /// Encrypt `plaintext` and replace the save file with it
    pub fn save(&self, plaintext: &str) -> Result<()> {
        self.save_bytes(plaintext.as_bytes())
    }

    /// Encrypt an opaque payload and replace the save file with it
    pub fn save_bytes(&self, payload: &[u8]) -> Result<()> {
        let record = self.seal(payload)?;
        let path = self.save_path();

        fs::write_atomic(&path, record.encode().as_bytes(), false)?;

        tracing::info!(path = %path.display(), "Save data written");
        tracing::debug!(
            payload_len = payload.len(),
            ciphertext_len = record.ciphertext.len(),
            "Save record sizes"
        );
        Ok(())
    }

    /// Read and decrypt the save file as UTF-8 text
    ///
    /// Returns `Ok(None)` when no save exists yet.
    pub fn load(&self) -> Result<Option<String>> {
        match self.load_bytes()? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
                Error::CryptoFailure("Decrypted payload is not valid UTF-8".into())
            }),
            None => Ok(None),
        }
    }

    /// Read and decrypt the save file as raw bytes
    ///
    /// Returns `Ok(None)` when no save exists yet.
    ///
    /// ## Errors
    ///
    /// - `NotInitialized` before [`Self::initialize`]
    /// - `SaveFileCorrupt` when the file does not hold exactly three fields
    /// - `CryptoFailure` when any unwrap or decrypt step fails to verify
    pub fn load_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.key_pair()?;

        let path = self.save_path();
        let bytes = match fs::read_optional(&path)? {
            Some(bytes) => bytes,
            None => {
                tracing::warn!(path = %path.display(), "Save file not found");
                return Ok(None);
            }
        };

        let record = SaveRecord::parse(&bytes)?;
        let payload = self.open(&record)?;

        tracing::info!(path = %path.display(), "Save data loaded");
        Ok(Some(payload))
    }

    /// Encrypt a payload into a record without touching the disk
    pub fn seal(&self, payload: &[u8]) -> Result<SaveRecord> {
        let keys = self.key_pair()?;
        let secret = SymmetricSecret::generate();

        let wrapped_key = self.cipher.wrap_small(secret.key_bytes(), keys.public_key())?;
        let wrapped_iv = self.cipher.wrap_small(secret.iv_bytes(), keys.public_key())?;

        let aad = record_aad(&wrapped_key, &wrapped_iv);
        let ciphertext = SymmetricCipher::new(&secret).encrypt(payload, &aad)?;

        Ok(SaveRecord {
            wrapped_key,
            wrapped_iv,
            ciphertext,
        })
    }

    /// Decrypt a record without touching the disk
    pub fn open(&self, record: &SaveRecord) -> Result<Vec<u8>> {
        let keys = self.key_pair()?;

        let key = self.cipher.unwrap_small(&record.wrapped_key, keys.private_key())?;
        let iv = self.cipher.unwrap_small(&record.wrapped_iv, keys.private_key())?;
        let secret = SymmetricSecret::from_parts(&key, &iv)?;

        SymmetricCipher::new(&secret).decrypt(&record.ciphertext, &record.associated_data())
    }

    /// Whether a save file is present
    ///
    /// Available in any state.
    pub fn has_save(&self) -> bool {
        self.save_path().is_file()
    }

    /// Delete the save file, returning whether one existed
    ///
    /// The key pair is untouched. Available in any state.
    pub fn delete_save(&self) -> Result<bool> {
        let removed = fs::remove_if_exists(&self.save_path())?;
        if removed {
            tracing::info!(path = %self.save_path().display(), "Save data deleted");
        }
        Ok(removed)
    }
}

// ============================================================================
// SHARED ACCESS
// ============================================================================

/// A manager behind a mutex, for callers that save and load from more than
/// one thread
///
/// Every operation holds the lock for its whole duration, so saves and loads
/// against the same file never interleave within the process.
#[derive(Clone)]
pub struct SharedEncryptionManager {
    inner: Arc<Mutex<HybridEncryptionManager>>,
}

impl SharedEncryptionManager {
    /// Wrap a manager for shared use
    pub fn new(manager: HybridEncryptionManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// See [`HybridEncryptionManager::initialize`]
    pub fn initialize(&self) -> Result<()> {
        self.inner.lock().initialize()
    }

    /// See [`HybridEncryptionManager::state`]
    pub fn state(&self) -> ManagerState {
        self.inner.lock().state()
    }

    /// See [`HybridEncryptionManager::save`]
    pub fn save(&self, plaintext: &str) -> Result<()> {
        self.inner.lock().save(plaintext)
    }

    /// See [`HybridEncryptionManager::load`]
    pub fn load(&self) -> Result<Option<String>> {
        self.inner.lock().load()
    }
}

// ============================================================================
// TESTS
// ============================================================================
