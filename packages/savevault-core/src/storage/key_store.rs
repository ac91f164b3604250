//! # Key Store
//!
//! Owns the lifecycle of the installation's RSA key pair.
//!
//! ## Load Or Create
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       load_or_create()                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   {data_dir}/rsa_key.json exists?                                      │
//! │            │                                                            │
//! │     yes ───┴─── no                                                      │
//! │      │           │                                                      │
//! │      ▼           ▼                                                      │
//! │   parse JSON   generate RSA key pair (2048 bits)                        │
//! │   decode b64     │                                                      │
//! │   validate       ▼                                                      │
//! │      │         write key file (atomic, 0600)                            │
//! │      │           │   (must succeed before the key is handed out)        │
//! │      └─────┬─────┘                                                      │
//! │            ▼                                                            │
//! │     AsymmetricKeyPair                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key File Format
//!
//! ```json
//! {
//!   "publicKey":  { "Exponent": "AQAB", "Modulus": "...", "P": null, "Q": null,
//!                   "DP": null, "DQ": null, "InverseQ": null, "D": null },
//!   "privateKey": { "Exponent": "AQAB", "Modulus": "...", "P": "...", "Q": "...",
//!                   "DP": "...", "DQ": "...", "InverseQ": "...", "D": "..." }
//! }
//! ```
//!
//! Every value is standard base64 of an unsigned big-endian integer. The CRT
//! values are left-padded to half the modulus length and `D` to the full
//! modulus length.
//!
//! There is no update path. Deleting the key file is the only way to get a
//! new key pair, and it makes every existing save unreadable.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use super::fs;
use crate::config::VaultConfig;
use crate::crypto::AsymmetricKeyPair;
use crate::error::{Error, Result};

/// Persisted form of both key components
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyFile {
    /// Public component (exponent and modulus only)
    #[serde(rename = "publicKey")]
    pub public_key: KeyParameters,
    /// Private component (all fields)
    #[serde(rename = "privateKey")]
    pub private_key: KeyParameters,
}

/// Named RSA parameters, each base64 encoded or null
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyParameters {
    /// Public exponent
    #[serde(rename = "Exponent", default)]
    pub exponent: Option<String>,
    /// Modulus
    #[serde(rename = "Modulus", default)]
    pub modulus: Option<String>,
    /// First prime factor
    #[serde(rename = "P", default)]
    pub p: Option<String>,
    /// Second prime factor
    #[serde(rename = "Q", default)]
    pub q: Option<String>,
    /// `D mod (P - 1)`
    #[serde(rename = "DP", default)]
    pub dp: Option<String>,
    /// `D mod (Q - 1)`
    #[serde(rename = "DQ", default)]
    pub dq: Option<String>,
    /// `Q^-1 mod P`
    #[serde(rename = "InverseQ", default)]
    pub inverse_q: Option<String>,
    /// Private exponent
    #[serde(rename = "D", default)]
    pub d: Option<String>,
}

impl KeyParameters {
    fn from_public(public: &RsaPublicKey) -> Self {
        Self {
            exponent: Some(encode_uint(public.e(), 0)),
            modulus: Some(encode_uint(public.n(), 0)),
            ..Self::default()
        }
    }

    fn from_private(private: &RsaPrivateKey) -> Self {
        let modulus_len = private.size();
        let half_len = (modulus_len + 1) / 2;
        let primes = private.primes();

        Self {
            exponent: Some(encode_uint(private.e(), 0)),
            modulus: Some(encode_uint(private.n(), 0)),
            p: primes.first().map(|p| encode_uint(p, half_len)),
            q: primes.get(1).map(|q| encode_uint(q, half_len)),
            dp: private.dp().map(|dp| encode_uint(dp, half_len)),
            dq: private.dq().map(|dq| encode_uint(dq, half_len)),
            inverse_q: private.qinv().map(|qinv| {
                let (_, bytes) = qinv.to_bytes_be();
                encode_bytes(&bytes, half_len)
            }),
            d: Some(encode_uint(private.d(), modulus_len)),
        }
    }

    fn to_public(&self) -> Result<RsaPublicKey> {
        let n = required("publicKey.Modulus", &self.modulus)?;
        let e = required("publicKey.Exponent", &self.exponent)?;

        RsaPublicKey::new(n, e)
            .map_err(|e| Error::KeyFileCorrupt(format!("Invalid public key: {}", e)))
    }

    fn to_private(&self) -> Result<RsaPrivateKey> {
        let n = required("privateKey.Modulus", &self.modulus)?;
        let e = required("privateKey.Exponent", &self.exponent)?;
        let d = required("privateKey.D", &self.d)?;
        let p = required("privateKey.P", &self.p)?;
        let q = required("privateKey.Q", &self.q)?;

        let mut private = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|e| Error::KeyFileCorrupt(format!("Invalid private key: {}", e)))?;
        private
            .validate()
            .map_err(|e| Error::KeyFileCorrupt(format!("Invalid private key: {}", e)))?;
        private
            .precompute()
            .map_err(|e| Error::KeyFileCorrupt(format!("Invalid private key: {}", e)))?;

        self.check_crt_values(&private)?;
        Ok(private)
    }

    /// Stored CRT values are redundant; when present they must agree with the
    /// ones recomputed from `D`, `P` and `Q`.
    fn check_crt_values(&self, private: &RsaPrivateKey) -> Result<()> {
        if let Some(stored) = optional("privateKey.DP", &self.dp)? {
            if private.dp() != Some(&stored) {
                return Err(Error::KeyFileCorrupt("DP does not match D and P".into()));
            }
        }
        if let Some(stored) = optional("privateKey.DQ", &self.dq)? {
            if private.dq() != Some(&stored) {
                return Err(Error::KeyFileCorrupt("DQ does not match D and Q".into()));
            }
        }
        if let Some(stored) = optional("privateKey.InverseQ", &self.inverse_q)? {
            let computed = private
                .qinv()
                .map(|qinv| BigUint::from_bytes_be(&qinv.to_bytes_be().1));
            if computed.as_ref() != Some(&stored) {
                return Err(Error::KeyFileCorrupt(
                    "InverseQ does not match P and Q".into(),
                ));
            }
        }
        Ok(())
    }
}

impl KeyFile {
    /// Serialize both components of a key pair
    pub fn from_key_pair(keys: &AsymmetricKeyPair) -> Self {
        Self {
            public_key: KeyParameters::from_public(keys.public_key()),
            private_key: KeyParameters::from_private(keys.private_key()),
        }
    }

    /// Decode and validate both components
    ///
    /// ## Errors
    ///
    /// `KeyFileCorrupt` when a required field is missing, a field is not
    /// base64, the numbers do not form a valid RSA key, or the public
    /// component differs from the private one.
    pub fn into_key_pair(self) -> Result<AsymmetricKeyPair> {
        let public = self.public_key.to_public()?;
        let private = self.private_key.to_private()?;

        AsymmetricKeyPair::from_parts(public, private).map_err(|e| match e {
            Error::InvalidKey(msg) => Error::KeyFileCorrupt(msg),
            other => other,
        })
    }

    /// Parse the JSON text of a key file
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::KeyFileCorrupt(format!("Malformed key file JSON: {}", e)))
    }

    /// Render the JSON text of a key file
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Loads the installation's key pair, generating it on first run
#[derive(Debug, Clone)]
pub struct KeyStore {
    config: VaultConfig,
}

impl KeyStore {
    /// Create a key store for the given configuration
    pub fn new(config: VaultConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a key store with default settings rooted at `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(VaultConfig::new(data_dir))
    }

    /// Path of the key file
    pub fn key_file_path(&self) -> PathBuf {
        self.config.key_file_path()
    }

    /// Whether a key file is present
    pub fn exists(&self) -> bool {
        self.key_file_path().is_file()
    }

    /// Load the persisted key pair, or `None` on first run
    pub fn load(&self) -> Result<Option<AsymmetricKeyPair>> {
        let path = self.key_file_path();
        let bytes = match fs::read_optional(&path)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let keys = KeyFile::from_json(&bytes)?.into_key_pair()?;
        tracing::info!(
            path = %path.display(),
            bits = keys.modulus_bits(),
            fingerprint = %keys.fingerprint(),
            "Loaded key pair"
        );
        Ok(Some(keys))
    }

    /// Return the persisted key pair, generating and persisting one first if
    /// none exists
    ///
    /// Repeated calls against the same directory return the same material.
    /// A generated key is only returned after its file is fully written.
    pub fn load_or_create(&self) -> Result<AsymmetricKeyPair> {
        if let Some(keys) = self.load()? {
            return Ok(keys);
        }
        self.create()
    }

    fn create(&self) -> Result<AsymmetricKeyPair> {
        let path = self.key_file_path();
        tracing::info!(
            path = %path.display(),
            bits = self.config.key_bits,
            "Key file not found, generating key pair"
        );

        let keys = AsymmetricKeyPair::generate(self.config.key_bits)?;
        let json = KeyFile::from_key_pair(&keys).to_json()?;

        // Only persist what the next run can parse back into the same pair
        let reloaded = KeyFile::from_json(&json)?.into_key_pair()?;
        if reloaded != keys {
            return Err(Error::KeyGenerationFailed(
                "Serialized key pair does not reload to the same key".into(),
            ));
        }

        fs::write_atomic(&path, &json, true)?;

        tracing::info!(fingerprint = %keys.fingerprint(), "Persisted new key pair");
        Ok(keys)
    }
}

/// Load or create the key pair in `data_dir` with default settings
pub fn load_or_create(data_dir: impl AsRef<Path>) -> Result<AsymmetricKeyPair> {
    KeyStore::open(data_dir)?.load_or_create()
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn encode_uint(value: &BigUint, min_len: usize) -> String {
    encode_bytes(&value.to_bytes_be(), min_len)
}

/// Base64 of `bytes`, left-padded with zeros to `min_len`
fn encode_bytes(bytes: &[u8], min_len: usize) -> String {
    if bytes.len() >= min_len {
        return STANDARD.encode(bytes);
    }
    let mut padded = vec![0u8; min_len - bytes.len()];
    padded.extend_from_slice(bytes);
    STANDARD.encode(padded)
}

fn optional(name: &str, field: &Option<String>) -> Result<Option<BigUint>> {
    let Some(encoded) = field else {
        return Ok(None);
    };

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| Error::KeyFileCorrupt(format!("{} is not valid base64: {}", name, e)))?;
    if bytes.is_empty() {
        return Err(Error::KeyFileCorrupt(format!("{} is empty", name)));
    }
    Ok(Some(BigUint::from_bytes_be(&bytes)))
}

fn required(name: &str, field: &Option<String>) -> Result<BigUint> {
    optional(name, field)?.ok_or_else(|| Error::KeyFileCorrupt(format!("{} is missing", name)))
}

// ============================================================================
// TESTS
// ============================================================================
