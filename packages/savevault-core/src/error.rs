//! # Error Handling
//!
//! Typed failures surfaced by the key store, the ciphers and the manager.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Lifecycle Errors                                                  │
//! │  │   ├── NotInitialized        - save/load before initialize()         │
//! │  │   └── AlreadyInitialized    - initialize() called twice             │
//! │  │                                                                      │
//! │  ├── Key Store Errors                                                  │
//! │  │   ├── KeyFileCorrupt        - stored key fields don't decode        │
//! │  │   └── KeyGenerationFailed   - RSA key generation failed             │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── CryptoFailure         - unwrap / decrypt verification failed  │
//! │  │   ├── EncryptionFailed      - wrap / encrypt failed                 │
//! │  │   └── InvalidKey            - unusable key parameters               │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── SaveFileCorrupt       - save record has wrong field count     │
//! │  │   ├── StorageReadError      - file system read failed               │
//! │  │   └── StorageWriteError     - file system write failed              │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      └── SerializationError    - JSON encoding failed                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing key file and a missing save file are expected first-run
//! conditions and have no variant here. The first triggers key generation,
//! the second makes `load()` return `Ok(None)`.

use thiserror::Error;

/// Result type alias for SaveVault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SaveVault Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Lifecycle Errors (100-199)
    // ========================================================================

    /// The manager has not loaded its key pair yet
    #[error("Encryption manager has not been initialized. Call initialize() first.")]
    NotInitialized,

    /// The manager already holds a key pair
    #[error("Encryption manager has already been initialized.")]
    AlreadyInitialized,

    // ========================================================================
    // Key Store Errors (200-299)
    // ========================================================================

    /// The persisted key file exists but cannot be turned into a key pair
    #[error("Key file is corrupt: {0}")]
    KeyFileCorrupt(String),

    /// Generating a fresh key pair failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// Unwrapping or decrypting failed verification
    #[error("Cryptographic verification failed: {0}")]
    CryptoFailure(String),

    /// Wrapping or encrypting failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Invalid key parameters
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// The save file does not hold exactly three fields
    #[error("Save file is corrupt: {0}")]
    SaveFileCorrupt(String),

    /// Failed to read from disk
    #[error("Failed to read from storage: {0}")]
    StorageReadError(String),

    /// Failed to write to disk
    #[error("Failed to write to storage: {0}")]
    StorageWriteError(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Stable numeric code for the error
    ///
    /// Error codes are organized by category:
    /// - 100-199: Lifecycle
    /// - 200-299: Key store
    /// - 300-399: Crypto
    /// - 400-499: Storage
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Lifecycle (100-199)
            Error::NotInitialized => 100,
            Error::AlreadyInitialized => 101,

            // Key store (200-299)
            Error::KeyFileCorrupt(_) => 200,
            Error::KeyGenerationFailed(_) => 201,

            // Crypto (300-399)
            Error::CryptoFailure(_) => 300,
            Error::EncryptionFailed(_) => 301,
            Error::InvalidKey(_) => 302,

            // Storage (400-499)
            Error::SaveFileCorrupt(_) => 400,
            Error::StorageReadError(_) => 401,
            Error::StorageWriteError(_) => 402,

            // Internal (900-999)
            Error::SerializationError(_) => 900,
        }
    }

    /// Check if this error means the existing save cannot be recovered
    ///
    /// Callers typically report these as "save data unreadable, starting
    /// fresh" instead of aborting.
    pub fn is_save_unreadable(&self) -> bool {
        matches!(self, Error::SaveFileCorrupt(_) | Error::CryptoFailure(_))
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageReadError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NotInitialized.code(), 100);
        assert_eq!(Error::KeyFileCorrupt("test".into()).code(), 200);
        assert_eq!(Error::CryptoFailure("test".into()).code(), 300);
        assert_eq!(Error::SaveFileCorrupt("test".into()).code(), 400);
        assert_eq!(Error::SerializationError("test".into()).code(), 900);
    }

    #[test]
    fn test_save_unreadable_errors() {
        assert!(Error::CryptoFailure("tag".into()).is_save_unreadable());
        assert!(Error::SaveFileCorrupt("short".into()).is_save_unreadable());
        assert!(!Error::KeyFileCorrupt("bad".into()).is_save_unreadable());
        assert!(!Error::NotInitialized.is_save_unreadable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();

        assert_eq!(err.code(), 401);
        assert!(err.to_string().contains("denied"));
    }
}
