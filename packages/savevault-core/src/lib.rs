//! # SaveVault Core
//!
//! Protects a locally persisted blob of application state with hybrid
//! encryption: a long-lived RSA key pair wraps a fresh AES-256 key for every
//! save.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SAVEVAULT CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │                 HybridEncryptionManager                       │     │
//! │  │  - initialize()  Uninitialized → Ready                        │     │
//! │  │  - save(&str)    plaintext → gamedata.sav                     │     │
//! │  │  - load()        gamedata.sav → Option<String>                │     │
//! │  └──────────┬──────────────────────┬─────────────────────────────┘     │
//! │             │                      │                                    │
//! │  ┌──────────▼──────────┐  ┌────────▼────────────────────────────┐      │
//! │  │      Storage        │  │             Crypto                  │      │
//! │  │                     │  │                                     │      │
//! │  │ - KeyStore          │  │ - AsymmetricCipher (RSA wrap)       │      │
//! │  │ - KeyFile (JSON)    │  │ - SymmetricCipher (AES-256-GCM)     │      │
//! │  │ - SaveRecord (text) │  │ - SymmetricSecret (one-time key/IV) │      │
//! │  └─────────────────────┘  └─────────────────────────────────────┘      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - File locations and key strength
//! - [`crypto`] - Key wrapping and payload encryption
//! - [`storage`] - Key file and save file formats
//! - [`manager`] - The save/load orchestration
//!
//! ## Usage
//!
//! ```no_run
//! use savevault_core::{HybridEncryptionManager, VaultConfig};
//!
//! # fn main() -> savevault_core::Result<()> {
//! let mut manager = HybridEncryptionManager::new(VaultConfig::new("/var/lib/mygame"));
//! manager.initialize()?;
//!
//! manager.save(r#"{"Name":"Hero","Level":3}"#)?;
//! let restored = manager.load()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Everything is synchronous and blocking. Nothing locks the files; wrap the
//! manager in [`SharedEncryptionManager`] or serialize access some other way
//! when more than one thread or process can touch the same directory.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod crypto;
pub mod error;
pub mod manager;
pub mod storage;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::VaultConfig;
pub use crypto::{AsymmetricCipher, AsymmetricKeyPair, SymmetricCipher, SymmetricSecret};
pub use error::{Error, Result};
pub use manager::{HybridEncryptionManager, ManagerState, SharedEncryptionManager};
pub use storage::{load_or_create, KeyStore, SaveRecord};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of SaveVault Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
