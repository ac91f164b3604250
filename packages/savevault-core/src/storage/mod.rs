//! # Storage Module
//!
//! On-disk formats for the key pair and the save record.
//!
//! ## Storage Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DATA DIRECTORY                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  rsa_key.json                                                   │   │
//! │  │  ────────────                                                    │   │
//! │  │  JSON: publicKey / privateKey, base64 RSA parameters            │   │
//! │  │  Written once on first run, 0600, never updated                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  gamedata.sav                                                   │   │
//! │  │  ────────────                                                    │   │
//! │  │  Text: wrapped key / wrapped IV / ciphertext, one per line      │   │
//! │  │  Replaced atomically on every save                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here locks. Two processes writing the same directory at once must
//! be serialized by the caller.

pub(crate) mod fs;
mod key_store;
mod save_file;

pub use key_store::{load_or_create, KeyFile, KeyParameters, KeyStore};
pub use save_file::{SaveRecord, FIELD_COUNT};

pub(crate) use save_file::record_aad;
