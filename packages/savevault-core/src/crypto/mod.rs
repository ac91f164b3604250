//! # Cryptography Module
//!
//! The two ciphers behind every save: RSA wraps a fresh AES key, AES protects
//! the payload.
//!
//! ## Hybrid Scheme
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    HYBRID ENCRYPTION                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  AsymmetricKeyPair (RSA, 2048 bits)                             │   │
//! │  │  • Generated once per installation                              │   │
//! │  │  • Persisted by the key store                                   │   │
//! │  │  • Only ever encrypts 32-byte keys and 12-byte IVs              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                          │ wraps                                        │
//! │                          ▼                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SymmetricSecret (AES-256 key + 96-bit IV)                      │   │
//! │  │  • Generated fresh for every save                               │   │
//! │  │  • Never written to disk unwrapped                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                          │ encrypts                                     │
//! │                          ▼                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Payload (AES-256-GCM, 128-bit tag)                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | RSA-2048 | Key wrapping | Public component can encrypt without the private one |
//! | OAEP-SHA256 | Wrap padding | Randomized, chosen-ciphertext secure |
//! | AES-256-GCM | Payload | AEAD, so tampering is detected rather than decrypted |

mod asymmetric;
mod symmetric;

pub use asymmetric::{AsymmetricCipher, AsymmetricKeyPair};
pub use symmetric::{SymmetricCipher, SymmetricSecret, IV_SIZE, KEY_SIZE, TAG_SIZE};
