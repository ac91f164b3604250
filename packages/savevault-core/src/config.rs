//! Vault configuration.
//!
//! Where the key file and the save file live, and how strong the key pair is.

use std::path::{Path, PathBuf};

use rsa::RsaPublicKey;

use crate::error::{Error, Result};

/// File name of the persisted key pair.
pub const DEFAULT_KEY_FILE_NAME: &str = "rsa_key.json";

/// File name of the persisted save record.
pub const DEFAULT_SAVE_FILE_NAME: &str = "gamedata.sav";

/// Modulus size used when generating a key pair.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus size the key store will generate.
pub const MIN_KEY_BITS: usize = 1024;

/// Largest modulus size the key store will generate. Larger public keys are
/// refused when the key file is parsed again, so they could never be reloaded.
pub const MAX_KEY_BITS: usize = RsaPublicKey::MAX_SIZE;

/// Configuration for a key store and its encryption manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Directory holding both the key file and the save file
    pub data_dir: PathBuf,
    /// Key file name inside `data_dir`
    pub key_file_name: String,
    /// Save file name inside `data_dir`
    pub save_file_name: String,
    /// RSA modulus size in bits for newly generated key pairs
    pub key_bits: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            key_file_name: DEFAULT_KEY_FILE_NAME.to_string(),
            save_file_name: DEFAULT_SAVE_FILE_NAME.to_string(),
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

impl VaultConfig {
    /// Default configuration rooted at `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Override the key file name.
    pub fn with_key_file_name(mut self, name: impl Into<String>) -> Self {
        self.key_file_name = name.into();
        self
    }

    /// Override the save file name.
    pub fn with_save_file_name(mut self, name: impl Into<String>) -> Self {
        self.save_file_name = name.into();
        self
    }

    /// Override the key strength used on first run.
    pub fn with_key_bits(mut self, bits: usize) -> Self {
        self.key_bits = bits;
        self
    }

    /// Full path of the key file.
    pub fn key_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.key_file_name)
    }

    /// Full path of the save file.
    pub fn save_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.save_file_name)
    }

    /// Reject configurations the key store cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(Error::InvalidKey(format!(
                "Key strength of {} bits is below the {} bit minimum",
                self.key_bits, MIN_KEY_BITS
            )));
        }
        if self.key_bits > MAX_KEY_BITS {
            return Err(Error::InvalidKey(format!(
                "Key strength of {} bits is above the {} bit maximum",
                self.key_bits, MAX_KEY_BITS
            )));
        }
        if self.key_bits % 8 != 0 {
            return Err(Error::InvalidKey(format!(
                "Key strength must be a multiple of 8 bits, got {}",
                self.key_bits
            )));
        }
        if self.key_file_name.is_empty() || self.save_file_name.is_empty() {
            return Err(Error::InvalidKey("File names must not be empty".into()));
        }
        if self.key_file_name == self.save_file_name {
            return Err(Error::InvalidKey(
                "Key file and save file must use different names".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = VaultConfig::new("/tmp/game");

        assert_eq!(config.key_file_path(), Path::new("/tmp/game/rsa_key.json"));
        assert_eq!(config.save_file_path(), Path::new("/tmp/game/gamedata.sav"));
        assert_eq!(config.key_bits, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = VaultConfig::new("dir")
            .with_key_file_name("keys.json")
            .with_save_file_name("slot1.sav")
            .with_key_bits(3072);

        assert_eq!(config.key_file_path(), PathBuf::from("dir/keys.json"));
        assert_eq!(config.save_file_path(), PathBuf::from("dir/slot1.sav"));
        assert_eq!(config.key_bits, 3072);
    }

    #[test]
    fn test_rejects_weak_keys() {
        let config = VaultConfig::new("dir").with_key_bits(512);
        assert!(matches!(config.validate(), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_rejects_oversized_keys() {
        let largest = VaultConfig::new("dir").with_key_bits(MAX_KEY_BITS);
        assert!(largest.validate().is_ok());

        let config = VaultConfig::new("dir").with_key_bits(MAX_KEY_BITS + 8);
        assert!(matches!(config.validate(), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_rejects_clashing_file_names() {
        let config = VaultConfig::new("dir")
            .with_key_file_name("same")
            .with_save_file_name("same");
        assert!(config.validate().is_err());
    }
}
