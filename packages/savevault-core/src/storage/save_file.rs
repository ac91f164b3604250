//! # Save Record
//!
//! The three-field text format written for every save.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gamedata.sav                                                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  line 1: base64( RSA-wrapped AES key )                                 │
//! │  line 2: base64( RSA-wrapped IV )                                      │
//! │  line 3: base64( AES-GCM ciphertext + tag )                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields are positional and there is no header. Integrity comes from the GCM
//! tag, whose associated data covers lines 1 and 2, so swapping a field in from
//! another record fails to decrypt.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};

/// Number of newline-separated fields in a save file
pub const FIELD_COUNT: usize = 3;

/// Domain label mixed into the payload's associated data
const RECORD_AAD_LABEL: &[u8] = b"savevault-record-v1";

/// A save record: wrapped key, wrapped IV, encrypted payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecord {
    /// Symmetric key wrapped with the public component
    pub wrapped_key: Vec<u8>,
    /// IV wrapped with the public component
    pub wrapped_iv: Vec<u8>,
    /// Payload encrypted with the symmetric key and IV
    pub ciphertext: Vec<u8>,
}

impl SaveRecord {
    /// Render the record as three base64 lines (no trailing newline)
    pub fn encode(&self) -> String {
        [
            STANDARD.encode(&self.wrapped_key),
            STANDARD.encode(&self.wrapped_iv),
            STANDARD.encode(&self.ciphertext),
        ]
        .join("\n")
    }

    /// Parse the raw bytes of a save file
    ///
    /// One trailing newline and a `\r` at the end of each line are tolerated.
    ///
    /// ## Errors
    ///
    /// - `SaveFileCorrupt` if there are not exactly three fields
    /// - `CryptoFailure` if a field is not valid base64
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        let fields: Vec<&[u8]> = body.split(|&b| b == b'\n').collect();

        if fields.len() != FIELD_COUNT {
            return Err(Error::SaveFileCorrupt(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        Ok(Self {
            wrapped_key: decode_field("wrapped key", fields[0])?,
            wrapped_iv: decode_field("wrapped IV", fields[1])?,
            ciphertext: decode_field("ciphertext", fields[2])?,
        })
    }

    /// Associated data binding the payload to this record's wrapped fields
    pub fn associated_data(&self) -> Vec<u8> {
        record_aad(&self.wrapped_key, &self.wrapped_iv)
    }
}

/// Associated data for a payload whose key and IV were wrapped as given
pub(crate) fn record_aad(wrapped_key: &[u8], wrapped_iv: &[u8]) -> Vec<u8> {
    let len = RECORD_AAD_LABEL.len() + 4 + wrapped_key.len() + wrapped_iv.len();
    let mut aad = Vec::with_capacity(len);
    aad.extend_from_slice(RECORD_AAD_LABEL);
    aad.extend_from_slice(&(wrapped_key.len() as u32).to_le_bytes());
    aad.extend_from_slice(wrapped_key);
    aad.extend_from_slice(wrapped_iv);
    aad
}

fn decode_field(name: &str, field: &[u8]) -> Result<Vec<u8>> {
    let field = field.strip_suffix(b"\r").unwrap_or(field);
    STANDARD
        .decode(field)
        .map_err(|_| Error::CryptoFailure(format!("{} field is not valid base64", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveRecord {
        SaveRecord {
            wrapped_key: vec![1; 128],
            wrapped_iv: vec![2; 128],
            ciphertext: vec![3; 40],
        }
    }

    #[test]
    fn test_encode_layout() {
        let text = sample().encode();
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(lines.len(), 3);
        assert!(!text.ends_with('\n'));
        assert_eq!(STANDARD.decode(lines[2]).unwrap(), vec![3; 40]);
    }

    #[test]
    fn test_parse_encoded() {
        let record = sample();
        let parsed = SaveRecord::parse(record.encode().as_bytes()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_parse_tolerates_line_endings() {
        let record = sample();
        let crlf = format!("{}\r\n", record.encode().replace('\n', "\r\n"));

        assert_eq!(SaveRecord::parse(crlf.as_bytes()).unwrap(), record);
    }

    #[test]
    fn test_wrong_field_counts() {
        let text = sample().encode();
        let lines: Vec<&str> = text.split('\n').collect();

        let two = lines[..2].join("\n");
        let four = format!("{}\n{}", text, lines[2]);

        for bad in [String::new(), lines[0].to_string(), two, four] {
            let result = SaveRecord::parse(bad.as_bytes());
            assert!(
                matches!(result, Err(Error::SaveFileCorrupt(_))),
                "{:?} should be corrupt",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_base64_is_crypto_failure() {
        let result = SaveRecord::parse(b"AAAA\n@@@@\nAAAA");
        assert!(matches!(result, Err(Error::CryptoFailure(_))));

        let result = SaveRecord::parse(&[b'A', b'A', b'A', 0xC1, b'\n', b'A', b'\n', b'A']);
        assert!(matches!(result, Err(Error::CryptoFailure(_))));
    }

    #[test]
    fn test_aad_depends_on_wrapped_fields() {
        let record = sample();
        let mut swapped = record.clone();
        swapped.wrapped_iv[0] ^= 1;

        assert_ne!(record.associated_data(), swapped.associated_data());
        assert!(record.associated_data().starts_with(RECORD_AAD_LABEL));
    }
}
