//! Text and blob encodings.
//!
//! Plaintext is carried as UTF-16LE; blobs are standard base64 with padding.

use base64::{Engine, engine::general_purpose::STANDARD};

use super::CryptoError;

/// Encode text as UTF-16 little-endian bytes.
pub fn to_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Decode UTF-16 little-endian bytes into text.
pub fn from_utf16le(bytes: &[u8]) -> Result<String, CryptoError> {
    if bytes.len() % 2 != 0 {
        return Err(CryptoError::Utf16Length(bytes.len()));
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(String::from_utf16(&units)?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a padded base64 blob, skipping spaces, tabs and line breaks.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, CryptoError> {
    let compact: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\r' | '\n'))
        .collect();

    STANDARD.decode(compact).map_err(|_| CryptoError::Base64)
}
