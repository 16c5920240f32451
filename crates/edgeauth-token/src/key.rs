//! Secret key decoding.
//!
//! Keys are shared with the edge as hexadecimal strings. Whitespace is not
//! significant, so keys copied from configuration files with line breaks or
//! grouping spaces decode to the same bytes.

use crate::error::{TokenError, TokenResult};

/// Whether `key` carries any key material at all.
#[must_use]
pub fn is_blank(key: &str) -> bool {
    key.chars().all(char::is_whitespace)
}

/// Strip all whitespace from `key` and decode it as hexadecimal.
///
/// # Errors
///
/// Returns [`TokenError::MissingKey`] if nothing remains after stripping, or
/// [`TokenError::InvalidKeyEncoding`] for odd-length or non-hex input.
///
/// # Examples
///
/// ```
/// use edgeauth_token::key::decode_key;
///
/// assert_eq!(decode_key("ab cd\n01").unwrap(), vec![0xab, 0xcd, 0x01]);
/// assert!(decode_key("abc").is_err());
/// ```
pub fn decode_key(key: &str) -> TokenResult<Vec<u8>> {
    let compact: String = key.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(TokenError::MissingKey);
    }
    hex::decode(&compact).map_err(|e| TokenError::InvalidKeyEncoding(e.to_string()))
}
