//! HMAC computation over the canonical string to sign.
//!
//! The edge recomputes `HMAC(key, string_to_sign)` with the same digest and
//! compares it against the `hmac=` field. The digest is always rendered as
//! lowercase hexadecimal.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, KeyInit, Mac};
use md5::Md5;
use serde::{Deserialize, Deserializer, Serialize};
use sha1::Sha1;
use sha2::Sha256;

use crate::error::{TokenError, TokenResult};
use crate::key::decode_key;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;
type HmacMd5 = Hmac<Md5>;

/// Digest algorithm used for the token HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// HMAC-SHA256, the default.
    #[default]
    Sha256,
    /// HMAC-SHA1.
    Sha1,
    /// HMAC-MD5.
    Md5,
}

impl Algorithm {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
        }
    }

    /// Length of the hex-encoded digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha1 => 40,
            Self::Md5 => 32,
        }
    }
}

impl FromStr for Algorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            _ => Err(TokenError::UnsupportedAlgorithm(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the hex-encoded HMAC of `string_to_sign` under raw `key` bytes.
///
/// # Examples
///
/// ```
/// use edgeauth_token::signer::{Algorithm, compute_hmac};
///
/// let mac = compute_hmac(Algorithm::Md5, b"key", "data");
/// assert_eq!(mac.len(), 32);
/// ```
#[must_use]
pub fn compute_hmac(algorithm: Algorithm, key: &[u8], string_to_sign: &str) -> String {
    match algorithm {
        Algorithm::Sha256 => {
            let mut mac =
                HmacSha256::new_from_slice(key).expect("HMAC can accept any key length");
            mac.update(string_to_sign.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        Algorithm::Sha1 => {
            let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can accept any key length");
            mac.update(string_to_sign.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        Algorithm::Md5 => {
            let mut mac = HmacMd5::new_from_slice(key).expect("HMAC can accept any key length");
            mac.update(string_to_sign.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
    }
}

/// Decode a hex key and sign `string_to_sign` with it.
///
/// # Errors
///
/// Returns [`TokenError::MissingKey`] or [`TokenError::InvalidKeyEncoding`]
/// if the key cannot be decoded.
pub fn sign(algorithm: Algorithm, hex_key: &str, string_to_sign: &str) -> TokenResult<String> {
    let key = decode_key(hex_key)?;
    Ok(compute_hmac(algorithm, &key, string_to_sign))
}
