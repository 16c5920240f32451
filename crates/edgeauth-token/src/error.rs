//! Error types for edge token generation.
//!
//! Every failure is a synchronous validation error. No partial token is ever
//! produced: when a [`TokenError`] is returned the caller must not attach
//! anything to the outgoing request.

/// Errors that can occur while configuring a generator or producing a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The secret key is absent or empty.
    #[error("You must provide a secret in order to generate a new token")]
    MissingKey,

    /// Neither or both of a URL and an ACL were supplied.
    #[error("You must provide a URL or an ACL")]
    MissingTarget,

    /// A start time, end time or window could not be interpreted.
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// The window used to derive an expiry is zero or negative.
    #[error("window_seconds must be ( > 0 ), got {0}")]
    NonPositiveWindow(i64),

    /// No end time was supplied and there is no window to derive one from.
    #[error("You must provide an expiration time or a duration window")]
    MissingExpiry,

    /// The resolved end time is not after the resolved start time.
    #[error("Token will have already expired (start_time={start_time}, end_time={end_time})")]
    AlreadyExpired {
        /// Resolved start time in epoch seconds.
        start_time: i64,
        /// Resolved end time in epoch seconds.
        end_time: i64,
    },

    /// The digest algorithm is not one of `sha256`, `sha1` or `md5`.
    #[error("Unknown algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key is not valid hexadecimal once whitespace is removed.
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
}

/// Convenience result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
