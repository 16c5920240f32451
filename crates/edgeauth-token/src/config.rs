//! Token generator configuration.
//!
//! Provides [`TokenConfig`], the long-lived settings shared by every token a
//! generator produces. Values can be built in code via the typed builder,
//! deserialized, or loaded from environment variables.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{TokenError, TokenResult};
use crate::key;
use crate::signer::Algorithm;
use crate::time::{StartTime, parse_end_time, parse_window_seconds};

/// Default name under which the token is attached to a request.
pub const DEFAULT_TOKEN_NAME: &str = "__token__";

/// Default separator between `key=value` fields.
pub const DEFAULT_FIELD_DELIMITER: &str = "~";

/// Default separator between ACL path patterns.
pub const DEFAULT_ACL_DELIMITER: &str = "!";

/// Token generator configuration.
///
/// The `field_delimiter` must never occur inside a field value. This is not
/// checked.
///
/// # Examples
///
/// ```
/// use edgeauth_token::config::TokenConfig;
/// use edgeauth_token::signer::Algorithm;
///
/// let config = TokenConfig::builder()
///     .key("abcdef0123456789")
///     .window_seconds(500)
///     .build();
/// assert_eq!(config.token_name, "__token__");
/// assert_eq!(config.algorithm, Algorithm::Sha256);
/// assert_eq!(config.field_delimiter, "~");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    /// Informational label; not part of the token.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub token_type: Option<String>,

    /// Query parameter, cookie or header name the caller attaches the token under.
    #[builder(default = String::from(DEFAULT_TOKEN_NAME), setter(into))]
    #[serde(default = "default_token_name")]
    pub token_name: String,

    /// Hex-encoded secret shared with the edge. Whitespace is ignored.
    #[builder(setter(into))]
    pub key: String,

    /// HMAC digest algorithm.
    #[builder(default)]
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Extra secret appended to the signed string only.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub salt: Option<String>,

    /// Default start of validity.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub start_time: Option<StartTime>,

    /// Default end of validity in epoch seconds.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub end_time: Option<i64>,

    /// Default validity duration used when no end time is given.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub window_seconds: Option<i64>,

    /// Separator between `key=value` fields.
    #[builder(default = String::from(DEFAULT_FIELD_DELIMITER), setter(into))]
    #[serde(default = "default_field_delimiter")]
    pub field_delimiter: String,

    /// Separator between ACL path patterns.
    #[builder(default = String::from(DEFAULT_ACL_DELIMITER), setter(into))]
    #[serde(default = "default_acl_delimiter")]
    pub acl_delimiter: String,

    /// Percent-encode `ip`, `id`, `data` and the URL before signing.
    #[builder(default = false)]
    #[serde(default)]
    pub escape_early: bool,

    /// Client IP bound into URL/ACL tokens.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub ip: Option<String>,

    /// Opaque data carried in URL/ACL tokens.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub payload: Option<String>,

    /// Session identifier carried in URL/ACL tokens.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub session_id: Option<String>,

    /// Log the resolved generation parameters at `info` level.
    #[builder(default = false)]
    #[serde(default)]
    pub verbose: bool,
}

fn default_token_name() -> String {
    DEFAULT_TOKEN_NAME.to_owned()
}

fn default_field_delimiter() -> String {
    DEFAULT_FIELD_DELIMITER.to_owned()
}

fn default_acl_delimiter() -> String {
    DEFAULT_ACL_DELIMITER.to_owned()
}

impl TokenConfig {
    /// Check the invariants that must hold before any token is generated.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingKey`] if the key is empty or whitespace.
    pub fn validate(&self) -> TokenResult<()> {
        if key::is_blank(&self.key) {
            return Err(TokenError::MissingKey);
        }
        Ok(())
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `EDGEAUTH_KEY` | *(required)* |
    /// | `EDGEAUTH_TOKEN_TYPE` | *(unset)* |
    /// | `EDGEAUTH_TOKEN_NAME` | `__token__` |
    /// | `EDGEAUTH_ALGORITHM` | `sha256` |
    /// | `EDGEAUTH_SALT` | *(unset)* |
    /// | `EDGEAUTH_START_TIME` | *(unset)*, integer or `now` |
    /// | `EDGEAUTH_END_TIME` | *(unset)* |
    /// | `EDGEAUTH_WINDOW_SECONDS` | *(unset)* |
    /// | `EDGEAUTH_FIELD_DELIMITER` | `~` |
    /// | `EDGEAUTH_ACL_DELIMITER` | `!` |
    /// | `EDGEAUTH_ESCAPE_EARLY` | `false` |
    /// | `EDGEAUTH_IP` | *(unset)* |
    /// | `EDGEAUTH_PAYLOAD` | *(unset)* |
    /// | `EDGEAUTH_SESSION_ID` | *(unset)* |
    /// | `EDGEAUTH_VERBOSE` | `false` |
    ///
    /// # Errors
    ///
    /// Fails with [`TokenError::MissingKey`] without a key, and with the
    /// parse errors of the individual values otherwise.
    pub fn from_env() -> TokenResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`TokenConfig::from_env`].
    ///
    /// # Examples
    ///
    /// ```
    /// use edgeauth_token::config::TokenConfig;
    ///
    /// let config = TokenConfig::from_lookup(|name| match name {
    ///     "EDGEAUTH_KEY" => Some("abcdef0123456789".to_owned()),
    ///     "EDGEAUTH_WINDOW_SECONDS" => Some("300".to_owned()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.window_seconds, Some(300));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> TokenResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let key = var("EDGEAUTH_KEY").ok_or(TokenError::MissingKey)?;
        let mut config = Self::builder().key(key).build();

        config.token_type = var("EDGEAUTH_TOKEN_TYPE");
        if let Some(v) = var("EDGEAUTH_TOKEN_NAME") {
            config.token_name = v;
        }
        if let Some(v) = var("EDGEAUTH_ALGORITHM") {
            config.algorithm = v.parse()?;
        }
        config.salt = var("EDGEAUTH_SALT");
        config.start_time = var("EDGEAUTH_START_TIME")
            .map(|v| v.parse::<StartTime>())
            .transpose()?;
        config.end_time = var("EDGEAUTH_END_TIME")
            .map(|v| parse_end_time(&v))
            .transpose()?;
        config.window_seconds = var("EDGEAUTH_WINDOW_SECONDS")
            .map(|v| parse_window_seconds(&v))
            .transpose()?;
        if let Some(v) = var("EDGEAUTH_FIELD_DELIMITER") {
            config.field_delimiter = v;
        }
        if let Some(v) = var("EDGEAUTH_ACL_DELIMITER") {
            config.acl_delimiter = v;
        }
        if let Some(v) = var("EDGEAUTH_ESCAPE_EARLY") {
            config.escape_early = parse_bool(&v);
        }
        config.ip = var("EDGEAUTH_IP");
        config.payload = var("EDGEAUTH_PAYLOAD");
        config.session_id = var("EDGEAUTH_SESSION_ID");
        if let Some(v) = var("EDGEAUTH_VERBOSE") {
            config.verbose = parse_bool(&v);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
