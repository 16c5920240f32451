//! Token generation front-ends.
//!
//! A [`TokenGenerator`] owns an immutable [`TokenConfig`] and exposes two
//! ways to produce a [`Token`]:
//!
//! - [`TokenGenerator::generate`] takes a [`GenerationRequest`] carrying the
//!   URL or ACL plus per-call `ip`, `payload`, `session_id` and time overrides,
//!   each falling back to the configuration when absent.
//! - [`TokenGenerator::generate_url_token`] and
//!   [`TokenGenerator::generate_acl_token`] take only the target and use the
//!   `ip`, `payload` and `session_id` stored in the configuration.
//!
//! Both resolve the validity window, assemble the fields and sign them the
//! same way. Key rotation or escape-early toggling means building another
//! generator from a modified copy of the configuration.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use typed_builder::TypedBuilder;

use crate::canonical::{Target, TokenFields, build_field_set, join_acl};
use crate::config::TokenConfig;
use crate::error::{TokenError, TokenResult};
use crate::signer::sign;
use crate::time::{Clock, StartTime, SystemClock, TimeWindow, resolve_window};

/// A generated token together with the name it should be attached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    name: String,
    value: String,
    delimiter: String,
}

impl Token {
    /// The token string, e.g. `exp=1500~hmac=...`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consume the token and return the token string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.value
    }

    /// Query parameter, cookie or header name to attach the token under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over `(key, value)` pairs in emitted order, `hmac` last.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.value
            .split(self.delimiter.as_str())
            .map(|field| field.split_once('=').unwrap_or((field, "")))
    }

    /// Value of the named field, if present.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// The hex-encoded HMAC.
    #[must_use]
    pub fn hmac(&self) -> &str {
        self.field("hmac").unwrap_or_default()
    }

    /// `name=value` pair for a query string or a `Cookie` header.
    #[must_use]
    pub fn to_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// A single direct-request generation call.
///
/// Exactly one of `url` and `acl` must be set; empty strings count as unset.
/// Every other value falls back to the generator configuration when absent.
///
/// # Examples
///
/// ```
/// use edgeauth_token::generator::GenerationRequest;
///
/// let request = GenerationRequest::builder()
///     .acl("/videos/*")
///     .session_id("abc")
///     .window_seconds(60)
///     .build();
/// assert_eq!(request.acl.as_deref(), Some("/videos/*"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct GenerationRequest {
    /// URL path to authorize.
    #[builder(default, setter(strip_option, into))]
    pub url: Option<String>,
    /// ACL pattern(s) to authorize, already joined with the ACL delimiter.
    #[builder(default, setter(strip_option, into))]
    pub acl: Option<String>,
    /// Start of validity, overriding the configuration.
    #[builder(default, setter(strip_option, into))]
    pub start_time: Option<StartTime>,
    /// End of validity, overriding the configuration.
    #[builder(default, setter(strip_option))]
    pub end_time: Option<i64>,
    /// Validity duration, overriding the configuration.
    #[builder(default, setter(strip_option))]
    pub window_seconds: Option<i64>,
    /// Client IP address.
    #[builder(default, setter(strip_option, into))]
    pub ip: Option<String>,
    /// Opaque payload.
    #[builder(default, setter(strip_option, into))]
    pub payload: Option<String>,
    /// Session identifier.
    #[builder(default, setter(strip_option, into))]
    pub session_id: Option<String>,
}

impl GenerationRequest {
    fn target(&self) -> TokenResult<Target> {
        let url = self.url.as_deref().filter(|s| !s.is_empty());
        let acl = self.acl.as_deref().filter(|s| !s.is_empty());
        match (url, acl) {
            (Some(url), None) => Ok(Target::Url(url.to_owned())),
            (None, Some(acl)) => Ok(Target::Acl(acl.to_owned())),
            _ => Err(TokenError::MissingTarget),
        }
    }
}

/// Generates edge authorization tokens from an immutable configuration.
///
/// `TokenGenerator` is `Send + Sync` and can be shared across threads.
///
/// # Examples
///
/// ```
/// use edgeauth_token::config::TokenConfig;
/// use edgeauth_token::generator::TokenGenerator;
/// use edgeauth_token::time::FixedClock;
///
/// let config = TokenConfig::builder()
///     .key("abcdef0123456789")
///     .window_seconds(500)
///     .build();
/// let generator = TokenGenerator::new(config)
///     .unwrap()
///     .with_clock(FixedClock(1000));
///
/// let token = generator.generate_url_token("/path").unwrap();
/// assert_eq!(token.field("exp"), Some("1500"));
/// assert_eq!(token.hmac().len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    config: TokenConfig,
    clock: Arc<dyn Clock>,
}

impl TokenGenerator {
    /// Create a generator using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingKey`] if the configured key is empty.
    pub fn new(config: TokenConfig) -> TokenResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used to resolve `now`.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The configuration this generator was built from.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Generate a token for the URL or ACL in `request`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::MissingTarget`] unless exactly one of `url` and `acl` is set
    /// - any validity window error, see [`resolve_window`]
    /// - [`TokenError::InvalidKeyEncoding`] if the key is not hexadecimal
    pub fn generate(&self, request: &GenerationRequest) -> TokenResult<Token> {
        let target = request.target()?;
        let window_seconds = request.window_seconds.or(self.config.window_seconds);
        let window = resolve_window(
            request.start_time.or(self.config.start_time),
            request.end_time.or(self.config.end_time),
            window_seconds,
            self.clock.as_ref(),
        )?;
        let fields = TokenFields {
            ip: request.ip.as_deref().or(self.config.ip.as_deref()),
            session_id: request
                .session_id
                .as_deref()
                .or(self.config.session_id.as_deref()),
            payload: request
                .payload
                .as_deref()
                .or(self.config.payload.as_deref()),
            salt: self.config.salt.as_deref(),
        };
        self.build_token(&target, &window, &fields, window_seconds)
    }

    /// Generate a token for a single URL using the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingTarget`] if `url` is empty, and the errors
    /// of [`TokenGenerator::generate`] otherwise.
    pub fn generate_url_token(&self, url: &str) -> TokenResult<Token> {
        if url.is_empty() {
            return Err(TokenError::MissingTarget);
        }
        self.generate_from_config(&Target::Url(url.to_owned()))
    }

    /// Generate a token for one or more ACL patterns using the configured defaults.
    ///
    /// Patterns are joined with the configured ACL delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingTarget`] if no non-empty pattern is given,
    /// and the errors of [`TokenGenerator::generate`] otherwise.
    pub fn generate_acl_token<I, S>(&self, acl: I) -> TokenResult<Token>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let acl = join_acl(acl, &self.config.acl_delimiter);
        if acl.is_empty() {
            return Err(TokenError::MissingTarget);
        }
        self.generate_from_config(&Target::Acl(acl))
    }

    fn generate_from_config(&self, target: &Target) -> TokenResult<Token> {
        let window = resolve_window(
            self.config.start_time,
            self.config.end_time,
            self.config.window_seconds,
            self.clock.as_ref(),
        )?;
        let fields = TokenFields {
            ip: self.config.ip.as_deref(),
            session_id: self.config.session_id.as_deref(),
            payload: self.config.payload.as_deref(),
            salt: self.config.salt.as_deref(),
        };
        self.build_token(target, &window, &fields, self.config.window_seconds)
    }

    fn build_token(
        &self,
        target: &Target,
        window: &TimeWindow,
        fields: &TokenFields<'_>,
        window_seconds: Option<i64>,
    ) -> TokenResult<Token> {
        let config = &self.config;
        self.log_parameters(target, window, fields, window_seconds);

        let field_set = build_field_set(window, target, fields, config.escape_early);
        let string_to_sign = field_set.string_to_sign(&config.field_delimiter);

        debug!(string_to_sign, "Built token string to sign");

        let hmac = sign(config.algorithm, &config.key, &string_to_sign)?;

        Ok(Token {
            name: config.token_name.clone(),
            value: field_set.into_token(&hmac, &config.field_delimiter),
            delimiter: config.field_delimiter.clone(),
        })
    }

    fn log_parameters(
        &self,
        target: &Target,
        window: &TimeWindow,
        fields: &TokenFields<'_>,
        window_seconds: Option<i64>,
    ) {
        let config = &self.config;
        macro_rules! emit {
            ($level:ident) => {
                $level!(
                    token_type = ?config.token_type,
                    token_name = %config.token_name,
                    start_time = ?window.start_time,
                    end_time = window.end_time,
                    window_seconds = ?window_seconds,
                    ip = ?fields.ip,
                    url = ?target.is_url().then_some(target.value()),
                    acl = ?(!target.is_url()).then_some(target.value()),
                    payload = ?fields.payload,
                    algorithm = %config.algorithm,
                    salted = fields.salt.is_some(),
                    session_id = ?fields.session_id,
                    field_delimiter = %config.field_delimiter,
                    acl_delimiter = %config.acl_delimiter,
                    escape_early = config.escape_early,
                    "Edge token generation parameters"
                )
            };
        }

        if config.verbose {
            emit!(info);
        } else {
            emit!(debug);
        }
    }
}
