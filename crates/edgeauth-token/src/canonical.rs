//! Canonical field assembly for edge tokens.
//!
//! A token is an ordered list of `key=value` fields joined by the field
//! delimiter:
//!
//! ```text
//! [ip=<v>~][st=<v>~]exp=<v>[~acl=<v>][~id=<v>][~data=<v>]~hmac=<hex>
//! ```
//!
//! The string to sign is the same visible list followed by the signed-only
//! fields, `url=<v>` in URL mode and `salt=<v>` when a salt is configured:
//!
//! ```text
//! [ip=<v>~][st=<v>~]exp=<v>[~acl=<v>][~id=<v>][~data=<v>][~url=<v>][~salt=<v>]
//! ```
//!
//! The order is fixed and must match the verifier bit for bit.

use crate::escape::escape_early;
use crate::time::TimeWindow;

/// What a token grants access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single URL path. Signed as `url=`, never emitted.
    Url(String),
    /// One or more path patterns joined by the ACL delimiter. Emitted and signed as `acl=`.
    Acl(String),
}

impl Target {
    /// The raw path or pattern value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Url(v) | Self::Acl(v) => v,
        }
    }

    /// Whether this is a URL target.
    #[must_use]
    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

/// Join ACL path patterns with `delimiter`.
///
/// # Examples
///
/// ```
/// use edgeauth_token::canonical::join_acl;
///
/// assert_eq!(join_acl(["/a", "/a/*"], "!"), "/a!/a/*");
/// ```
#[must_use]
pub fn join_acl<I, S>(patterns: I, delimiter: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| p.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Optional per-token values carried alongside the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenFields<'a> {
    /// Client IP address (`ip=`).
    pub ip: Option<&'a str>,
    /// Session identifier (`id=`).
    pub session_id: Option<&'a str>,
    /// Opaque payload (`data=`).
    pub payload: Option<&'a str>,
    /// Signed-only salt (`salt=`).
    pub salt: Option<&'a str>,
}

/// The assembled visible and signed-only fields of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    visible: Vec<String>,
    signed_only: Vec<String>,
}

impl FieldSet {
    /// Fields emitted in the token, in order, without `hmac=`.
    #[must_use]
    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    /// Fields that only feed the signature, in order.
    #[must_use]
    pub fn signed_only(&self) -> &[String] {
        &self.signed_only
    }

    /// The emitted token body without the `hmac=` field.
    #[must_use]
    pub fn body(&self, delimiter: &str) -> String {
        self.visible.join(delimiter)
    }

    /// The message the HMAC is computed over.
    #[must_use]
    pub fn string_to_sign(&self, delimiter: &str) -> String {
        self.visible
            .iter()
            .chain(&self.signed_only)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// Append `hmac=<hmac>` to the visible fields and join them.
    #[must_use]
    pub fn into_token(mut self, hmac: &str, delimiter: &str) -> String {
        self.visible.push(format!("hmac={hmac}"));
        self.visible.join(delimiter)
    }
}

/// Assemble the visible and signed-only fields for one token.
///
/// `ip`, `id`, `data` and the URL are escaped when `escape` is set. ACL
/// patterns and the salt are trusted and used verbatim.
///
/// # Examples
///
/// ```
/// use edgeauth_token::canonical::{Target, TokenFields, build_field_set};
/// use edgeauth_token::time::TimeWindow;
///
/// let window = TimeWindow { start_time: Some(1000), end_time: 1500 };
/// let fields = build_field_set(
///     &window,
///     &Target::Url("/path".to_owned()),
///     &TokenFields::default(),
///     false,
/// );
/// assert_eq!(fields.body("~"), "st=1000~exp=1500");
/// assert_eq!(fields.string_to_sign("~"), "st=1000~exp=1500~url=/path");
/// ```
#[must_use]
pub fn build_field_set(
    window: &TimeWindow,
    target: &Target,
    fields: &TokenFields<'_>,
    escape: bool,
) -> FieldSet {
    let mut visible = Vec::with_capacity(6);

    if let Some(ip) = fields.ip {
        visible.push(format!("ip={}", escape_early(ip, escape)));
    }
    if let Some(start) = window.start_time {
        visible.push(format!("st={start}"));
    }
    visible.push(format!("exp={}", window.end_time));
    if let Target::Acl(acl) = target {
        visible.push(format!("acl={acl}"));
    }
    if let Some(session_id) = fields.session_id {
        visible.push(format!("id={}", escape_early(session_id, escape)));
    }
    if let Some(payload) = fields.payload {
        visible.push(format!("data={}", escape_early(payload, escape)));
    }

    let mut signed_only = Vec::with_capacity(2);
    if let Target::Url(url) = target {
        signed_only.push(format!("url={}", escape_early(url, escape)));
    }
    if let Some(salt) = fields.salt {
        signed_only.push(format!("salt={salt}"));
    }

    FieldSet {
        visible,
        signed_only,
    }
}
