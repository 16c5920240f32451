//! Escape-early percent-encoding of untrusted token fields.
//!
//! When escape-early is enabled, the `ip`, `id`, `data` and URL values are
//! percent-encoded before they are emitted or signed. Everything except the
//! unreserved characters (`A-Z`, `a-z`, `0-9`, `-`, `_`, `.`, `~`) becomes
//! `%xx`, and the hex digits of every escape are lower-cased. Edge verifiers
//! re-create the signed string the same way, so the digit case is part of the
//! signature and must not change.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes left untouched by escape-early encoding.
const ESCAPE_EARLY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escape `text` when `escape_early` is set, otherwise return it unchanged.
///
/// # Examples
///
/// ```
/// use edgeauth_token::escape::escape_early;
///
/// assert_eq!(escape_early("hello world", true), "hello%20world");
/// assert_eq!(escape_early("/a/b?c=d", true), "%2fa%2fb%3fc%3dd");
/// assert_eq!(escape_early("hello world", false), "hello world");
/// ```
#[must_use]
pub fn escape_early(text: &str, escape_early: bool) -> Cow<'_, str> {
    if !escape_early {
        return Cow::Borrowed(text);
    }
    Cow::Owned(lowercase_escapes(&percent_encode(text)))
}

fn percent_encode(text: &str) -> String {
    utf8_percent_encode(text, ESCAPE_EARLY_SET).to_string()
}

/// Lower-case the two hex digits following every `%`.
fn lowercase_escapes(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut chars = encoded.chars();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '%' {
            for digit in chars.by_ref().take(2) {
                out.push(digit.to_ascii_lowercase());
            }
        }
    }
    out
}
