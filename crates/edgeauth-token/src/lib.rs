//! Edge authorization token generation.
//!
//! This crate produces short-lived, tamper-evident tokens that a CDN edge uses
//! to gate access to a URL or a set of URL patterns (an ACL). The token is
//! attached to the request as a query parameter, cookie or header; the edge
//! recomputes the HMAC and rejects the request on mismatch or expiry.
//!
//! # Overview
//!
//! Generating a token takes four steps:
//!
//! 1. Resolve the validity window from start, end and window inputs ([`time`]).
//! 2. Optionally percent-escape untrusted values ([`escape`]).
//! 3. Assemble the visible and signed-only fields in canonical order ([`canonical`]).
//! 4. Compute the HMAC over the signed string and append it ([`signer`]).
//!
//! Verification is the edge's job and is not implemented here.
//!
//! # Usage
//!
//! ```rust
//! use edgeauth_token::{GenerationRequest, TokenConfig, TokenGenerator};
//!
//! let config = TokenConfig::builder()
//!     .key("abcdef0123456789")
//!     .window_seconds(300)
//!     .build();
//! let generator = TokenGenerator::new(config).unwrap();
//!
//! // One URL, values configured on the generator.
//! let token = generator.generate_url_token("/videos/intro.mp4").unwrap();
//! assert!(token.as_str().starts_with("exp="));
//!
//! // An ACL with per-call values.
//! let request = GenerationRequest::builder()
//!     .acl("/videos/*")
//!     .session_id("user-42")
//!     .build();
//! let token = generator.generate(&request).unwrap();
//! assert_eq!(token.field("acl"), Some("/videos/*"));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Visible and signed field assembly
//! - [`config`] - Generator configuration and environment loading
//! - [`error`] - Token error types
//! - [`escape`] - Escape-early percent-encoding
//! - [`generator`] - Direct-request and URL/ACL front-ends
//! - [`key`] - Hex secret decoding
//! - [`signer`] - HMAC computation
//! - [`time`] - Validity window resolution and clocks

pub mod canonical;
pub mod config;
pub mod error;
pub mod escape;
pub mod generator;
pub mod key;
pub mod signer;
pub mod time;

pub use canonical::Target;
pub use config::TokenConfig;
pub use error::{TokenError, TokenResult};
pub use generator::{GenerationRequest, Token, TokenGenerator};
pub use signer::Algorithm;
pub use time::{Clock, FixedClock, StartTime, SystemClock};
