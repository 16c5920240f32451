//! Validity window resolution.
//!
//! A token carries an optional start time (`st=`) and a mandatory expiry
//! (`exp=`), both as UTC epoch seconds. Callers may supply either bound
//! directly, ask for the start to be "now", or give only a window length from
//! which the expiry is derived. [`resolve_window`] turns those inputs into a
//! concrete [`TimeWindow`] or fails with a [`TokenError`].
//!
//! All reads of the current time go through a [`Clock`], so resolution never
//! depends on ambient process state such as the local timezone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{TokenError, TokenResult};

/// Source of the current UTC time in epoch seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current UTC time as seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// Wall clock backed by [`chrono::Utc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock frozen at a fixed instant.
///
/// # Examples
///
/// ```
/// use edgeauth_token::time::{Clock, FixedClock};
///
/// assert_eq!(FixedClock(1_500_000_000).now(), 1_500_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// When a token starts being valid.
///
/// Absence of a start time is expressed as `Option::<StartTime>::None`, in
/// which case no `st=` field is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTime {
    /// The moment the token is generated.
    Now,
    /// A fixed instant in UTC epoch seconds.
    At(i64),
}

impl FromStr for StartTime {
    type Err = TokenError;

    /// Parse `now` (case-insensitive) or an integer number of epoch seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("now") {
            return Ok(Self::Now);
        }
        s.parse::<i64>()
            .map(Self::At)
            .map_err(|_| TokenError::InvalidTime("start_time must be numeric or now".to_owned()))
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("now"),
            Self::At(t) => write!(f, "{t}"),
        }
    }
}

impl From<i64> for StartTime {
    fn from(value: i64) -> Self {
        Self::At(value)
    }
}

impl Serialize for StartTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Now => serializer.serialize_str("now"),
            Self::At(t) => serializer.serialize_i64(*t),
        }
    }
}

impl<'de> Deserialize<'de> for StartTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Epoch(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Epoch(t) => Ok(Self::At(t)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Parse an end time given as text.
///
/// # Errors
///
/// Returns [`TokenError::InvalidTime`] if `s` is not an integer.
pub fn parse_end_time(s: &str) -> TokenResult<i64> {
    s.trim()
        .parse()
        .map_err(|_| TokenError::InvalidTime("end_time must be numeric".to_owned()))
}

/// Parse a window length given as text.
///
/// Positivity is checked at resolution time, see [`resolve_window`].
///
/// # Errors
///
/// Returns [`TokenError::InvalidTime`] if `s` is not an integer.
pub fn parse_window_seconds(s: &str) -> TokenResult<i64> {
    s.trim()
        .parse()
        .map_err(|_| TokenError::InvalidTime("window_seconds must be numeric".to_owned()))
}

/// A resolved validity window in UTC epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start of validity, emitted as `st=` when present.
    pub start_time: Option<i64>,
    /// End of validity, always emitted as `exp=`.
    pub end_time: i64,
}

/// Resolve start, end and window inputs into a concrete [`TimeWindow`].
///
/// Rules, applied in order:
///
/// 1. [`StartTime::Now`] becomes `clock.now()`. Negative start times are rejected.
/// 2. Negative end times are rejected.
/// 3. A window, when given, must be strictly positive.
/// 4. Without an end time, `end = (start or now) + window`; a window is then required.
/// 5. With a start time, the end must be strictly after it.
///
/// # Errors
///
/// - [`TokenError::InvalidTime`] for negative bounds or an overflowing expiry
/// - [`TokenError::NonPositiveWindow`] for a window `<= 0`
/// - [`TokenError::MissingExpiry`] if neither an end time nor a window is given
/// - [`TokenError::AlreadyExpired`] if `end_time <= start_time`
///
/// # Examples
///
/// ```
/// use edgeauth_token::time::{FixedClock, StartTime, resolve_window};
///
/// let window = resolve_window(Some(StartTime::Now), None, Some(500), &FixedClock(1000)).unwrap();
/// assert_eq!(window.start_time, Some(1000));
/// assert_eq!(window.end_time, 1500);
/// ```
pub fn resolve_window(
    start_time: Option<StartTime>,
    end_time: Option<i64>,
    window_seconds: Option<i64>,
    clock: &dyn Clock,
) -> TokenResult<TimeWindow> {
    let start_time = match start_time {
        None => None,
        Some(StartTime::Now) => Some(clock.now()),
        Some(StartTime::At(t)) if t < 0 => {
            return Err(TokenError::InvalidTime(
                "start_time must be ( >= 0 )".to_owned(),
            ));
        }
        Some(StartTime::At(t)) => Some(t),
    };

    if end_time.is_some_and(|t| t < 0) {
        return Err(TokenError::InvalidTime("end_time must be ( >= 0 )".to_owned()));
    }

    if let Some(window) = window_seconds {
        if window <= 0 {
            return Err(TokenError::NonPositiveWindow(window));
        }
    }

    let end_time = match (end_time, window_seconds) {
        (Some(end), _) => end,
        (None, Some(window)) => {
            let base = start_time.unwrap_or_else(|| clock.now());
            base.checked_add(window)
                .ok_or_else(|| TokenError::InvalidTime("end_time overflows".to_owned()))?
        }
        (None, None) => return Err(TokenError::MissingExpiry),
    };

    if let Some(start) = start_time {
        if end_time <= start {
            return Err(TokenError::AlreadyExpired {
                start_time: start,
                end_time,
            });
        }
    }

    debug!(?start_time, end_time, ?window_seconds, "Resolved token validity window");

    Ok(TimeWindow {
        start_time,
        end_time,
    })
}
