//! Time gates
//!
//! A gate opens once the current time reaches a threshold stored under a
//! config key. [`evaluate`] is a pure function of the key, the stored value
//! and `now`; the caller owns the storage read and the clock.
//!
//! Stored values are parsed as written. An explicit offset is honoured, a
//! value without one is read as UTC. There is no timezone setting on top of
//! that, so an operator who stores a local wall-clock time without an offset
//! shifts the gate by the local UTC offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Milliseconds in one day, the unit of `days_remaining`
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Offset-carrying formats beyond RFC 3339 (e.g. Postgres `timestamptz::text`)
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Formats without an offset, read as UTC
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Config keys that hold gate thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKey {
    /// Organizer contacts become visible
    #[serde(rename = "CONTACT_DATE")]
    ContactDate,

    /// Payment form and payment data endpoints open
    #[serde(rename = "PAYMENT_OPEN_DATE")]
    PaymentOpenDate,
}

impl GateKey {
    pub const ALL: [GateKey; 2] = [GateKey::ContactDate, GateKey::PaymentOpenDate];

    /// Storage key of this gate
    pub fn as_str(&self) -> &'static str {
        match self {
            GateKey::ContactDate => "CONTACT_DATE",
            GateKey::PaymentOpenDate => "PAYMENT_OPEN_DATE",
        }
    }

    /// Whether the gate is open when no threshold is stored.
    ///
    /// Contacts are open by default, payments are closed by default. The
    /// asymmetry is product behaviour and must not be unified.
    pub fn default_open(&self) -> bool {
        match self {
            GateKey::ContactDate => true,
            GateKey::PaymentOpenDate => false,
        }
    }
}

impl fmt::Display for GateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gate evaluation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Malformed timestamp stored under {key}: {value:?}")]
    MalformedTimestamp { key: GateKey, value: String },
}

/// Outcome of comparing `now` against a gate threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateStatus {
    pub key: GateKey,

    /// Stored value, verbatim
    pub date: Option<String>,

    /// Parsed threshold
    pub threshold: Option<DateTime<Utc>>,

    pub is_open: bool,

    /// Whole days until the gate opens, rounded up. Only set while closed
    /// with a known threshold.
    pub days_remaining: Option<i64>,
}

impl GateStatus {
    /// Whether the key had a stored threshold
    pub fn is_configured(&self) -> bool {
        self.threshold.is_some()
    }
}

/// Parse a stored threshold.
///
/// Accepts RFC 3339, offset-suffixed date-times with a space separator, naive
/// date-times and bare dates. Naive values are read as UTC.
pub fn parse_threshold(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// `ceil((threshold - now) / 1 day)`, or 0 once the threshold has passed
pub fn days_remaining(threshold: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (threshold - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Evaluate a gate.
///
/// `stored` is the raw config value; `None` or a blank string means the key
/// is unconfigured and the key's default applies.
pub fn evaluate(
    key: GateKey,
    stored: Option<&str>,
    now: DateTime<Utc>,
) -> Result<GateStatus, GateError> {
    let raw = match stored.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => {
            return Ok(GateStatus {
                key,
                date: None,
                threshold: None,
                is_open: key.default_open(),
                days_remaining: None,
            })
        }
    };

    let threshold = parse_threshold(raw).ok_or_else(|| GateError::MalformedTimestamp {
        key,
        value: raw.to_string(),
    })?;

    let is_open = now >= threshold;

    Ok(GateStatus {
        key,
        date: Some(raw.to_string()),
        threshold: Some(threshold),
        is_open,
        days_remaining: if is_open {
            None
        } else {
            Some(days_remaining(threshold, now))
        },
    })
}
