//! Core types for the servo lock classifier
//!
//! This module defines the records produced by the log parser, the samples fed
//! into the stability classifier and the classification events it emits.

use chrono::Duration;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Timestamp type used throughout the classifier
///
/// ts2phc stamps each line with the host's uptime in seconds, millisecond
/// resolution. Kept as an exact duration so that `tdelta` arithmetic never
/// goes through floating point.
pub type Timestamp = Duration;

/// Result type for classifier operations
pub type Result<T> = std::result::Result<T, ServoLockError>;

/// Errors that can occur while reading and classifying a log
#[derive(Debug, thiserror::Error)]
pub enum ServoLockError {
    #[error("Failed to open input {path:?}: {source}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid line pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Failed to write output: {0}")]
    OutputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Servo state reported by ts2phc on each offset line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServoState {
    /// Servo unlocked, initializing or reset
    S0,
    /// Servo stepping the clock, acquiring lock
    S1,
    /// Servo locked
    S2,
}

impl ServoState {
    /// The token ts2phc prints for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            ServoState::S0 => "s0",
            ServoState::S1 => "s1",
            ServoState::S2 => "s2",
        }
    }
}

impl fmt::Display for ServoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServoState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "s0" => Ok(ServoState::S0),
            "s1" => Ok(ServoState::S1),
            "s2" => Ok(ServoState::S2),
            other => Err(format!("unknown servo state: {}", other)),
        }
    }
}

/// One matching ts2phc log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRecord {
    /// Host uptime at which the line was logged
    #[serde(serialize_with = "serialize_seconds")]
    pub timestamp: Timestamp,
    /// Network interface the offset was measured on
    pub interface: String,
    /// Master offset in nanoseconds
    #[serde(rename = "terror")]
    pub time_error: i64,
    /// Servo state token
    #[serde(rename = "state")]
    pub servo_state: ServoState,
}

/// A time error sample relative to the first record of a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    /// Time elapsed since the first record
    #[serde(serialize_with = "serialize_seconds")]
    pub tdelta: Duration,
    /// Master offset in nanoseconds
    #[serde(rename = "terror")]
    pub time_error: i64,
}

impl Sample {
    pub fn new(tdelta: Duration, time_error: i64) -> Self {
        Self { tdelta, time_error }
    }
}

/// Classification emitted by the stability classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Stable,
    Wobble,
    Unstable,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Stable => write!(f, "stable"),
            Label::Wobble => write!(f, "wobble"),
            Label::Unstable => write!(f, "unstable"),
        }
    }
}

/// A labelled sample, recorded whenever the classifier fires an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationEvent {
    pub sample: Sample,
    pub label: Label,
}

/// Format a duration as decimal seconds with millisecond precision (`2.000`)
pub fn format_seconds(duration: &Duration) -> String {
    let millis = duration.num_milliseconds();
    let sign = if millis < 0 { "-" } else { "" };
    let millis = millis.unsigned_abs();
    format!("{}{}.{:03}", sign, millis / 1000, millis % 1000)
}

/// Whole seconds as a duration, saturating at the largest representable value
pub fn duration_from_secs(secs: u64) -> Duration {
    const MAX_SECS: u64 = (i64::MAX / 1000) as u64;
    Duration::seconds(secs.min(MAX_SECS) as i64)
}

/// Convert a duration to floating point seconds (lossy, serialization only)
pub fn as_seconds_f64(duration: &Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

fn serialize_seconds<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(as_seconds_f64(duration))
}
