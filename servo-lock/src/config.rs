//! Tester configuration types
//!
//! This module defines the knobs of a stability test run: the stability
//! threshold, the transient grace window and the optional interface filter.

use crate::types::duration_from_secs;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for a stability test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesterConfig {
    /// Time errors with an absolute value above this many nanoseconds are significant
    #[serde(default = "default_stable_ns")]
    pub stable_ns: u64,

    /// Instability in the first this-many seconds of the log is not significant
    #[serde(default)]
    pub transient_secs: u64,

    /// Optional: only process lines for this interface
    #[serde(default)]
    pub interface: Option<String>,
}

fn default_stable_ns() -> u64 {
    40
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            stable_ns: default_stable_ns(),
            transient_secs: 0,
            interface: None,
        }
    }
}

impl TesterConfig {
    /// Create a new tester configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the stability threshold (absolute value is used)
    pub fn with_stable_ns(mut self, stable_ns: i64) -> Self {
        self.stable_ns = stable_ns.unsigned_abs();
        self
    }

    /// Builder method: set the transient window (negative values clamp to 0)
    pub fn with_transient_secs(mut self, transient_secs: i64) -> Self {
        self.transient_secs = transient_secs.max(0) as u64;
        self
    }

    /// Builder method: restrict parsing to one interface
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// The transient window as a duration
    pub fn transient(&self) -> Duration {
        duration_from_secs(self.transient_secs)
    }

    /// Check whether a time error is within the stability threshold
    pub fn is_tight(&self, time_error: i64) -> bool {
        time_error.unsigned_abs() <= self.stable_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tester_config_builder() {
        let config = TesterConfig::new()
            .with_stable_ns(-25)
            .with_transient_secs(-10)
            .with_interface("ens7f1");

        assert_eq!(config.stable_ns, 25);
        assert_eq!(config.transient_secs, 0);
        assert_eq!(config.interface.as_deref(), Some("ens7f1"));
    }

    #[test]
    fn test_defaults() {
        let config = TesterConfig::new();
        assert_eq!(config.stable_ns, 40);
        assert_eq!(config.transient_secs, 0);
        assert!(config.interface.is_none());
        assert_eq!(config.transient(), Duration::zero());
    }

    #[test]
    fn test_tight_is_inclusive() {
        let config = TesterConfig::new().with_stable_ns(40);

        assert!(config.is_tight(0));
        assert!(config.is_tight(40));
        assert!(config.is_tight(-40));
        assert!(!config.is_tight(41));
        assert!(!config.is_tight(-41));
        assert!(!config.is_tight(i64::MIN));
    }
}
