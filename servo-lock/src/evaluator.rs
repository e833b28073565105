//! Result evaluator
//!
//! Applies the transient-window policy to a classification event log: any
//! event other than `stable` at or after the end of the transient window
//! fails the test.
//!
//! This only looks at labelled events recorded after the window closes, not
//! at the classifier state at the moment it closes. A servo that is still
//! unlocked when the window ends, and never reports an event afterwards,
//! passes.

use crate::types::{duration_from_secs, format_seconds, ClassificationEvent, Label};
use serde::Serialize;
use std::fmt;

/// Outcome of a stability test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    /// Diagnostic lines, in order
    pub detail: Vec<String>,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail.join("\n"))
    }
}

/// Evaluate an event log against a stability threshold and transient window
pub fn evaluate(events: &[ClassificationEvent], stable_ns: u64, transient_secs: u64) -> Verdict {
    let mut detail = vec![format!(
        "Time errors greater than {}ns are significant",
        stable_ns
    )];
    if transient_secs > 0 {
        detail.push(format!("First {}s of logs not significant", transient_secs));
    }

    let transient = duration_from_secs(transient_secs);
    let mut passed = true;
    for event in events
        .iter()
        .filter(|e| e.sample.tdelta >= transient && e.label != Label::Stable)
    {
        passed = false;
        detail.push(format!(
            "Test failed: {} after {}s",
            event.label,
            format_seconds(&event.sample.tdelta)
        ));
    }

    Verdict { passed, detail }
}
