//! Plot data export
//!
//! Rendering is left to external tools. This module gathers what a diagnostic
//! plot of a run needs (every sample, every classification event and the
//! test parameters) into one serializable document.

use crate::tester::{RunSummary, SampleTester};
use crate::types::{as_seconds_f64, Label, Result, ServoLockError};
use serde::Serialize;
use std::io::Write;

/// One plotted time error point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub tdelta: f64,
    pub terror: i64,
    /// True if the sample falls inside the transient window (drawn greyed out)
    pub transient: bool,
}

/// One vertical event marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotMarker {
    pub tdelta: f64,
    pub label: Label,
}

/// Everything needed to draw a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    pub stable_ns: u64,
    pub transient_secs: u64,
    pub passed: bool,
    pub summary: RunSummary,
    pub samples: Vec<PlotPoint>,
    pub events: Vec<PlotMarker>,
}

impl PlotData {
    /// Collect plot data from a finished run
    pub fn from_tester(tester: &SampleTester) -> Self {
        let config = tester.config();
        let transient = config.transient();

        let samples = tester
            .samples()
            .iter()
            .map(|s| PlotPoint {
                tdelta: as_seconds_f64(&s.tdelta),
                terror: s.time_error,
                transient: s.tdelta < transient,
            })
            .collect();

        let events = tester
            .events()
            .iter()
            .map(|e| PlotMarker {
                tdelta: as_seconds_f64(&e.sample.tdelta),
                label: e.label,
            })
            .collect();

        Self {
            stable_ns: config.stable_ns,
            transient_secs: config.transient_secs,
            passed: tester.verdict().passed,
            summary: tester.summary(),
            samples,
            events,
        }
    }

    /// Write the document as pretty-printed JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ServoLockError::OutputError(e.to_string()))
    }
}
