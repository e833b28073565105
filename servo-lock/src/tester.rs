//! Sample tester
//!
//! Drives a [`StabilityClassifier`] one parsed record at a time and keeps the
//! append-only log of classification events for later evaluation.

use crate::config::TesterConfig;
use crate::evaluator::{evaluate, Verdict};
use crate::fsm::{Callbacks, FsmState, StabilityClassifier};
use crate::types::{ClassificationEvent, Label, ParsedRecord, Result, Sample, Timestamp};
use serde::Serialize;
use std::fmt;

/// Callback side of the tester: the guard plus the event log the actions append to
#[derive(Debug)]
struct EventLog {
    config: TesterConfig,
    events: Vec<ClassificationEvent>,
}

impl EventLog {
    fn record(&mut self, sample: &Sample, label: Label) {
        log::debug!(
            "{} at {}s (time error {}ns)",
            label,
            crate::types::format_seconds(&sample.tdelta),
            sample.time_error
        );
        self.events.push(ClassificationEvent {
            sample: *sample,
            label,
        });
    }
}

impl Callbacks for EventLog {
    fn condition_tight(&self, sample: &Sample) -> bool {
        self.config.is_tight(sample.time_error)
    }

    fn action_stable(&mut self, sample: &Sample) {
        self.record(sample, Label::Stable);
    }

    fn action_wobble(&mut self, sample: &Sample) {
        self.record(sample, Label::Wobble);
    }

    fn action_unstable(&mut self, sample: &Sample) {
        self.record(sample, Label::Unstable);
    }
}

/// Drives one stability test run
#[derive(Debug)]
pub struct SampleTester {
    fsm: StabilityClassifier,
    log: EventLog,
    /// Timestamp of the first record, fixed for the whole run
    tzero: Option<Timestamp>,
    samples: Vec<Sample>,
}

impl SampleTester {
    /// Create a tester for a new run
    pub fn new(config: TesterConfig) -> Self {
        Self {
            fsm: StabilityClassifier::new(),
            log: EventLog {
                config,
                events: Vec::new(),
            },
            tzero: None,
            samples: Vec::new(),
        }
    }

    /// Feed one parsed record into the classifier
    ///
    /// Returns the classification fired by this record, if any.
    pub fn process(&mut self, record: &ParsedRecord) -> Option<Label> {
        let tzero = *self.tzero.get_or_insert(record.timestamp);
        let sample = Sample::new(record.timestamp - tzero, record.time_error);

        let label = self.fsm.inject(record.servo_state, &sample, &mut self.log);
        self.samples.push(sample);
        label
    }

    /// Feed every record of a parsed stream, stopping at the first read error
    ///
    /// Returns the number of records processed.
    pub fn run<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<ParsedRecord>>,
    {
        let mut count = 0;
        for record in records {
            self.process(&record?);
            count += 1;
        }
        log::debug!("Processed {} records, classifier now {}", count, self.fsm.state());
        Ok(count)
    }

    /// Configuration of this run
    pub fn config(&self) -> &TesterConfig {
        &self.log.config
    }

    /// Current classifier state
    pub fn state(&self) -> FsmState {
        self.fsm.state()
    }

    /// Timestamp of the first record, once one has been seen
    pub fn tzero(&self) -> Option<Timestamp> {
        self.tzero
    }

    /// Every sample seen so far, in input order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Classification events recorded so far, in input order
    pub fn events(&self) -> &[ClassificationEvent] {
        &self.log.events
    }

    /// Pass/fail verdict over the events recorded so far
    pub fn verdict(&self) -> Verdict {
        let config = self.config();
        evaluate(self.events(), config.stable_ns, config.transient_secs)
    }

    /// Counts of what happened during the run
    pub fn summary(&self) -> RunSummary {
        let count = |label: Label| self.events().iter().filter(|e| e.label == label).count();
        RunSummary {
            samples: self.samples.len(),
            stable: count(Label::Stable),
            wobble: count(Label::Wobble),
            unstable: count(Label::Unstable),
            final_state: self.state(),
        }
    }
}

/// Summary of a test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub samples: usize,
    pub stable: usize,
    pub wobble: usize,
    pub unstable: usize,
    pub final_state: FsmState,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples, {} stable, {} wobble, {} unstable, final state {}",
            self.samples, self.stable, self.wobble, self.unstable, self.final_state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServoState;
    use chrono::Duration;

    fn record(millis: i64, state: ServoState, time_error: i64) -> ParsedRecord {
        ParsedRecord {
            timestamp: Duration::milliseconds(millis),
            interface: "ens7f1".to_string(),
            time_error,
            servo_state: state,
        }
    }

    #[test]
    fn test_tdelta_anchored_on_first_record() {
        let mut tester = SampleTester::new(TesterConfig::new());
        tester.process(&record(681011839, ServoState::S1, 0));
        tester.process(&record(681012839, ServoState::S2, 5));

        assert_eq!(tester.tzero(), Some(Duration::milliseconds(681011839)));
        assert_eq!(
            tester.samples(),
            &[
                Sample::new(Duration::zero(), 0),
                Sample::new(Duration::seconds(1), 5),
            ]
        );
    }

    #[test]
    fn test_events_only_for_actions() {
        let mut tester = SampleTester::new(TesterConfig::new().with_stable_ns(40));

        assert_eq!(tester.process(&record(0, ServoState::S1, 0)), None);
        assert_eq!(tester.process(&record(1000, ServoState::S2, 5)), Some(Label::Stable));
        assert_eq!(tester.process(&record(2000, ServoState::S2, 6)), None);

        assert_eq!(tester.samples().len(), 3);
        assert_eq!(
            tester.events(),
            &[ClassificationEvent {
                sample: Sample::new(Duration::seconds(1), 5),
                label: Label::Stable,
            }]
        );
    }

    #[test]
    fn test_run_propagates_read_errors() {
        let mut tester = SampleTester::new(TesterConfig::new());
        let records: Vec<Result<ParsedRecord>> = vec![
            Ok(record(0, ServoState::S2, 0)),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom").into()),
            Ok(record(1000, ServoState::S0, 0)),
        ];

        assert!(tester.run(records).is_err());
        assert_eq!(tester.samples().len(), 1);
        assert_eq!(tester.state(), FsmState::LockedStable);
    }

    #[test]
    fn test_summary() {
        let mut tester = SampleTester::new(TesterConfig::new());
        let count = tester
            .run(vec![
                Ok(record(0, ServoState::S2, 0)),
                Ok(record(1000, ServoState::S2, 100)),
                Ok(record(2000, ServoState::S0, 0)),
            ])
            .unwrap();

        assert_eq!(count, 3);
        let summary = tester.summary();
        assert_eq!(
            summary,
            RunSummary {
                samples: 3,
                stable: 1,
                wobble: 1,
                unstable: 1,
                final_state: FsmState::Initializing,
            }
        );
        assert_eq!(
            summary.to_string(),
            "3 samples, 1 stable, 1 wobble, 1 unstable, final state /TESTING/INITIALIZING"
        );
    }

    #[test]
    fn test_empty_run_passes() {
        let tester = SampleTester::new(TesterConfig::new());
        assert!(tester.verdict().passed);
        assert_eq!(tester.state(), FsmState::Unknown);
        assert!(tester.tzero().is_none());
    }
}
