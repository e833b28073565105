//! Servo Lock Classifier Library
//!
//! Classifies the lock behaviour of a clock servo from ts2phc logs and decides
//! whether a stability test passed.
//!
//! # Architecture
//!
//! - [`LogParser`] turns log lines into a lazy stream of [`ParsedRecord`]s
//! - [`StabilityClassifier`] is a pure transition table over servo states
//! - [`SampleTester`] drives the classifier and records classification events
//! - [`evaluate`] applies the transient window policy and produces a [`Verdict`]
//!
//! The library does NOT:
//! - Compute time error statistics (cTE, MTIE, TDEV)
//! - Render plots (see [`report::PlotData`] for the exported data)
//! - Parse command-line arguments
//!
//! # Example Usage
//!
//! ```no_run
//! use servo_lock::{LogParser, SampleTester, TesterConfig};
//! use std::path::Path;
//!
//! let config = TesterConfig::new()
//!     .with_stable_ns(40)
//!     .with_transient_secs(300)
//!     .with_interface("ens7f1");
//!
//! let parser = LogParser::new(config.interface.as_deref()).unwrap();
//! let mut tester = SampleTester::new(config);
//! tester.run(parser.parse_file(Path::new("ts2phc.log")).unwrap()).unwrap();
//!
//! let verdict = tester.verdict();
//! println!("{}", verdict);
//! std::process::exit(if verdict.passed { 0 } else { 1 });
//! ```

// Public modules
pub mod config;
pub mod evaluator;
pub mod fsm;
pub mod parser;
pub mod report;
pub mod tester;
pub mod types;

// Re-export main types for convenience
pub use config::TesterConfig;
pub use evaluator::{evaluate, Verdict};
pub use fsm::{Callbacks, FsmState, StabilityClassifier};
pub use parser::{LogParser, Records};
pub use tester::{RunSummary, SampleTester};
pub use types::{
    ClassificationEvent, Label, ParsedRecord, Result, Sample, ServoLockError, ServoState,
    Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
