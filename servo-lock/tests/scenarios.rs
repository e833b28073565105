//! End-to-end scenarios: log text in, verdict out.

use servo_lock::{
    ClassificationEvent, Label, LogParser, Sample, SampleTester, TesterConfig, Verdict,
};
use chrono::Duration;
use std::io::{Cursor, Write};

const SCENARIO: &str = "\
ts2phc[681011.839]: [ts2phc.0.config] ens7f1 master offset          0 s1 freq      -0
ptp4l[681011.900]: [ptp4l.0.config] port 1: SLAVE to UNCALIBRATED on RS_SLAVE
ts2phc[681012.839]: [ts2phc.0.config] ens7f1 master offset          5 s2 freq      +3
ts2phc[681013.839]: [ts2phc.0.config] ens7f1 master offset         50 s2 freq     +11
ts2phc[681014.839]: [ts2phc.0.config] ens7f1 master offset          3 s2 freq      -2
";

fn run(text: &str, config: TesterConfig) -> (SampleTester, Verdict) {
    let parser = LogParser::new(config.interface.as_deref()).unwrap();
    let mut tester = SampleTester::new(config);
    tester.run(parser.parse(Cursor::new(text))).unwrap();
    let verdict = tester.verdict();
    (tester, verdict)
}

fn event(secs: i64, time_error: i64, label: Label) -> ClassificationEvent {
    ClassificationEvent {
        sample: Sample::new(Duration::seconds(secs), time_error),
        label,
    }
}

#[test]
fn wobble_after_lock_fails() {
    let (tester, verdict) = run(SCENARIO, TesterConfig::new().with_stable_ns(40));

    assert_eq!(
        tester.events(),
        &[
            event(1, 5, Label::Stable),
            event(2, 50, Label::Wobble),
            event(3, 3, Label::Stable),
        ]
    );
    assert!(!verdict.passed);
    assert_eq!(
        verdict.detail,
        vec![
            "Time errors greater than 40ns are significant",
            "Test failed: wobble after 2.000s",
        ]
    );
}

#[test]
fn wobble_inside_transient_window_passes() {
    let config = TesterConfig::new().with_stable_ns(40).with_transient_secs(3);
    let (tester, verdict) = run(SCENARIO, config);

    assert_eq!(tester.events().len(), 3);
    assert!(verdict.passed);
    assert_eq!(
        verdict.to_string(),
        "Time errors greater than 40ns are significant\nFirst 3s of logs not significant"
    );
}

#[test]
fn wider_threshold_never_wobbles() {
    let (tester, verdict) = run(SCENARIO, TesterConfig::new().with_stable_ns(-50));

    assert_eq!(tester.events(), &[event(1, 5, Label::Stable)]);
    assert!(verdict.passed);
}

#[test]
fn loss_of_lock_is_unstable() {
    let text = "\
ts2phc[10.000]: [ts2phc.0.config] ens7f1 master offset 2 s2 freq -0
ts2phc[11.000]: [ts2phc.0.config] ens7f1 master offset 9000 s0 freq -0
ts2phc[11.500]: [ts2phc.0.config] ens7f1 master offset 8000 s1 freq -0
ts2phc[12.250]: [ts2phc.0.config] ens7f1 master offset 1 s2 freq -0
";
    let (tester, verdict) = run(text, TesterConfig::new());

    assert_eq!(
        tester.events().iter().map(|e| e.label).collect::<Vec<_>>(),
        vec![Label::Stable, Label::Unstable, Label::Stable]
    );
    assert_eq!(tester.events()[2].sample.tdelta, Duration::milliseconds(2250));
    assert!(!verdict.passed);
    assert_eq!(verdict.detail[1], "Test failed: unstable after 1.000s");
}

#[test]
fn interface_filter_keeps_other_ports_out() {
    let text = "\
ts2phc[1.000]: [ts2phc.0.config] ens7f0 master offset 0 s2 freq -0
ts2phc[2.000]: [ts2phc.0.config] ens7f1 master offset 0 s2 freq -0
ts2phc[3.000]: [ts2phc.0.config] ens7f0 master offset 0 s0 freq -0
ts2phc[4.000]: [ts2phc.0.config] ens7f1 master offset 0 s2 freq -0
";
    let (tester, verdict) = run(text, TesterConfig::new().with_interface("ens7f1"));

    // tzero comes from the first ens7f1 line, not the first line of the file
    assert_eq!(tester.tzero(), Some(Duration::seconds(2)));
    assert_eq!(tester.samples().len(), 2);
    assert_eq!(tester.events(), &[event(0, 0, Label::Stable)]);
    assert!(verdict.passed);
}

#[test]
fn parses_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SCENARIO.as_bytes()).unwrap();

    let parser = LogParser::new(None).unwrap();
    let mut tester = SampleTester::new(TesterConfig::new());
    let count = tester.run(parser.parse_file(file.path()).unwrap()).unwrap();

    assert_eq!(count, 4);
    assert!(!tester.verdict().passed);
}

#[test]
fn empty_log_passes() {
    let (tester, verdict) = run("", TesterConfig::new().with_transient_secs(60));

    assert!(tester.samples().is_empty());
    assert!(verdict.passed);
    assert_eq!(verdict.detail.len(), 2);
}
