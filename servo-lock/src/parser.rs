//! ts2phc log line parser
//!
//! Turns raw log text into a lazy stream of [`ParsedRecord`]s. Only lines of
//! the form
//!
//! ```text
//! ts2phc[681011.839]: [ts2phc.0.config] ens7f1 master offset          0 s2 freq      -0
//! ```
//!
//! are of interest; every other line is dropped without being reported.

use crate::types::{ParsedRecord, Result, ServoState, ServoLockError, Timestamp};
use chrono::Duration;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Build the line pattern, optionally restricted to a single interface
///
/// An empty interface name means no filter. Capture groups: timestamp,
/// interface, master offset, servo state.
pub fn build_pattern(interface: Option<&str>) -> String {
    let interface = match interface.filter(|name| !name.is_empty()) {
        Some(name) => format!("({})", regex::escape(name)),
        None => r"(\S+)".to_string(),
    };
    [
        r"^ts2phc\[([1-9][0-9]*\.[0-9]{3})\]:",
        r"\[ts2phc\.0\..*\]",
        interface.as_str(),
        r"master offset\s*",
        r"(-?[0-9]+)",
        r"(s[012])",
        r".*$",
    ]
    .join(r"\s")
}

/// Parser for ts2phc offset lines
#[derive(Debug, Clone)]
pub struct LogParser {
    pattern: Regex,
}

impl LogParser {
    /// Create a parser, optionally restricted to one interface
    pub fn new(interface: Option<&str>) -> Result<Self> {
        let pattern = Regex::new(&build_pattern(interface))?;
        Ok(Self { pattern })
    }

    /// Parse a single line, returning `None` if it is not an offset line
    pub fn parse_line(&self, line: &str) -> Option<ParsedRecord> {
        let captures = self.pattern.captures(line)?;
        let timestamp = parse_timestamp(&captures[1])?;
        // The pattern admits arbitrarily long digit runs; ones that overflow are not ours
        let time_error = captures[3].parse::<i64>().ok()?;
        let servo_state = captures[4].parse::<ServoState>().ok()?;

        Some(ParsedRecord {
            timestamp,
            interface: captures[2].to_string(),
            time_error,
            servo_state,
        })
    }

    /// Parse lines from a reader, returning a lazy iterator over records
    ///
    /// The iterator consumes the reader; parsing again needs a fresh source.
    pub fn parse<R: BufRead>(&self, reader: R) -> Records<'_, R> {
        Records {
            parser: self,
            reader,
            buffer: Vec::new(),
        }
    }

    /// Open a log file and parse it
    pub fn parse_file(&self, path: &Path) -> Result<Records<'_, BufReader<File>>> {
        log::info!("Parsing log file: {:?}", path);

        let file = File::open(path).map_err(|source| ServoLockError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(self.parse(BufReader::new(file)))
    }
}

/// Convert a `seconds.mmm` timestamp into an exact duration
fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let (secs, millis) = text.split_once('.')?;
    let secs = secs.parse::<i64>().ok()?;
    let millis = millis.parse::<i64>().ok()?;
    let total = secs.checked_mul(1000)?.checked_add(millis)?;
    Some(Duration::milliseconds(total))
}

/// Iterator over the records found in a line source
///
/// Read errors are yielded once as `Err`; lines that are not valid UTF-8 are
/// decoded lossily and then simply fail to match.
pub struct Records<'a, R> {
    parser: &'a LogParser,
    reader: R,
    buffer: Vec<u8>,
}

impl<'a, R: BufRead> Iterator for Records<'a, R> {
    type Item = Result<ParsedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }

            let line = String::from_utf8_lossy(&self.buffer);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(record) = self.parser.parse_line(line) {
                return Some(Ok(record));
            }
        }
    }
}
