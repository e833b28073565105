//! Output writers: JSON lines for parsed records, plot data files.

use anyhow::{Context, Result};
use servo_lock::report::PlotData;
use servo_lock::{ParsedRecord, SampleTester};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write each record as one JSON object per line
///
/// Returns the number of records written.
pub fn write_json_lines<I, W>(records: I, mut writer: W) -> Result<usize>
where
    I: IntoIterator<Item = servo_lock::Result<ParsedRecord>>,
    W: Write,
{
    let mut count = 0;
    for record in records {
        let record = record.context("Failed to read input")?;
        serde_json::to_writer(&mut writer, &record)?;
        writeln!(writer)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Write the plot data of a finished run to `path`
pub fn write_plot_data(tester: &SampleTester, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create plot data file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    PlotData::from_tester(tester)
        .write_json(&mut writer)
        .with_context(|| format!("Failed to write plot data: {:?}", path))?;
    writer.flush()?;
    log::info!("Plot data written to {:?}", path);
    Ok(())
}
