//! Servo Lock CLI Application
//!
//! Command-line interface for the servo lock classifier. It uses the
//! servo-lock library and adds:
//! - Argument parsing and TOML configuration
//! - Input selection (file or standard input)
//! - Verdict printing and exit code policy
//! - JSON lines export of parsed records

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use servo_lock::{LogParser, SampleTester};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

mod config;
mod report;

use config::{AppConfig, Overrides};

/// Servo Lock - Classify clock servo stability from ts2phc logs
///
/// Without a subcommand the arguments are those of `test`.
#[derive(Parser, Debug)]
#[command(name = "servo-lock")]
#[command(about = "Classify clock servo lock stability from ts2phc logs (runs `test` when no subcommand is given)", long_about = None)]
#[command(version)]
#[command(subcommand_negates_reqs = true)]
struct Args {
    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: TestArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a stability test over a log and exit non-zero if it fails
    Test(TestArgs),

    /// Print each offset line of a log as a JSON object
    Parse(ParseArgs),
}

#[derive(clap::Args, Debug)]
struct TestArgs {
    /// Path to configuration file (TOML) with a [tester] table
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only process lines related to this interface
    #[arg(short, long, value_name = "NAME")]
    interface: Option<String>,

    /// Ignore instability until this many seconds after the first log line
    #[arg(short, long, value_name = "SECS", allow_negative_numbers = true)]
    transient: Option<i64>,

    /// Consider the clock stable when the offset is within |NS| nanoseconds
    #[arg(short, long, value_name = "NS", allow_negative_numbers = true)]
    stable: Option<i64>,

    /// The log file to parse, or '-' to read from stdin
    #[arg(required = true)]
    input: Option<String>,

    /// Optional file to write plot data (JSON) to
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ParseArgs {
    /// Only process lines related to this interface
    #[arg(short, long, value_name = "NAME")]
    interface: Option<String>,

    /// The log file to parse, or '-' to read from stdin
    input: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Servo Lock CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using classifier library v{}", servo_lock::VERSION);

    match args.command {
        Some(Command::Parse(parse_args)) => parse_mode(parse_args)?,
        Some(Command::Test(test_args)) => run_test(test_args)?,
        None => run_test(args.run)?,
    }

    Ok(())
}

/// Run test mode and exit with status 1 if the log fails
fn run_test(args: TestArgs) -> Result<()> {
    if !test_mode(args)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Test mode - classify the log, print the verdict, return whether it passed
fn test_mode(args: TestArgs) -> Result<bool> {
    let input = args.input.context("No input log given")?;

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    }
    .with_overrides(Overrides {
        interface: args.interface,
        transient: args.transient,
        stable: args.stable,
    });
    log::debug!("Tester configuration: {:?}", config.tester);

    let parser = LogParser::new(config.tester.interface.as_deref())?;
    let mut tester = SampleTester::new(config.tester);

    let reader = open_input(&input)?;
    tester
        .run(parser.parse(reader))
        .with_context(|| format!("Failed to read input: {}", input))?;

    log::info!("Run summary: {}", tester.summary());

    if let Some(output) = &args.output {
        report::write_plot_data(&tester, output)?;
    }

    let verdict = tester.verdict();
    println!("{}", verdict);
    Ok(verdict.passed)
}

/// Parse mode - emit parsed records as JSON lines on stdout
fn parse_mode(args: ParseArgs) -> Result<()> {
    let parser = LogParser::new(args.interface.as_deref())?;
    let reader = open_input(&args.input)?;

    let stdout = io::stdout();
    let count = report::write_json_lines(parser.parse(reader), stdout.lock())?;
    log::info!("Parsed {} records from {}", count, args.input);

    Ok(())
}

/// Open the input log, `-` meaning standard input
fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        log::debug!("Reading log from stdin");
        return Ok(Box::new(io::stdin().lock()));
    }

    let file = File::open(input).with_context(|| format!("Failed to open input: {}", input))?;
    log::debug!("Reading log from {}", input);
    Ok(Box::new(BufReader::new(file)))
}

/// Map the verbosity flags to a log level
fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    use log::LevelFilter;

    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use std::io::Write;

    Builder::new()
        .filter_level(log_level(verbose, quiet))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
