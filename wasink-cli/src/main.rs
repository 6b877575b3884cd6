use anyhow::{Context, Result};
use clap::Parser;
use patharg::InputArg;
use std::io::{self, Read};
use std::process;
use wasink::{DecodeOptions, Features, Sink};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The module to decode. If not provided or is '-', read from
    /// standard input.
    #[arg(default_value_t)]
    input: InputArg,

    /// Print one trace line per decode event to standard output.
    #[arg(long)]
    trace: bool,

    /// Decode "name" custom sections (function and local names).
    #[arg(long)]
    debug_names: bool,

    /// Accept the exception handling extension.
    #[arg(long)]
    enable_exceptions: bool,

    /// Accept the saturating float-to-int conversion extension.
    #[arg(long)]
    enable_saturating_float_to_int: bool,

    /// Enable verbose output: debug-level logging and a debug
    /// representation of any decode error.
    #[arg(short, long)]
    verbose: bool,
}

/// Claims every error so the decoder does not print to stderr itself; the
/// error chain is reported once, below.
struct CliSink;

impl Sink for CliSink {
    fn on_error(&mut self, _offset: usize, _message: &str) -> bool {
        true
    }
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::new();
    logger.filter_level(if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
    // RUST_LOG still takes precedence over --verbose.
    logger.parse_default_env();
    logger.init();

    if let Err(err) = run(&cli) {
        eprintln!("{err:#}");
        if cli.verbose {
            eprintln!("\nDEBUG OUTPUT:\n{err:#?}");
        }
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut data = Vec::new();
    cli.input
        .open()
        .with_context(|| format!("failed to open `{}`", cli.input))?
        .read_to_end(&mut data)
        .with_context(|| format!("failed to read `{}`", cli.input))?;

    let features = Features {
        exceptions: cli.enable_exceptions,
        saturating_float_to_int: cli.enable_saturating_float_to_int,
    };

    let mut stdout = io::stdout().lock();
    let options = DecodeOptions {
        features,
        read_debug_names: cli.debug_names,
        log_stream: cli.trace.then_some(&mut stdout as &mut dyn io::Write),
    };

    wasink::decode(&data, &mut CliSink, options)
        .with_context(|| format!("failed to decode `{}`", cli.input))?;
    Ok(())
}
