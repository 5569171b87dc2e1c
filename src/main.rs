//! Command-line front end
//!
//! Reads a JSON batch request (stdin by default), writes the result matrix as
//! JSON (stdout by default). Per-query and per-document failures are logged
//! as warnings; only an unreadable request or an unwritable result exits with
//! status 2.

use clap::Parser;
use log::{debug, LevelFilter};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use xprobe::batch::{BatchOptions, Extractor, DEFAULT_CACHE_CAPACITY};
use xprobe::envelope::{write_matrix, BatchRequest};
use xprobe::error::{BatchEnvelopeError, Error};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "xprobe")]
#[command(about = "Apply path queries to a batch of markup documents", long_about = None)]
struct Cli {
    /// Read the request from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the result matrix to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(long)]
    compact: bool,

    /// Run on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Compiled queries kept in the cache (0 disables it)
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_size: usize,

    /// Abandon documents still unprocessed after this many milliseconds
    #[arg(long)]
    time_budget_ms: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> BatchOptions {
        BatchOptions {
            parallel: !self.sequential,
            threads: self.threads,
            cache_capacity: self.cache_size,
            time_budget: self.time_budget_ms.map(Duration::from_millis),
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("xprobe: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let request = read_request(cli.input.as_deref())?;
    debug!(
        "request: {} queries, {} documents",
        request.xpaths.len(),
        request.urls.len()
    );

    let (queries, documents) = request.into_parts();
    let extractor = Extractor::new(cli.options());
    debug!("running on {} worker thread(s)", extractor.threads());
    let report = extractor.run(&queries, &documents);

    let pretty = !cli.compact;
    match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(Error::Output)?;
            write_matrix(&report.matrix, BufWriter::new(file), pretty)
        }
        None => write_matrix(&report.matrix, io::stdout().lock(), pretty),
    }
}

fn read_request(path: Option<&Path>) -> Result<BatchRequest, BatchEnvelopeError> {
    match path {
        Some(path) => BatchRequest::from_reader(File::open(path)?),
        None => BatchRequest::from_reader(io::stdin().lock()),
    }
}
