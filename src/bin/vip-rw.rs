//! CLI tool to renumber production record files.
//!
//! Usage:
//!   vip-rw --out-dir <DIR> <SOURCES>...
//!
//! Every source is rewritten to `<DIR>/<file name>` with its records numbered
//! from 1 and a QC sub-field present on each record.

use clap::{Parser, ValueEnum};
use std::error::Error as _;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vipnt_rs::{
    DEFAULT_BLOCK_SIZE, Mode, ModeSelection, RewriteOptions, destination_for, rewrite_file,
};

/// Read and write production record files, restarting record numbers at 1
/// for each file.
#[derive(Parser)]
#[command(name = "vip-rw", version)]
struct Cli {
    /// Source files (wildcards are expanded on every platform)
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Directory that receives the rewritten files
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Delimiter spelling of the sources
    #[arg(short, long, value_enum, default_value_t = ModeArg::Auto)]
    mode: ModeArg,

    /// Read block size in bytes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Log per-file details and progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Detect from the first bytes of each file
    Auto,
    /// Control bytes 0x1E, 0x1D, 0x1F
    Raw,
    /// ^RS, ^GS, ^US
    Mnemonic,
}

impl From<ModeArg> for ModeSelection {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => ModeSelection::Auto,
            ModeArg::Raw => ModeSelection::Fixed(Mode::RawControl),
            ModeArg::Mnemonic => ModeSelection::Fixed(Mode::Mnemonic),
        }
    }
}

fn main() {
    let cli = Cli::parse_from(wild::args_os());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = RewriteOptions {
        mode: cli.mode.into(),
        block_size: cli.block_size,
        ..RewriteOptions::default()
    };

    let mut total = 0;
    for source in &cli.sources {
        let Some(dest) = destination_for(source, &cli.out_dir) else {
            eprintln!("Error: '{}' is not a file path", source.display());
            process::exit(1);
        };
        info!("processing {}", source.display());

        match rewrite_file(source, &dest, &options) {
            Ok(summary) => total += summary.records,
            Err(e) => {
                error!("{}: {e}", source.display());
                let mut cause = e.source();
                while let Some(inner) = cause {
                    eprintln!("  caused by: {inner}");
                    cause = inner.source();
                }
                process::exit(1);
            }
        }
    }

    info!(files = cli.sources.len(), records = total, "done");
}
