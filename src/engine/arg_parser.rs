use clap::Parser;
use std::path::PathBuf;

/// Watch a directory and route each new file into its category's destination
/// by extension.
#[derive(Clone, Parser)]
#[command(name = "sluicer")]
#[command(about = "Watch a directory and route files by extension; use --once to drain and exit.")]
pub struct Cli {
    /// Source directory to watch. Default: `in`.
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Destination for csv files. Default: `out/csv`.
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,

    /// Destination for txt files. Default: `out/txt`.
    #[arg(long)]
    pub txt_dir: Option<PathBuf>,

    /// Destination for unrecognized files. Default: `out/errors`.
    #[arg(long)]
    pub error_dir: Option<PathBuf>,

    /// Delay between source scans, in milliseconds.
    #[arg(long, short = 'i', value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Most new files handed over per scan.
    #[arg(long, short = 'n')]
    pub max_per_tick: Option<usize>,

    /// Per-category queue capacity. Unbounded when omitted.
    #[arg(long, short = 'q')]
    pub queue_bound: Option<usize>,

    /// Drain the source directory once and exit instead of watching.
    #[arg(long)]
    pub once: bool,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
