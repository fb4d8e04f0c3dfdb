//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use xwalk_model::{AllocationPolicy, SimilarityScorer};

#[derive(Parser)]
#[command(
    name = "crosswalk",
    version,
    about = "Map usage-log task descriptions onto O*NET tasks and occupations",
    long_about = "Build a usage-weighted task crosswalk.\n\n\
                  Matches usage descriptions to O*NET task statements (exact, then fuzzy),\n\
                  splits usage across occupations that share a task, attaches occupation\n\
                  and wage attributes, and audits that no usage is lost or duplicated."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow usage descriptions and task text in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the crosswalk and its audit artifacts.
    Build(BuildArgs),

    /// List task texts shared by several occupations.
    Duplicates(DuplicatesArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// TOML config file; flags override its values.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Usage log CSV.
    #[arg(long = "usage", value_name = "FILE")]
    pub usage: Option<PathBuf>,

    /// Directory with the O*NET text files.
    #[arg(long = "onet-dir", value_name = "DIR")]
    pub onet_dir: Option<PathBuf>,

    /// OEWS wage CSV.
    #[arg(long = "wages", value_name = "FILE")]
    pub wages: Option<PathBuf>,

    /// Task ratings file (default: picked up from --onet-dir when present).
    #[arg(long = "task-ratings", value_name = "FILE")]
    pub task_ratings: Option<PathBuf>,

    /// Output directory (default: ./output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Minimum fuzzy score to accept, 0-100 (default: 85).
    #[arg(long = "threshold", value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// How usage is split across occupations sharing a task.
    #[arg(long = "allocation", value_enum)]
    pub allocation: Option<AllocationArg>,

    /// Similarity measure for fuzzy matching.
    #[arg(long = "scorer", value_enum)]
    pub scorer: Option<ScorerArg>,

    /// Score fuzzy candidates on a single thread.
    #[arg(long = "no-parallel")]
    pub no_parallel: bool,

    /// Run and audit without writing any file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct DuplicatesArgs {
    /// Directory with the O*NET text files.
    #[arg(long = "onet-dir", value_name = "DIR")]
    pub onet_dir: PathBuf,

    /// Show at most this many texts.
    #[arg(long = "limit", value_name = "N", default_value_t = 25)]
    pub limit: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AllocationArg {
    Equal,
    Employment,
}

impl From<AllocationArg> for AllocationPolicy {
    fn from(arg: AllocationArg) -> Self {
        match arg {
            AllocationArg::Equal => Self::Equal,
            AllocationArg::Employment => Self::Employment,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScorerArg {
    Levenshtein,
    Indel,
}

impl From<ScorerArg> for SimilarityScorer {
    fn from(arg: ScorerArg) -> Self {
        match arg {
            ScorerArg::Levenshtein => Self::Levenshtein,
            ScorerArg::Indel => Self::Indel,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
