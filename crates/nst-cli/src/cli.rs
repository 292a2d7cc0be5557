//! CLI argument definitions for the næringsspesifikasjon pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "nst",
    version,
    about = "Flatten næringsspesifikasjon batches and derive RF-1175 fields",
    long_about = "Flatten batches of næringsspesifikasjon events into topic snapshots.\n\n\
                  Reads Avro batches of accounting specifications, keeps the latest event per\n\
                  entity and fiscal year, and writes one Parquet snapshot per topic. The derive\n\
                  command maps snapshots onto RF-1175 form variables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
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

    /// Include entity identifiers in log output.
    ///
    /// Identifiers are national identity numbers and are redacted by default.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// TOML file with defaults for output directory, label and filters.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Flatten an Avro batch into topic snapshots.
    Flatten(FlattenArgs),

    /// Derive RF-1175 tables from the newest topic snapshots.
    Derive(DeriveArgs),

    /// List topics and derivation tables.
    Topics,
}

#[derive(Parser)]
pub struct FlattenArgs {
    /// Avro object container holding the event batch.
    #[arg(value_name = "BATCH")]
    pub batch: PathBuf,

    /// Snapshot directory (default: config file, then the current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only produce the given snapshot; repeat for several (default: all).
    #[arg(long = "topic", value_name = "PREFIX")]
    pub topics: Vec<String>,

    /// Decode and project without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct DeriveArgs {
    /// Directory holding the topic snapshots.
    #[arg(value_name = "SNAPSHOT_DIR")]
    pub snapshot_dir: PathBuf,

    /// Classification snapshot (default: newest `virksomhet` snapshot in SNAPSHOT_DIR).
    #[arg(long = "classification", value_name = "FILE")]
    pub classification: Option<PathBuf>,

    /// Root of the RF1175_<LABEL> directory (default: config file, then SNAPSHOT_DIR).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output label (default: config file, then `latest`).
    #[arg(long = "label", value_name = "LABEL")]
    pub label: Option<String>,

    /// Only derive the given table; repeat for several (default: all).
    #[arg(long = "table", value_name = "NAME")]
    pub tables: Vec<String>,

    /// Entity type to include; repeat for several (replaces the default list).
    #[arg(long = "entity-type", value_name = "TYPE")]
    pub entity_types: Vec<String>,

    /// Accounting obligation type to include; repeat for several.
    #[arg(long = "obligation-type", value_name = "TYPE")]
    pub obligation_types: Vec<String>,
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
