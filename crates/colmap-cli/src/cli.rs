//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colmap_ingest::DEFAULT_PREVIEW_ROWS;
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "colmap",
    version,
    about = "Map columns of tabular source files onto typed record schemas",
    long_about = "Map columns of CSV files and spreadsheet workbooks onto the fields of \
                  typed record schemas.\n\n\
                  Mappings are kept in a JSON map file whose ImportMap section is read by \
                  import tools."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Schema registry file (TOML). Defaults to the built-in types.
    #[arg(long, value_name = "PATH", global = true)]
    pub registry: Option<PathBuf>,

    /// Settings file (TOML). Defaults to the per-user settings file.
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// List the tables and columns of a source file, or of every
    /// supported file in a directory.
    Columns {
        #[arg(value_name = "PATH")]
        file: PathBuf,
    },

    /// Show the first rows of a table.
    Preview(PreviewArgs),

    /// List target types, or the fields of one type.
    Types(TypesArgs),

    /// Auto-map a source table onto a type.
    Automap(AutomapArgs),

    /// Bind a field to a column.
    Map(MapArgs),

    /// Remove the mapping of a field.
    Unmap(UnmapArgs),

    /// Check required fields and drop-outs of a map file.
    Validate(ValidateArgs),

    /// Report the mappings only a referenced source file supplies; remove
    /// the file and those mappings with --apply.
    RemoveFile(RemoveFileArgs),

    /// Report referenced file availability and per-type progress.
    Check(MapFileArg),
}

#[derive(Args)]
pub struct MapFileArg {
    /// Map file (JSON). Created on first save if it does not exist.
    #[arg(long = "map", short = 'm', value_name = "PATH")]
    pub map: PathBuf,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Table (worksheet) name. Defaults to the first table.
    #[arg(long)]
    pub table: Option<String>,

    /// Number of rows to show.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub rows: usize,
}

#[derive(Args)]
pub struct TypesArgs {
    /// Type to describe.
    #[arg(value_name = "TYPE")]
    pub data_type: Option<String>,

    /// Include fields hidden by settings.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct AutomapArgs {
    #[command(flatten)]
    pub map: MapFileArg,

    /// Target type.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub data_type: String,

    /// Source file holding the table.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Table (worksheet) name. Required when the file has several tables.
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub map: MapFileArg,

    #[arg(value_name = "TYPE")]
    pub data_type: String,

    #[arg(value_name = "FIELD")]
    pub property: String,

    #[arg(value_name = "COLUMN")]
    pub column: String,
}

#[derive(Args)]
pub struct UnmapArgs {
    #[command(flatten)]
    pub map: MapFileArg,

    #[arg(value_name = "TYPE")]
    pub data_type: String,

    #[arg(value_name = "FIELD")]
    pub property: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub map: MapFileArg,

    /// Remove mappings whose type or field is no longer visible.
    #[arg(long)]
    pub fix: bool,
}

#[derive(Args)]
pub struct RemoveFileArgs {
    #[command(flatten)]
    pub map: MapFileArg,

    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Remove the file and its orphaned mappings instead of only reporting.
    #[arg(long)]
    pub apply: bool,
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
