//! Command-line parsing for the `fars` tool.
//!
//! Argument parsing and command dispatch are kept apart from the data code;
//! year and state values are taken as strings and coerced by the library so
//! that bad input gets the same errors everywhere.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Compression;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fars", version, about = "FARS accident summaries and state maps")]
pub struct Cli {
    /// Directory holding `accident_<YYYY>.csv.bz2` files (default: $FARS_DATA_DIR, else `.`).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log each parsed file (path, rows, columns).
    #[arg(long, global = true)]
    pub progress: bool,

    /// More log output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the dataset file name for each year.
    Filename(YearsArgs),
    /// Load one file and print its size and inferred column types.
    Inspect(InspectArgs),
    /// Count accidents per month for each year and print the wide table.
    Summarize(SummarizeArgs),
    /// Plot accident locations for one state and year.
    Map(MapArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct YearsArgs {
    /// Years: `2013`, `2013,2015`, `2013:2015` or `2013..2015`.
    #[arg(value_name = "YEARS")]
    pub years: String,
}

#[derive(Debug, Parser, Clone)]
pub struct InspectArgs {
    /// File to load.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Force a codec instead of guessing from the extension.
    #[arg(long, value_enum)]
    pub compression: Option<Compression>,

    /// Field delimiter.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

#[derive(Debug, Parser, Clone)]
pub struct SummarizeArgs {
    /// Years: `2013`, `2013,2015`, `2013:2015` or `2013..2015`.
    #[arg(value_name = "YEARS")]
    pub years: String,

    /// Export the table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the table and load warnings to JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct MapArgs {
    /// State code (FARS numbering, e.g. 1 = Alabama).
    #[arg(short, long)]
    pub state: String,

    /// Year to plot.
    #[arg(short, long)]
    pub year: String,

    /// Write the map to an SVG file.
    #[arg(long, value_name = "SVG", conflicts_with = "tui")]
    pub svg: Option<PathBuf>,

    /// Open an interactive terminal view instead of printing a text map.
    #[arg(long)]
    pub tui: bool,

    /// Map width (columns for the text map, pixels for SVG).
    #[arg(long)]
    pub width: Option<u32>,

    /// Map height (rows for the text map, pixels for SVG).
    #[arg(long)]
    pub height: Option<u32>,
}
