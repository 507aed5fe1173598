//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments into a `RunConfig`
//! - runs the requested command and prints its report
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::cli::{Cli, Command, InspectArgs, MapArgs, SummarizeArgs, YearsArgs};
use crate::domain::{LoadOptions, RunConfig};
use crate::error::AppError;
use crate::io::{build_filenames, load_table, parse_year, parse_years};
use crate::map::{AsciiMapRenderer, MapOutcome, SvgMapRenderer, map_state, parse_state};
use crate::summary::{aggregate_years, summarize_batch};
use crate::tui::TerminalMapRenderer;

pub mod logging;

/// Environment variable naming the default data directory.
pub const DATA_DIR_ENV: &str = "FARS_DATA_DIR";

/// Entry point for the `fars` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = run_config_from_args(&cli);
    debug!(data_dir = %config.data_dir.display(), "resolved data directory");

    match cli.command {
        Command::Filename(args) => handle_filename(&args),
        Command::Inspect(args) => handle_inspect(&args, &config),
        Command::Summarize(args) => handle_summarize(&args, &config),
        Command::Map(args) => handle_map(&args, &config),
    }
}

pub fn run_config_from_args(cli: &Cli) -> RunConfig {
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    RunConfig {
        data_dir,
        load: LoadOptions {
            progress: cli.progress,
            ..LoadOptions::default()
        },
    }
}

fn handle_filename(args: &YearsArgs) -> Result<(), AppError> {
    let years = parse_years(&args.years)?;
    for name in build_filenames(&years) {
        println!("{name}");
    }
    Ok(())
}

fn handle_inspect(args: &InspectArgs, config: &RunConfig) -> Result<(), AppError> {
    if !args.delimiter.is_ascii() {
        return Err(AppError::invalid_argument(format!(
            "delimiter '{}' is not a single-byte character",
            args.delimiter
        )));
    }
    let options = LoadOptions {
        delimiter: args.delimiter as u8,
        compression: args.compression,
        ..config.load
    };

    let table = load_table(&args.path, &options)?;
    print!("{}", crate::report::format_table_overview(&table));
    Ok(())
}

fn handle_summarize(args: &SummarizeArgs, config: &RunConfig) -> Result<(), AppError> {
    let years = parse_years(&args.years)?;
    let batch = aggregate_years(&years, config);
    let summary = summarize_batch(&batch);

    eprint!("{}", crate::report::format_warnings(&batch.warnings()));
    print!("{}", crate::report::format_summary(&summary));

    if let Some(path) = &args.export {
        crate::io::export::write_summary_csv(path, &summary)?;
    }
    if let Some(path) = &args.json {
        crate::io::export::write_summary_json(path, &summary, &batch)?;
    }

    Ok(())
}

fn handle_map(args: &MapArgs, config: &RunConfig) -> Result<(), AppError> {
    let state = parse_state(&args.state)?;
    let year = parse_year(&args.year)?;

    let outcome = if let Some(path) = &args.svg {
        let mut renderer = SvgMapRenderer::new(path)
            .with_size(args.width.unwrap_or(800), args.height.unwrap_or(600));
        let outcome = map_state(state, year, config, &mut renderer)?;
        if matches!(outcome, MapOutcome::Rendered { .. }) {
            println!("Wrote {}", renderer.path().display());
        }
        outcome
    } else if args.tui {
        map_state(state, year, config, &mut TerminalMapRenderer)?
    } else {
        let mut renderer = AsciiMapRenderer::new(
            args.width.unwrap_or(80) as usize,
            args.height.unwrap_or(30) as usize,
        );
        let outcome = map_state(state, year, config, &mut renderer)?;
        if let Some(text) = renderer.output() {
            print!("{text}");
        }
        outcome
    };

    println!("{}", crate::report::format_map_outcome(&outcome));
    Ok(())
}
