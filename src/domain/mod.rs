//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - loaded tables and typed accident records (`Table`, `AccidentRecord`)
//! - load settings (`RunConfig`, `LoadOptions`, `Compression`)
//! - summary and map outputs (`SummaryTable`, `StateMap`)

pub mod types;

pub use types::*;
