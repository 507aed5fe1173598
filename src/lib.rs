//! `fars` library crate.
//!
//! The binary (`fars`) is a thin wrapper around this library so that:
//!
//! - loading, summarizing, and mapping are testable without spawning processes
//! - the same operations can be driven from other tools or notebooks

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod map;
pub mod report;
pub mod summary;
pub mod tui;
