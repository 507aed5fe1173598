//! Input/output helpers.
//!
//! - year → filename (`filename`)
//! - compressed CSV loading (`ingest`)
//! - summary exports (CSV/JSON) (`export`)

pub mod export;
pub mod filename;
pub mod ingest;

pub use export::*;
pub use filename::*;
pub use ingest::load_table;
