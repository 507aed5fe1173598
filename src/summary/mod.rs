//! Yearly aggregation and the month × year summary.
//!
//! - per-year loading with collected warnings (`aggregate`)
//! - grouping and pivoting into a `SummaryTable` (`pivot`)

pub mod aggregate;
pub mod pivot;

pub use aggregate::*;
pub use pivot::*;
