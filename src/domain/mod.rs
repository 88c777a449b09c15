//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated row type (`SalesRecord`) and its period bucket (`Period`)
//! - the per-interaction selection (`FilterCriteria`, `DateRange`)
//! - computed outputs (`MetricsSummary`, `GroupedSummary`, `TrendPoint`)

pub mod types;

pub use types::*;
