//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - memoized loading keyed by file identity (`cache`)
//! - result exports (CSV/JSON) (`export`)

pub mod cache;
pub mod export;
pub mod ingest;

pub use cache::*;
pub use export::*;
pub use ingest::*;
