//! Filtering and aggregation over an immutable record set.
//!
//! Every function here is pure: same records + same arguments, same output.
//! Empty inputs produce zero / `None` outputs rather than errors.

pub mod filter;
pub mod rank;
pub mod summary;
pub mod trend;

pub use filter::*;
pub use rank::*;
pub use summary::*;
pub use trend::*;
