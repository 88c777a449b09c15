//! Reporting utilities: plain-text tables for the CLI views.

pub mod format;

pub use format::*;
