//! Display formatting for terminal output
//!
//! The register itself is rendered by [`crate::reports::RegisterReport`].

pub mod entry;

pub use entry::{format_entry_details, format_summary};
