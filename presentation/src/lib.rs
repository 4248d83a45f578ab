//! Presentation layer for livelog
//!
//! This crate contains the CLI definition and the capture report
//! formatters.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, SummaryFormat};
pub use output::console::ConsoleFormatter;
