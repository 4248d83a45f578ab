//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod capture_hook;
pub mod error_reporter;
pub mod event_sink;
