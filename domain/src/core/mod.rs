//! Core domain concepts shared across all subdomains.
//!
//! - [`clock::now`]: monotonic capture clock
//! - [`error::DomainError`]: domain-level errors

pub mod clock;
pub mod error;
