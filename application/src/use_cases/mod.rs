//! Use cases (application services)

pub mod capture;
