//! Output formatting for capture reports

pub mod console;
