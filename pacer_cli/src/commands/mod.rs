//! CLI subcommand implementations.

pub mod courts;
pub mod report;
