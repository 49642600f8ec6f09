//! Subcommand implementations.

pub mod clear;
pub mod import;
pub mod products;
pub mod search;
