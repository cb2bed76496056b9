//! CLI subcommands.

pub mod analyze;
pub mod config;
pub mod services;
