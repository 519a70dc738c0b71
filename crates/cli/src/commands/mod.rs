//! CLI subcommands

pub mod pods;
pub mod relocate;
pub mod resize;
