//! CLI module containing argument parsing and related functionality

pub mod args;

pub use args::Args;
