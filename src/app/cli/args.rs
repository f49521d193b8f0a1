//! Command-line arguments
//!
//! Run settings themselves come from the environment (or a settings file);
//! the command line only selects the adapter and controls diagnostics.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "adapter-runtime")]
#[command(about = "Run one scanning batch through a tool adapter")]
#[command(version = crate::core::version::long_version())]
pub struct Args {
    /// Adapter to run (see --list-adapters)
    #[arg(
        short = 'a',
        long = "adapter",
        value_name = "NAME",
        required_unless_present = "list_adapters"
    )]
    pub adapter: Option<String>,

    /// List registered adapters and exit
    #[arg(long = "list-adapters")]
    pub list_adapters: bool,

    /// Settings file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error", "off"]
    )]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(
        short = 'o',
        long = "log-format",
        value_name = "FORMAT",
        value_parser = ["text", "ext", "json"]
    )]
    pub log_format: Option<String>,

    /// Also write logs to this file
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured log output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured log output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,
}

impl Args {
    /// Colour when forced, otherwise when stderr is a terminal
    pub fn use_color(&self) -> bool {
        use std::io::IsTerminal;
        if self.no_color {
            false
        } else {
            self.color || std::io::stderr().is_terminal()
        }
    }
}
