//! Command-line argument definitions for the deckstyle CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments name the action file, the artwork to edit and
//! where to write the result, plus configuration and logging options.

use clap::Parser;

/// Command-line arguments for the deckstyle tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON action file
    pub actions: String,

    /// Path to the input SVG sheet
    pub input: String,

    /// Path to the output SVG file
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
