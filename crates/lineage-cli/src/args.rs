//! Command-line argument definitions for the lineage CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, folding and logging verbosity.

use clap::Parser;

/// Command-line arguments for the lineage diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input JSON file holding an array of rows
    #[arg(help = "Path to the input rows (JSON)")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Domain to render collapsed; may be repeated
    #[arg(long, value_name = "DOMAIN")]
    pub collapse: Vec<String>,

    /// Fail on entity key conflicts instead of reporting them
    #[arg(long)]
    pub strict_keys: bool,
}
