//! CLI logic for the lineage diagram tool.
//!
//! Reads rows from a JSON file, builds and folds the diagram, lays it out and
//! writes the result as SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{debug, info, trace};
use thiserror::Error;

use lineage::{
    Diagram, LineageError, Row,
    export::svg::{Svg, SvgFile},
};

/// Errors reported by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Lineage(#[from] LineageError),

    #[error("Failed to read rows from {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Run the lineage CLI application
///
/// Must be called inside a tokio runtime.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or invalid rows
/// - Unknown domains passed to `--collapse`
/// - Layout errors
/// - Rendering errors
pub async fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing rows"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if args.strict_keys {
        app_config.builder.strict_keys = true;
    }

    let content = fs::read_to_string(&args.input).map_err(LineageError::from)?;
    trace!(content; "File content");
    let rows: Vec<Row> = serde_json::from_str(&content).map_err(|source| CliError::Input {
        path: args.input.clone(),
        source,
    })?;
    debug!(rows = rows.len(); "Parsed rows");

    let mut diagram = Diagram::new(&app_config)?;
    diagram.ingest(&rows)?;

    for domain in &args.collapse {
        diagram.collapse_domain(domain)?;
    }

    diagram.relayout().await?;

    let exporter = SvgFile::new(Svg::from_config(&app_config.layout), &args.output);
    diagram.export(&exporter)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
