//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use lineage::{LayoutFailure, LineageError};

use crate::CliError;

/// Adapter rendering a [`CliError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::Input { .. } => "lineage::input",
            CliError::Lineage(err) => match err {
                LineageError::Validation { .. } => "lineage::validation",
                LineageError::DuplicateKeyConflict { .. } => "lineage::key_conflict",
                LineageError::Graph(_) => "lineage::graph",
                LineageError::Folding(_) => "lineage::folding",
                LineageError::Layout(_) => "lineage::layout",
                LineageError::Io(_) => "lineage::io",
                LineageError::Config(_) => "lineage::config",
                LineageError::Export(_) => "lineage::export",
            },
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Input { .. } => {
                "expected a JSON array of {\"domain\", \"sourceSystem\", \"table\"} objects"
            }
            CliError::Lineage(LineageError::Validation { .. }) => {
                "every row needs a non-empty domain, sourceSystem and table"
            }
            CliError::Lineage(LineageError::DuplicateKeyConflict { .. }) => {
                "rename one of the entities, or drop --strict-keys to only report conflicts"
            }
            CliError::Lineage(LineageError::Layout(LayoutFailure::Timeout(_))) => {
                "raise `layout.timeout_ms` in the configuration file"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Wraps `err` for rendering by a miette report handler.
pub fn to_reportable(err: &CliError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}
