//! Error types for lineage operations.
//!
//! [`LineageError`] covers every failure the library reports. Construction
//! errors surface synchronously from the graph builder; layout errors are
//! returned through the layout future as [`LineageError::Layout`].

use std::{fmt, io, time::Duration};

use thiserror::Error;

use crate::registry::{EntityKey, Identity};

/// A required field of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Domain,
    SourceSystem,
    Table,
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Domain => "domain",
            Self::SourceSystem => "sourceSystem",
            Self::Table => "table",
        })
    }
}

/// State a layout snapshot can fall behind on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleState {
    /// Nodes or edges were added.
    Graph,
    /// A group was collapsed or expanded.
    Folding,
}

impl fmt::Display for StaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Graph => "graph revision",
            Self::Folding => "folding generation",
        })
    }
}

/// Why a layout run produced no geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutFailure {
    #[error("layout engine failed: {0}")]
    Engine(String),

    #[error("layout did not finish within {0:?}")]
    Timeout(Duration),

    #[error("layout task was cancelled")]
    Cancelled,

    #[error("layout result is missing a position for node {0}")]
    Incomplete(usize),

    #[error("{state} changed since the layout started (was {expected}, now {actual})")]
    Stale {
        state: StaleState,
        expected: u64,
        actual: u64,
    },
}

/// The main error type for lineage operations.
#[derive(Debug, Error)]
pub enum LineageError {
    #[error("row {row_index}: required field `{field}` is missing or empty")]
    Validation { row_index: usize, field: RowField },

    #[error("key `{key}` already belongs to {existing}, cannot reuse it for {requested}")]
    DuplicateKeyConflict {
        key: EntityKey,
        existing: Identity,
        requested: Identity,
    },

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Folding error: {0}")]
    Folding(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutFailure),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}
