pub mod svg;

use crate::{error::LineageError, folding::FoldingView};

/// Writes the visible projection of a graph somewhere.
pub trait Exporter {
    fn export_view(&self, view: &FoldingView<'_>) -> Result<(), LineageError>;
}
