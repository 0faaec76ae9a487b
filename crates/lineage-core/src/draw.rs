//! Visual definitions for diagram nodes.
//!
//! - [`NodeGlyph`]: capability trait for anything that can draw a node box
//! - [`RectangleGlyph`], [`GroupGlyph`], [`PathGlyph`]: the built-in glyphs
//! - [`LayeredOutput`]: z-ordered collection of SVG nodes

mod glyph;
mod layer;

pub use glyph::{GroupGlyph, NodeGlyph, PathGlyph, RectangleGlyph, Visual, glyph_for};
pub use layer::{LayeredOutput, RenderLayer, SvgNode};
