//! SVG rendering of folded views.

mod arrows;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, error, info};
use petgraph::graph::NodeIndex;
use svg::{
    Document,
    node::element::{Rectangle, Text},
};

use lineage_core::{
    draw::{LayeredOutput, RenderLayer, Visual, glyph_for},
    geometry::{Bounds, Insets},
    kind::EntityKind,
};

use super::Exporter;
use crate::{
    config::LayoutConfig, error::LineageError, folding::FoldingView, layout::route_orthogonal,
};

/// Visuals produced for earlier frames, reused while a node keeps its size.
#[derive(Debug, Default)]
pub struct VisualCache {
    visuals: HashMap<NodeIndex, Visual>,
}

impl VisualCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn get(&self, node: NodeIndex) -> Option<&Visual> {
        self.visuals.get(&node)
    }
}

/// Renders the visible projection of a graph to SVG.
#[derive(Debug, Clone)]
pub struct Svg {
    margin: f32,
    header_height: f32,
    clearance: f32,
    font_size: f32,
}

impl Default for Svg {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl Svg {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            margin: 50.0,
            header_height: config.header_height,
            clearance: config.clearance,
            font_size: 12.0,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Renders `view` with the geometry committed to its graph.
    pub fn render(&self, view: &FoldingView<'_>) -> Document {
        self.render_frame(view, &IndexMap::new(), &mut VisualCache::new())
    }

    /// Renders `view` with `frame` overriding committed node bounds.
    ///
    /// Glyph visuals are taken from `cache` when their size still fits, so an
    /// animation that only moves nodes redraws nothing.
    pub fn render_frame(
        &self,
        view: &FoldingView<'_>,
        frame: &IndexMap<NodeIndex, Bounds>,
        cache: &mut VisualCache,
    ) -> Document {
        let graph = view.graph();
        let visible = view.visible_nodes();

        let bounds_of = |idx: NodeIndex| -> Option<Bounds> {
            frame
                .get(&idx)
                .copied()
                .or_else(|| graph.node(idx).map(|node| node.geometry()))
        };

        let mut output = LayeredOutput::new();
        let mut content: Option<Bounds> = None;

        for &idx in &visible {
            let (Some(node), Some(bounds)) = (graph.node(idx), bounds_of(idx)) else {
                continue;
            };
            content = Some(content.map_or(bounds, |c| c.merge(&bounds)));

            let glyph = glyph_for(node.kind(), node.style(), self.header_height);
            let size = bounds.to_size();
            let visual = match cache.visuals.remove(&idx) {
                Some(old) => glyph.update_visual(old, size),
                None => glyph.produce_visual(size),
            };

            let expanded_group = node.is_group() && !view.is_collapsed(idx);
            let layer = if expanded_group {
                RenderLayer::Group
            } else {
                RenderLayer::Node
            };
            let element = visual
                .placed_at(bounds.min_point())
                .set("class", node.kind().name())
                .set("data-node", idx.index());
            output.add_to_layer(layer, Box::new(element));
            cache.visuals.insert(idx, visual);

            let label =
                self.render_label(node.kind(), node.label(), bounds, view.is_collapsed(idx));
            output.add_to_layer(RenderLayer::Label, Box::new(label));
        }

        let mut stroke_colors = Vec::new();
        for edge in view.visible_edges() {
            let (Some(source), Some(target)) = (bounds_of(edge.source), bounds_of(edge.target))
            else {
                continue;
            };
            let color = graph
                .node(edge.source)
                .map(|node| node.style().stroke())
                .unwrap_or_default();
            let width = 1.0 + (edge.multiplicity.saturating_sub(1).min(4) as f32) * 0.5;
            let points = route_orthogonal(source, target, self.clearance);

            output.add_to_layer(
                RenderLayer::Edge,
                Box::new(arrows::create_path(&points, &color, width)),
            );
            stroke_colors.push(color);
        }

        let view_box = content
            .unwrap_or_default()
            .add_padding(Insets::uniform(self.margin));
        debug!(
            nodes = visible.len(),
            width = view_box.width(),
            height = view_box.height();
            "SVG document rendered"
        );

        let background = Rectangle::new()
            .set("x", view_box.min_x())
            .set("y", view_box.min_y())
            .set("width", view_box.width())
            .set("height", view_box.height())
            .set("fill", "white");

        output.render().into_iter().fold(
            Document::new()
                .set(
                    "viewBox",
                    (
                        view_box.min_x(),
                        view_box.min_y(),
                        view_box.width(),
                        view_box.height(),
                    ),
                )
                .set("width", view_box.width())
                .set("height", view_box.height())
                .add(arrows::create_marker_definitions(&stroke_colors))
                .add(background),
            |doc, layer| doc.add(layer),
        )
    }

    fn render_label(
        &self,
        kind: EntityKind,
        label: &str,
        bounds: Bounds,
        collapsed: bool,
    ) -> Text {
        let text = if collapsed {
            format!("{label} [+]")
        } else {
            label.to_string()
        };

        let (x, y, anchor) = if kind.is_group() {
            (
                bounds.min_x() + 8.0,
                bounds.min_y() + self.header_height.min(bounds.height()) / 2.0,
                "start",
            )
        } else {
            let center = bounds.center();
            (center.x(), center.y(), "middle")
        };

        Text::new(text)
            .set("x", x)
            .set("y", y)
            .set("text-anchor", anchor)
            .set("dominant-baseline", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", self.font_size)
    }

    /// Writes `document` to `path`.
    pub fn write_document(
        &self,
        document: &Document,
        path: impl AsRef<Path>,
    ) -> Result<(), LineageError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Writing SVG file");

        fs::write(path, document.to_string()).map_err(|err| {
            error!(path = path.display().to_string(), err:err; "Failed to write SVG file");
            LineageError::Io(err)
        })
    }
}

/// [`Exporter`] writing the committed geometry of a view to an SVG file.
#[derive(Debug, Clone)]
pub struct SvgFile {
    renderer: Svg,
    path: PathBuf,
}

impl SvgFile {
    pub fn new(renderer: Svg, path: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Exporter for SvgFile {
    fn export_view(&self, view: &FoldingView<'_>) -> Result<(), LineageError> {
        if view.visible_nodes().is_empty() {
            return Err(LineageError::Export("view has no visible nodes".to_string()));
        }
        let document = self.renderer.render(view);
        self.renderer.write_document(&document, &self.path)
    }
}
