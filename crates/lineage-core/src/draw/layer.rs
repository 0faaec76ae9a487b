//! Layer-based SVG output.
//!
//! Drawables push SVG nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]; rendering emits one `<g>` per non-empty layer, bottom to
//! top, so domain groups always sit under edges and leaves.
//!
//! # Example
//!
//! ```
//! # use lineage_core::draw::{RenderLayer, LayeredOutput};
//! # use svg::node::element::{Rectangle, Text};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Label, Box::new(Text::new("Table1")));
//! output.add_to_layer(RenderLayer::Group, Box::new(Rectangle::new()));
//!
//! let groups = output.render();
//! assert_eq!(groups.len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Domain group boxes
    Group,
    /// Reference edges between systems and tables
    Edge,
    /// System and table boxes, and collapsed domains
    Node,
    /// Node labels
    Label,
}

impl RenderLayer {
    /// Returns the value written to the `data-layer` attribute.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Edge => "edge",
            Self::Node => "node",
            Self::Label => "label",
        }
    }
}

/// SVG nodes grouped by rendering layer.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node to `layer`, keeping insertion order within the layer.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Moves every node of `other` into this output.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders all layers to `<g data-layer="...">` groups, consuming the output.
    pub fn render(mut self) -> Vec<SvgNode> {
        // Stable, so insertion order survives within a layer.
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result: Vec<SvgNode> = Vec::new();
        let mut current: Option<(RenderLayer, svg_element::Group)> = None;

        for (layer, node) in self.items {
            current = match current {
                Some((current_layer, group)) if current_layer == layer => {
                    Some((layer, group.add(node)))
                }
                previous => {
                    if let Some((_, group)) = previous {
                        result.push(Box::new(group));
                    }
                    let group = svg_element::Group::new().set("data-layer", layer.name());
                    Some((layer, group.add(node)))
                }
            };
        }

        if let Some((_, group)) = current {
            result.push(Box::new(group));
        }

        result
    }
}
