//! Node glyphs.
//!
//! A glyph turns a node box into a [`Visual`]. Glyphs are a capability
//! ([`NodeGlyph`]) rather than a base type: any style variant produces a
//! visual for a size and says whether a previously produced visual can be
//! kept as is.

use std::{fmt, rc::Rc};

use svg::node::element as svg_element;

use crate::{
    color::Color,
    geometry::{Point, Size},
    kind::EntityKind,
    style::StyleDescriptor,
};

/// A fixed-size vector drawing for one node box.
///
/// The drawing is a nested `<svg>` whose viewBox matches its size, so it can
/// be placed anywhere with [`Visual::placed_at`]. Cloning a visual shares the
/// underlying drawing.
#[derive(Debug, Clone)]
pub struct Visual {
    size: Size,
    element: Rc<svg_element::SVG>,
}

impl Visual {
    fn new(size: Size, element: svg_element::SVG) -> Self {
        Self {
            size,
            element: Rc::new(element),
        }
    }

    /// Size the visual was produced for.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns true when both visuals share the same drawing.
    pub fn same_as(&self, other: &Visual) -> bool {
        Rc::ptr_eq(&self.element, &other.element)
    }

    /// Returns the drawing positioned with its top-left corner at `top_left`.
    pub fn placed_at(&self, top_left: Point) -> svg_element::SVG {
        svg_element::SVG::clone(&self.element)
            .set("x", top_left.x())
            .set("y", top_left.y())
    }
}

fn canvas(size: Size) -> svg_element::SVG {
    svg_element::SVG::new()
        .set("width", size.width())
        .set("height", size.height())
        .set(
            "viewBox",
            format!("0 0 {} {}", size.width(), size.height()),
        )
}

/// Capability implemented by every node glyph.
pub trait NodeGlyph: fmt::Debug {
    /// Draws the glyph for a node box of `size`.
    fn produce_visual(&self, size: Size) -> Visual;

    /// Returns true when `old` can be shown for a node box of `size`.
    fn can_reuse_visual(&self, old: &Visual, size: Size) -> bool {
        old.size() == size
    }

    /// Returns `old` untouched when it can be reused, otherwise a fresh visual.
    fn update_visual(&self, old: Visual, size: Size) -> Visual {
        if self.can_reuse_visual(&old, size) {
            old
        } else {
            self.produce_visual(size)
        }
    }
}

/// Plain rectangle used for systems and tables.
#[derive(Debug, Clone)]
pub struct RectangleGlyph {
    style: StyleDescriptor,
    stroke_width: f32,
}

impl RectangleGlyph {
    pub fn new(style: StyleDescriptor) -> Self {
        Self {
            style,
            stroke_width: 1.0,
        }
    }

    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        self.stroke_width = stroke_width;
        self
    }
}

impl NodeGlyph for RectangleGlyph {
    fn produce_visual(&self, size: Size) -> Visual {
        // Inset by half the stroke so the outline stays inside the viewBox.
        let inset = self.stroke_width / 2.0;
        let rect = svg_element::Rectangle::new()
            .set("x", inset)
            .set("y", inset)
            .set("width", (size.width() - self.stroke_width).max(0.0))
            .set("height", (size.height() - self.stroke_width).max(0.0))
            .set("fill", self.style.fill())
            .set("stroke", self.style.stroke())
            .set("stroke-width", self.stroke_width);

        Visual::new(size, canvas(size).add(rect))
    }
}

/// Domain group box: a filled content area under a header band.
#[derive(Debug, Clone)]
pub struct GroupGlyph {
    style: StyleDescriptor,
    header_height: f32,
}

impl GroupGlyph {
    pub fn new(style: StyleDescriptor, header_height: f32) -> Self {
        Self {
            style,
            header_height,
        }
    }
}

impl NodeGlyph for GroupGlyph {
    fn produce_visual(&self, size: Size) -> Visual {
        let header_height = self.header_height.min(size.height());

        let content = svg_element::Rectangle::new()
            .set("x", 0.5)
            .set("y", 0.5)
            .set("width", (size.width() - 1.0).max(0.0))
            .set("height", (size.height() - 1.0).max(0.0))
            .set("fill", self.style.fill())
            .set("fill-opacity", 0.6)
            .set("stroke", self.style.stroke())
            .set("stroke-width", 1);

        let header = svg_element::Rectangle::new()
            .set("x", 0.5)
            .set("y", 0.5)
            .set("width", (size.width() - 1.0).max(0.0))
            .set("height", header_height)
            .set("fill", self.style.stroke())
            .set("fill-opacity", 0.2)
            .set("stroke", "none");

        Visual::new(size, canvas(size).add(content).add(header))
    }
}

/// Glyph drawn from arbitrary SVG path data.
///
/// # Examples
///
/// ```
/// use lineage_core::{
///     color::Color,
///     draw::{NodeGlyph, PathGlyph},
///     geometry::Size,
/// };
///
/// let cylinder = PathGlyph::new("M0 10 A30 10 0 0 0 60 10 V40 A30 10 0 0 1 0 40 Z")
///     .with_fill(Color::new("lightyellow").unwrap());
///
/// let visual = cylinder.produce_visual(Size::new(60.0, 50.0));
/// let same = cylinder.update_visual(visual.clone(), Size::new(60.0, 50.0));
/// assert!(same.same_as(&visual));
/// ```
#[derive(Debug, Clone)]
pub struct PathGlyph {
    path_data: String,
    fill: Color,
    stroke: Color,
    stroke_width: f32,
}

impl PathGlyph {
    /// Creates a path glyph with a black outline and no fill color override.
    pub fn new(path_data: impl Into<String>) -> Self {
        Self {
            path_data: path_data.into(),
            fill: Color::new("white").expect("'white' is a valid CSS color"),
            stroke: Color::default(),
            stroke_width: 1.0,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: Color, stroke_width: f32) -> Self {
        self.stroke = stroke;
        self.stroke_width = stroke_width;
        self
    }

    pub fn path_data(&self) -> &str {
        &self.path_data
    }
}

impl NodeGlyph for PathGlyph {
    fn produce_visual(&self, size: Size) -> Visual {
        let path = svg_element::Path::new()
            .set("d", self.path_data.as_str())
            .set("fill", self.fill)
            .set("stroke", self.stroke)
            .set("stroke-width", self.stroke_width);

        Visual::new(size, canvas(size).add(path))
    }
}

/// Returns the built-in glyph for a node kind.
///
/// `header_height` is only used by domain groups.
pub fn glyph_for(
    kind: EntityKind,
    style: StyleDescriptor,
    header_height: f32,
) -> Box<dyn NodeGlyph> {
    match kind {
        EntityKind::Domain => Box::new(GroupGlyph::new(style, header_height)),
        EntityKind::System | EntityKind::Table => Box::new(RectangleGlyph::new(style)),
    }
}
