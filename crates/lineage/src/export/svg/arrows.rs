use std::collections::BTreeSet;

use svg::node::element::{Definitions, Marker, Path};

use lineage_core::{color::Color, geometry::Point};

/// Creates one arrowhead marker per stroke color in use.
pub fn create_marker_definitions<'a, I>(colors: I) -> Definitions
where
    I: IntoIterator<Item = &'a Color>,
{
    // Sorted and deduplicated so output is stable.
    let colors: BTreeSet<(String, String)> = colors
        .into_iter()
        .map(|color| (color.to_id_fragment(), color.to_string()))
        .collect();

    colors
        .into_iter()
        .fold(Definitions::new(), |defs, (id, fill)| {
            defs.add(
                Marker::new()
                    .set("id", format!("arrow-{id}"))
                    .set("viewBox", "0 0 10 10")
                    .set("refX", 9)
                    .set("refY", 5)
                    .set("markerWidth", 6)
                    .set("markerHeight", 6)
                    .set("orient", "auto")
                    .add(
                        Path::new()
                            .set("d", "M 0 0 L 10 5 L 0 10 z")
                            .set("fill", fill),
                    ),
            )
        })
}

/// Marker reference for an arrowhead of `color`.
pub fn marker_url(color: &Color) -> String {
    format!("url(#arrow-{})", color.to_id_fragment())
}

/// Path data for a polyline through `points`.
pub fn polyline_path_data(points: &[Point]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let command = if i == 0 { 'M' } else { 'L' };
            format!("{command} {} {}", point.x(), point.y())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Creates the path element of a reference edge.
pub fn create_path(points: &[Point], color: &Color, width: f32) -> Path {
    Path::new()
        .set("d", polyline_path_data(points))
        .set("fill", "none")
        .set("stroke", *color)
        .set("stroke-width", width)
        .set("marker-end", marker_url(color))
}
