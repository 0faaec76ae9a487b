//! Readability metrics for a layout result.

use lineage_core::geometry::Point;

use super::engine::{LayoutInput, LayoutResult, RoutedEdge};

/// Edge crossings and node overlaps of a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutQuality {
    pub crossings: usize,
    pub overlaps: usize,
}

impl LayoutQuality {
    /// Measures `result` against the containment of `input`.
    ///
    /// A group overlapping its own descendants is not an overlap. Edges that
    /// share an endpoint node are never counted as crossing.
    pub fn measure(input: &LayoutInput, result: &LayoutResult) -> Self {
        let boxes: Vec<_> = result.nodes.iter().collect();
        let mut overlaps = 0;
        for (i, (a, a_bounds)) in boxes.iter().enumerate() {
            for (b, b_bounds) in &boxes[i + 1..] {
                if input.is_ancestor(**a, **b) || input.is_ancestor(**b, **a) {
                    continue;
                }
                if a_bounds.intersects(b_bounds) {
                    overlaps += 1;
                }
            }
        }

        let mut crossings = 0;
        for (i, a) in result.edges.iter().enumerate() {
            for b in &result.edges[i + 1..] {
                if share_endpoint(a, b) {
                    continue;
                }
                if polylines_cross(&a.points, &b.points) {
                    crossings += 1;
                }
            }
        }

        Self {
            crossings,
            overlaps,
        }
    }

    /// Returns true when `self` is worse than `baseline` on either metric.
    pub fn regresses_from(&self, baseline: &LayoutQuality) -> bool {
        self.crossings > baseline.crossings || self.overlaps > baseline.overlaps
    }
}

fn share_endpoint(a: &RoutedEdge, b: &RoutedEdge) -> bool {
    a.source == b.source || a.source == b.target || a.target == b.source || a.target == b.target
}

fn polylines_cross(a: &[Point], b: &[Point]) -> bool {
    a.windows(2).any(|sa| {
        b.windows(2)
            .any(|sb| segments_cross(sa[0], sa[1], sb[0], sb[1]))
    })
}

/// Proper crossing of an axis-aligned horizontal and vertical segment.
fn segments_cross(a0: Point, a1: Point, b0: Point, b1: Point) -> bool {
    let a_horizontal = a0.y() == a1.y();
    let b_horizontal = b0.y() == b1.y();
    if a_horizontal == b_horizontal {
        return false;
    }

    let (h0, h1, v0, v1) = if a_horizontal {
        (a0, a1, b0, b1)
    } else {
        (b0, b1, a0, a1)
    };

    let x = v0.x();
    let y = h0.y();
    let (h_min, h_max) = (h0.x().min(h1.x()), h0.x().max(h1.x()));
    let (v_min, v_max) = (v0.y().min(v1.y()), v0.y().max(v1.y()));

    h_min < x && x < h_max && v_min < y && y < v_max
}
