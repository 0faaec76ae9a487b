//! Orthogonal edge routing.

use lineage_core::geometry::{Bounds, Point};

/// Routes an edge from `source` to `target` with horizontal and vertical
/// segments only.
///
/// When the boxes are apart horizontally the route leaves the facing side of
/// the source, turns once in the gap and enters the facing side of the
/// target. The vertical run sits `clearance` before the target, or in the
/// middle of the gap when the gap is narrower than twice that. When the boxes
/// overlap horizontally the route leaves the top or bottom instead and turns
/// halfway between them.
///
/// # Examples
///
/// ```
/// use lineage::layout::route_orthogonal;
/// use lineage_core::geometry::{Bounds, Point, Size};
///
/// let source = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 50.0));
/// let target = Bounds::new_from_top_left(Point::new(200.0, 100.0), Size::new(60.0, 30.0));
///
/// let points = route_orthogonal(source, target, 20.0);
/// assert_eq!(
///     points,
///     vec![
///         Point::new(100.0, 25.0),
///         Point::new(180.0, 25.0),
///         Point::new(180.0, 115.0),
///         Point::new(200.0, 115.0),
///     ]
/// );
/// ```
pub fn route_orthogonal(source: Bounds, target: Bounds, clearance: f32) -> Vec<Point> {
    let source_center = source.center();
    let target_center = target.center();

    if target.min_x() >= source.max_x() {
        let start = Point::new(source.max_x(), source_center.y());
        let end = Point::new(target.min_x(), target_center.y());
        let gap = end.x() - start.x();
        let turn_x = end.x() - clearance.min(gap / 2.0);
        return horizontal_route(start, end, turn_x);
    }

    if target.max_x() <= source.min_x() {
        let start = Point::new(source.min_x(), source_center.y());
        let end = Point::new(target.max_x(), target_center.y());
        let gap = start.x() - end.x();
        let turn_x = end.x() + clearance.min(gap / 2.0);
        return horizontal_route(start, end, turn_x);
    }

    let (start, end) = if target_center.y() >= source_center.y() {
        (
            Point::new(source_center.x(), source.max_y()),
            Point::new(target_center.x(), target.min_y()),
        )
    } else {
        (
            Point::new(source_center.x(), source.min_y()),
            Point::new(target_center.x(), target.max_y()),
        )
    };
    let turn_y = (start.y() + end.y()) / 2.0;

    if start.x() == end.x() {
        vec![start, end]
    } else {
        vec![
            start,
            Point::new(start.x(), turn_y),
            Point::new(end.x(), turn_y),
            end,
        ]
    }
}

fn horizontal_route(start: Point, end: Point, turn_x: f32) -> Vec<Point> {
    if start.y() == end.y() {
        return vec![start, end];
    }
    vec![
        start,
        Point::new(turn_x, start.y()),
        Point::new(turn_x, end.y()),
        end,
    ]
}

/// Returns true when consecutive points share an x or a y coordinate.
pub fn is_orthogonal(points: &[Point]) -> bool {
    points
        .windows(2)
        .all(|pair| pair[0].x() == pair[1].x() || pair[0].y() == pair[1].y())
}
