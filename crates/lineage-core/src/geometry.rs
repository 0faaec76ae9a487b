//! Geometric primitives for diagram layout and positioning.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! Coordinates follow SVG conventions:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```

use serde::Deserialize;

/// Rounds `value` to the nearest multiple of `grid`.
///
/// A non-positive grid leaves the value untouched.
///
/// # Examples
///
/// ```
/// # use lineage_core::geometry::snap_to_grid;
/// assert_eq!(snap_to_grid(23.0, 10.0), 20.0);
/// assert_eq!(snap_to_grid(25.0, 10.0), 30.0);
/// assert_eq!(snap_to_grid(7.3, 0.0), 7.3);
/// ```
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use lineage_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height
    pub fn height(self) -> f32 {
        self.height
    }

    /// Component-wise maximum of two sizes.
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Grows the size by the given insets.
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.left + insets.right,
            height: self.height + insets.top + insets.bottom,
        }
    }

    /// Linear interpolation towards `other`.
    pub fn lerp(self, other: Size, t: f32) -> Self {
        Self {
            width: self.width + (other.width - self.width) * t,
            height: self.height + (other.height - self.height) * t,
        }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Smallest bounds containing both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lineage_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let b = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let merged = a.merge(&b);
    /// assert_eq!(merged.width(), 130.0);
    /// assert_eq!(merged.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Expands the bounds outward by the given insets.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }

    /// Returns true when the interiors of the two bounds overlap.
    ///
    /// Bounds that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Returns true when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    /// Interpolates position and size towards `other`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let top_left = self.min_point().lerp(other.min_point(), t);
        let size = self.to_size().lerp(other.to_size(), t);
        Self::new_from_top_left(top_left, size)
    }
}

/// Spacing around an element with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates insets with values for each side, clockwise from the top.
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates insets with the same value on every side.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns a copy with a different top inset.
    pub fn with_top(self, top: f32) -> Self {
        Self { top, ..self }
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    /// Merged bounds should contain both original bounds.
    fn check_bounds_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);

        prop_assert!(merged.contains(&b1));
        prop_assert!(merged.contains(&b2));
        Ok(())
    }

    /// Intersection is symmetric.
    fn check_intersects_is_symmetric(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        prop_assert_eq!(b1.intersects(&b2), b2.intersects(&b1));
        Ok(())
    }

    /// Translating moves the bounds without resizing them.
    fn check_translate_keeps_size(bounds: Bounds, offset: Point) -> Result<(), TestCaseError> {
        let moved = bounds.translate(offset);

        prop_assert!(approx_eq!(f32, moved.min_x(), bounds.min_x() + offset.x(), epsilon = 0.01));
        prop_assert!(approx_eq!(f32, moved.min_y(), bounds.min_y() + offset.y(), epsilon = 0.01));
        prop_assert!(approx_eq!(f32, moved.width(), bounds.width(), epsilon = 0.01));
        prop_assert!(approx_eq!(f32, moved.height(), bounds.height(), epsilon = 0.01));
        Ok(())
    }

    /// Interpolated bounds stay inside the union of both endpoints.
    fn check_lerp_stays_within_union(
        from: Bounds,
        to: Bounds,
        t: f32,
    ) -> Result<(), TestCaseError> {
        let union = from.merge(&to).add_padding(Insets::uniform(0.01));
        prop_assert!(union.contains(&from.lerp(&to, t)));
        Ok(())
    }

    /// Snapped values land on the grid and move by at most half a cell.
    fn check_snap_to_grid(value: f32, grid: f32) -> Result<(), TestCaseError> {
        let snapped = snap_to_grid(value, grid);
        let cells = snapped / grid;

        prop_assert!(approx_eq!(f32, cells, cells.round(), epsilon = 0.001));
        prop_assert!((snapped - value).abs() <= grid / 2.0 + 0.001);
        Ok(())
    }

    proptest! {
        #[test]
        fn bounds_merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_bounds_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn intersects_is_symmetric(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_intersects_is_symmetric(b1, b2)?;
        }

        #[test]
        fn translate_keeps_size(b in bounds_strategy(), offset in point_strategy()) {
            check_translate_keeps_size(b, offset)?;
        }

        #[test]
        fn lerp_stays_within_union(
            from in bounds_strategy(),
            to in bounds_strategy(),
            t in 0.0f32..=1.0,
        ) {
            check_lerp_stays_within_union(from, to, t)?;
        }

        #[test]
        fn snap_lands_on_grid(value in -1000.0f32..1000.0, grid in 1.0f32..50.0) {
            check_snap_to_grid(value, grid)?;
        }
    }
}
