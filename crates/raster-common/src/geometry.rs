//! Points, rectangles and sizes in scale or paint coordinates.
//!
//! Rectangles are stored as origin plus extent (`x`, `y`, `width`, `height`),
//! so `right()` is `x + width` and `bottom()` is `y + height`.

use serde::{Deserialize, Serialize};

/// Axis of a raster: X and Y span the plane, Z is the value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point with a value attached, used while intersecting triangles with a level plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when all coordinates are zero.
    pub fn is_null(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Drop the z coordinate.
    pub fn to_point(self) -> PointF {
        PointF::new(self.x, self.y)
    }
}

impl From<PointF> for Point3D {
    fn from(p: PointF) -> Self {
        Point3D::new(p.x, p.y, 0.0)
    }
}

/// Integer extent of an image or a sampling raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Component-wise minimum.
    pub fn bounded_to(&self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// A rectangle in floating point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corner points.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }

    /// A rectangle is valid when both extents are positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// A rectangle is empty when either extent is zero or negative (or NaN).
    pub fn is_empty(&self) -> bool {
        !self.is_valid()
    }

    /// Flip negative extents so that width and height become non-negative.
    pub fn normalized(&self) -> RectF {
        let mut r = *self;
        if r.width < 0.0 {
            r.x += r.width;
            r.width = -r.width;
        }
        if r.height < 0.0 {
            r.y += r.height;
            r.height = -r.height;
        }
        r
    }

    /// Check if a point is contained within this rectangle (borders included).
    pub fn contains_point(&self, p: PointF) -> bool {
        let r = self.normalized();
        p.x >= r.left() && p.x <= r.right() && p.y >= r.top() && p.y <= r.bottom()
    }

    /// Check if this rectangle overlaps another one with a non-empty area.
    pub fn intersects(&self, other: &RectF) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
    }

    /// Compute the intersection of two rectangles, or an empty rectangle.
    pub fn intersected(&self, other: &RectF) -> RectF {
        if !self.intersects(other) {
            return RectF::default();
        }

        let a = self.normalized();
        let b = other.normalized();
        RectF::from_corners(
            a.left().max(b.left()),
            a.top().max(b.top()),
            a.right().min(b.right()),
            a.bottom().min(b.bottom()),
        )
    }

    /// Grow (or shrink, with a negative margin) the rectangle on every side.
    pub fn adjusted(&self, margin: f64) -> RectF {
        RectF::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Integer size, truncating each extent (negative extents become zero).
    pub fn to_size(&self) -> Size {
        Size::new(self.width.max(0.0) as usize, self.height.max(0.0) as usize)
    }
}
