//! Affine mapping between scale (data) coordinates and paint (pixel) coordinates.

use raster_common::{PointF, RectF};
use std::fmt;

/// Compare two values with a tolerance relative to `interval_size`.
///
/// Returns -1, 0 or 1 like a three-way comparison.
fn fuzzy_compare(value1: f64, value2: f64, interval_size: f64) -> i32 {
    let eps = (1.0e-6 * interval_size).abs();

    if value2 - value1 > eps {
        -1
    } else if value1 - value2 > eps {
        1
    } else {
        0
    }
}

fn snap_to_zero(value: f64, interval_size: f64) -> f64 {
    if fuzzy_compare(value, 0.0, interval_size) == 0 {
        0.0
    } else {
        value
    }
}

/// A linear map from the scale interval `[s1, s2]` to the paint interval `[p1, p2]`.
///
/// Both intervals may be inverted; a map from `[0, 10]` to `[100, 0]` flips the axis,
/// which is the usual case for a Y axis drawn top-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMap {
    s1: f64,
    s2: f64,
    p1: f64,
    p2: f64,
    cnv: f64,
}

impl Default for ScaleMap {
    /// Both intervals are `[0, 1]`.
    fn default() -> Self {
        Self {
            s1: 0.0,
            s2: 1.0,
            p1: 0.0,
            p2: 1.0,
            cnv: 1.0,
        }
    }
}

impl ScaleMap {
    pub fn new(s1: f64, s2: f64, p1: f64, p2: f64) -> Self {
        let mut map = Self {
            s1,
            s2,
            p1,
            p2,
            cnv: 1.0,
        };
        map.update_factor();
        map
    }

    pub fn set_scale_interval(&mut self, s1: f64, s2: f64) {
        self.s1 = s1;
        self.s2 = s2;
        self.update_factor();
    }

    pub fn set_paint_interval(&mut self, p1: f64, p2: f64) {
        self.p1 = p1;
        self.p2 = p2;
        self.update_factor();
    }

    fn update_factor(&mut self) {
        self.cnv = if self.s1 != self.s2 {
            (self.p2 - self.p1) / (self.s2 - self.s1)
        } else {
            1.0
        };
    }

    pub fn s1(&self) -> f64 {
        self.s1
    }

    pub fn s2(&self) -> f64 {
        self.s2
    }

    pub fn p1(&self) -> f64 {
        self.p1
    }

    pub fn p2(&self) -> f64 {
        self.p2
    }

    /// Length of the paint interval.
    pub fn p_dist(&self) -> f64 {
        (self.p2 - self.p1).abs()
    }

    /// Length of the scale interval.
    pub fn s_dist(&self) -> f64 {
        (self.s2 - self.s1).abs()
    }

    /// Scale to paint coordinate.
    #[inline]
    pub fn transform(&self, s: f64) -> f64 {
        self.p1 + (s - self.s1) * self.cnv
    }

    /// Paint to scale coordinate.
    #[inline]
    pub fn inv_transform(&self, p: f64) -> f64 {
        self.s1 + (p - self.p1) / self.cnv
    }

    /// True when the paint direction runs against the scale direction.
    pub fn is_inverting(&self) -> bool {
        (self.p1 < self.p2) != (self.s1 < self.s2)
    }

    /// Transform a point from scale to paint coordinates.
    pub fn transform_point(x_map: &ScaleMap, y_map: &ScaleMap, pos: PointF) -> PointF {
        PointF::new(x_map.transform(pos.x), y_map.transform(pos.y))
    }

    /// Transform a point from paint to scale coordinates.
    pub fn inv_transform_point(x_map: &ScaleMap, y_map: &ScaleMap, pos: PointF) -> PointF {
        PointF::new(x_map.inv_transform(pos.x), y_map.inv_transform(pos.y))
    }

    /// Transform a rectangle from scale to paint coordinates.
    ///
    /// Edges within `1e-6` of the extent are snapped to zero and the result
    /// covers whole pixels, so its width and height are one larger than the
    /// distance between the transformed edges.
    pub fn transform_rect(x_map: &ScaleMap, y_map: &ScaleMap, rect: &RectF) -> RectF {
        let mut x1 = x_map.transform(rect.left());
        let mut x2 = x_map.transform(rect.right());
        let mut y1 = y_map.transform(rect.top());
        let mut y2 = y_map.transform(rect.bottom());

        if x2 < x1 {
            std::mem::swap(&mut x1, &mut x2);
        }
        if y2 < y1 {
            std::mem::swap(&mut y1, &mut y2);
        }

        let (w, h) = (x2 - x1, y2 - y1);
        let x1 = snap_to_zero(x1, w);
        let x2 = snap_to_zero(x2, w);
        let y1 = snap_to_zero(y1, h);
        let y2 = snap_to_zero(y2, h);

        RectF::new(x1, y1, x2 - x1 + 1.0, y2 - y1 + 1.0)
    }

    /// Transform a pixel rectangle back to scale coordinates.
    ///
    /// The right and bottom edges are taken one pixel inside, matching
    /// [`ScaleMap::transform_rect`]. The result is normalized.
    pub fn inv_transform_rect(x_map: &ScaleMap, y_map: &ScaleMap, rect: &RectF) -> RectF {
        let x1 = x_map.inv_transform(rect.left());
        let x2 = x_map.inv_transform(rect.right() - 1.0);
        let y1 = y_map.inv_transform(rect.top());
        let y2 = y_map.inv_transform(rect.bottom() - 1.0);

        RectF::from_corners(x1, y1, x2, y2).normalized()
    }
}

impl fmt::Display for ScaleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScaleMap(s:{}->{}, p:{}->{})",
            self.s1, self.s2, self.p1, self.p2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let map = ScaleMap::default();
        assert_eq!(map.transform(0.25), 0.25);
        assert_eq!(map.inv_transform(0.75), 0.75);
    }

    #[test]
    fn test_degenerate_scale_interval() {
        let map = ScaleMap::new(3.0, 3.0, 0.0, 100.0);
        assert_eq!(map.transform(3.0), 0.0);
        assert_eq!(map.transform(4.0), 1.0);
        assert!(map.inv_transform(50.0).is_finite());
    }

    #[test]
    fn test_fuzzy_compare() {
        assert_eq!(fuzzy_compare(1e-9, 0.0, 100.0), 0);
        assert_eq!(fuzzy_compare(1.0, 0.0, 100.0), 1);
        assert_eq!(fuzzy_compare(-1.0, 0.0, 100.0), -1);
    }

    #[test]
    fn test_display() {
        let map = ScaleMap::new(0.0, 10.0, 0.0, 200.0);
        assert_eq!(map.to_string(), "ScaleMap(s:0->10, p:0->200)");
    }
}
