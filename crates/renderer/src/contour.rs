//! Contour line extraction (isolines) with an adaption of CONREC.
//!
//! The area is sampled on a regular raster. Every raster cell is split into
//! four triangles sharing a synthesized center point, and each triangle is
//! intersected with the plane of every contour level. The result is an
//! unordered list of line segments per level; segments are not stitched.
//!
//! See <http://paulbourke.net/papers/conrec/> for the original algorithm.

use crate::raster_data::{RasterData, RasterScope};
use raster_common::{Axis, Point3D, PointF, RectF, Size};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Flags customizing the contouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConrecFlags {
    /// Drop triangles with all three vertices exactly on a level.
    #[serde(default)]
    pub ignore_all_vertices_on_level: bool,
    /// Skip cells with values outside the Z interval of the data.
    #[serde(default)]
    pub ignore_out_of_range: bool,
}

impl ConrecFlags {
    pub const NONE: ConrecFlags = ConrecFlags {
        ignore_all_vertices_on_level: false,
        ignore_out_of_range: false,
    };
    pub const IGNORE_ALL_VERTICES_ON_LEVEL: ConrecFlags = ConrecFlags {
        ignore_all_vertices_on_level: true,
        ignore_out_of_range: false,
    };
    pub const IGNORE_OUT_OF_RANGE: ConrecFlags = ConrecFlags {
        ignore_all_vertices_on_level: false,
        ignore_out_of_range: true,
    };
}

impl std::ops::BitOr for ConrecFlags {
    type Output = ConrecFlags;

    fn bitor(self, rhs: ConrecFlags) -> ConrecFlags {
        ConrecFlags {
            ignore_all_vertices_on_level: self.ignore_all_vertices_on_level
                || rhs.ignore_all_vertices_on_level,
            ignore_out_of_range: self.ignore_out_of_range || rhs.ignore_out_of_range,
        }
    }
}

/// Line segments per contour level, ordered by level.
///
/// Every consecutive pair of points of a level is one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourLines {
    lines: Vec<(f64, Vec<PointF>)>,
}

impl ContourLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of levels with at least one segment.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Points of `level`, or `None` when nothing was emitted for it.
    pub fn get(&self, level: f64) -> Option<&[PointF]> {
        self.lines
            .binary_search_by(|(l, _)| l.total_cmp(&level))
            .ok()
            .map(|i| self.lines[i].1.as_slice())
    }

    /// Levels with segments, in increasing order.
    pub fn levels(&self) -> impl Iterator<Item = f64> + '_ {
        self.lines.iter().map(|(l, _)| *l)
    }

    /// `(level, points)` in increasing level order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[PointF])> {
        self.lines.iter().map(|(l, p)| (*l, p.as_slice()))
    }

    /// Segments of `level` as point pairs.
    pub fn segments(&self, level: f64) -> impl Iterator<Item = (PointF, PointF)> + '_ {
        self.get(level)
            .unwrap_or(&[])
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }

    /// Total number of points over all levels.
    pub fn num_points(&self) -> usize {
        self.lines.iter().map(|(_, p)| p.len()).sum()
    }

    /// Point list of `level`, created on first use.
    pub fn entry(&mut self, level: f64) -> &mut Vec<PointF> {
        let index = match self
            .lines
            .binary_search_by(|(l, _)| l.total_cmp(&level))
        {
            Ok(i) => i,
            Err(i) => {
                self.lines.insert(i, (level, Vec::new()));
                i
            }
        };
        &mut self.lines[index].1
    }
}

/// Edge patterns of a triangle against a level plane, indexed by the
/// comparison (-1, 0, 1) of each vertex with the level, shifted by one.
///
/// 0: no intersection, 1-3: a triangle edge lies on the plane,
/// 4-6: a vertex on the plane and the opposite edge crossing it,
/// 7-9: two edges crossing, 10: all vertices on the plane.
const EDGE_TABLE: [[[u8; 3]; 3]; 3] = [
    [[0, 0, 8], [0, 2, 5], [7, 6, 9]],
    [[0, 3, 4], [1, 10, 1], [4, 3, 0]],
    [[9, 6, 7], [5, 2, 0], [8, 0, 0]],
];

/// Horizontal plane at the height of a contour level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourPlane {
    z: f64,
}

impl ContourPlane {
    pub fn new(z: f64) -> Self {
        Self { z }
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    fn compare(&self, z: f64) -> usize {
        if z > self.z {
            2
        } else if z < self.z {
            0
        } else {
            1
        }
    }

    fn intersection(&self, p1: &Point3D, p2: &Point3D) -> PointF {
        let h1 = p1.z - self.z;
        let h2 = p2.z - self.z;

        let x = (h2 * p1.x - h1 * p2.x) / (h2 - h1);
        let y = (h2 * p1.y - h1 * p2.y) / (h2 - h1);

        PointF::new(x, y)
    }

    /// Segment where the triangle crosses the plane, if any.
    pub fn intersect(&self, vertex: &[Point3D; 3], ignore_on_plane: bool) -> Option<[PointF; 2]> {
        let [v0, v1, v2] = vertex;
        let edge_type = EDGE_TABLE[self.compare(v0.z)][self.compare(v1.z)][self.compare(v2.z)];

        let line = match edge_type {
            1 => [v0.to_point(), v1.to_point()],
            2 => [v1.to_point(), v2.to_point()],
            3 => [v2.to_point(), v0.to_point()],
            4 => [v0.to_point(), self.intersection(v1, v2)],
            5 => [v1.to_point(), self.intersection(v2, v0)],
            6 => [v2.to_point(), self.intersection(v0, v1)],
            7 => [self.intersection(v0, v1), self.intersection(v1, v2)],
            8 => [self.intersection(v1, v2), self.intersection(v2, v0)],
            9 => [self.intersection(v2, v0), self.intersection(v0, v1)],
            // CONREC has no answer for a triangle lying in the plane,
            // one of its edges is taken
            10 if !ignore_on_plane => [v2.to_point(), v0.to_point()],
            _ => return None,
        };

        Some(line)
    }
}

// Corners of a raster cell, walked clockwise after the center
const CENTER: usize = 0;
const TOP_LEFT: usize = 1;
const TOP_RIGHT: usize = 2;
const BOTTOM_RIGHT: usize = 3;
const BOTTOM_LEFT: usize = 4;

/// Calculate contour lines of `data` inside `rect`.
///
/// `raster` is the number of sample points in each direction; cells are
/// spanned between neighbouring points, so `raster.width - 1` cells are
/// scanned per row. `levels` must be sorted in increasing order.
///
/// Returns an empty map for empty levels, an invalid rectangle or an
/// empty raster.
pub fn contour_lines<D: RasterData + ?Sized>(
    data: &D,
    rect: &RectF,
    raster: Size,
    levels: &[f64],
    flags: ConrecFlags,
) -> ContourLines {
    let mut contour_lines = ContourLines::new();

    let (first_level, last_level) = match (levels.first(), levels.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return contour_lines,
    };

    if !rect.is_valid() || raster.is_empty() {
        tracing::trace!(
            rect_width = rect.width,
            rect_height = rect.height,
            raster_width = raster.width,
            raster_height = raster.height,
            "contour_lines: nothing to do"
        );
        return contour_lines;
    }

    let start = Instant::now();

    let dx = rect.width / raster.width as f64;
    let dy = rect.height / raster.height as f64;

    let ignore_on_plane = flags.ignore_all_vertices_on_level;

    let range = data.interval(Axis::Z);
    let ignore_out_of_range = range.is_valid() && flags.ignore_out_of_range;

    let _scope = RasterScope::new(data, rect, raster);

    let sample = |x: f64, y: f64| Point3D::new(x, y, data.value(x, y));

    for y in 0..raster.height - 1 {
        let mut xy = [Point3D::default(); 5];

        for x in 0..raster.width - 1 {
            let pos = PointF::new(rect.x + x as f64 * dx, rect.y + y as f64 * dy);

            if x == 0 {
                xy[TOP_RIGHT] = sample(pos.x, pos.y);
                xy[BOTTOM_RIGHT] = sample(pos.x, pos.y + dy);
            }

            xy[TOP_LEFT] = xy[TOP_RIGHT];
            xy[BOTTOM_LEFT] = xy[BOTTOM_RIGHT];

            xy[TOP_RIGHT] = sample(pos.x + dx, pos.y);
            xy[BOTTOM_RIGHT] = sample(pos.x + dx, pos.y + dy);

            let mut z_min = xy[TOP_LEFT].z;
            let mut z_max = z_min;
            let mut z_sum = z_min;

            for corner in &xy[TOP_RIGHT..=BOTTOM_LEFT] {
                let z = corner.z;
                z_sum += z;
                if z < z_min {
                    z_min = z;
                }
                if z > z_max {
                    z_max = z;
                }
            }

            if z_sum.is_nan() {
                continue;
            }

            if ignore_out_of_range && (!range.contains(z_min) || !range.contains(z_max)) {
                continue;
            }

            if z_max < first_level || z_min > last_level {
                continue;
            }

            xy[CENTER] = Point3D::new(pos.x + 0.5 * dx, pos.y + 0.5 * dy, 0.25 * z_sum);

            for &level in levels {
                if level < z_min || level > z_max {
                    continue;
                }

                let plane = ContourPlane::new(level);

                for m in TOP_LEFT..=BOTTOM_LEFT {
                    let next = if m != BOTTOM_LEFT { m + 1 } else { TOP_LEFT };
                    let vertex = [xy[m], xy[CENTER], xy[next]];

                    if let Some([p1, p2]) = plane.intersect(&vertex, ignore_on_plane) {
                        let lines = contour_lines.entry(level);
                        lines.push(p1);
                        lines.push(p2);
                    }
                }
            }
        }
    }

    tracing::debug!(
        raster_width = raster.width,
        raster_height = raster.height,
        num_levels = levels.len(),
        levels_with_lines = contour_lines.len(),
        total_points = contour_lines.num_points(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Generated contour lines"
    );

    contour_lines
}
