//! Sources of scalar values over a 2D area.
//!
//! [`RasterData`] is the contract between a data source and the renderer:
//! a value for every `(x, y)` in scale coordinates, the bounding intervals
//! of the three axes and hooks bracketing a rendering pass.
//! [`MatrixRasterData`] resamples a row-major matrix of values.

use crate::contour::{self, ConrecFlags, ContourLines};
use raster_common::{Axis, Interval, RectF, Size};
use serde::{Deserialize, Serialize};

/// Promises a data source can make to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterAttribute {
    /// `value()` never returns NaN inside the X/Y intervals, so the
    /// renderer can skip gap checks.
    WithoutGaps,
}

/// Set of [`RasterAttribute`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterAttributes {
    without_gaps: bool,
}

impl RasterAttributes {
    pub fn set(&mut self, attribute: RasterAttribute, on: bool) {
        match attribute {
            RasterAttribute::WithoutGaps => self.without_gaps = on,
        }
    }

    pub fn test(&self, attribute: RasterAttribute) -> bool {
        match attribute {
            RasterAttribute::WithoutGaps => self.without_gaps,
        }
    }
}

/// A scalar field that can be sampled anywhere in its X/Y intervals.
///
/// Implementations are shared read-only between render workers, so
/// `init_raster` and `discard_raster` take `&self`; sources staging data
/// lazily need interior mutability.
pub trait RasterData: Send + Sync {
    /// Bounding interval of an axis. The Z interval is the value range used
    /// for color mapping.
    fn interval(&self, axis: Axis) -> Interval;

    /// Value at `(x, y)`. NaN marks a gap.
    fn value(&self, x: f64, y: f64) -> f64;

    fn attributes(&self) -> RasterAttributes {
        RasterAttributes::default()
    }

    fn test_attribute(&self, attribute: RasterAttribute) -> bool {
        self.attributes().test(attribute)
    }

    /// Geometry of one data pixel, or an empty rectangle when the data can
    /// be rendered at any resolution.
    fn pixel_hint(&self, _area: &RectF) -> RectF {
        RectF::default()
    }

    /// Called once before a rendering or contouring pass over `area`.
    fn init_raster(&self, _area: &RectF, _raster: Size) {}

    /// Called once after the pass announced by `init_raster`.
    fn discard_raster(&self) {}

    /// Contour lines of the field at `levels`, sampled on a `raster` grid over `rect`.
    fn contour_lines(
        &self,
        rect: &RectF,
        raster: Size,
        levels: &[f64],
        flags: ConrecFlags,
    ) -> ContourLines {
        contour::contour_lines(self, rect, raster, levels, flags)
    }
}

/// Brackets a pass with `init_raster`/`discard_raster`.
///
/// `discard_raster` also runs when the pass unwinds.
pub(crate) struct RasterScope<'a, D: RasterData + ?Sized> {
    data: &'a D,
}

impl<'a, D: RasterData + ?Sized> RasterScope<'a, D> {
    pub(crate) fn new(data: &'a D, area: &RectF, raster: Size) -> Self {
        data.init_raster(area, raster);
        Self { data }
    }
}

impl<D: RasterData + ?Sized> Drop for RasterScope<'_, D> {
    fn drop(&mut self) {
        self.data.discard_raster();
    }
}

/// How [`MatrixRasterData`] computes values between matrix cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleMode {
    /// Value of the cell containing the position.
    #[default]
    NearestNeighbour,
    /// Blend of the 4 surrounding cell centers.
    BilinearInterpolation,
    /// Hermite interpolation over the surrounding 4x4 cells.
    BicubicInterpolation,
}

/// Raster data backed by a row-major matrix of values.
///
/// Each value sits at the center of one of the equidistant cells the X/Y
/// intervals are divided into.
#[derive(Debug, Clone, Default)]
pub struct MatrixRasterData {
    intervals: [Interval; 3],
    resample_mode: ResampleMode,
    attributes: RasterAttributes,
    values: Vec<f64>,
    num_columns: usize,
    num_rows: usize,
    dx: f64,
    dy: f64,
}

impl MatrixRasterData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matrix with the given intervals for X, Y and Z.
    pub fn from_matrix(
        values: Vec<f64>,
        num_columns: usize,
        x_interval: Interval,
        y_interval: Interval,
        z_interval: Interval,
    ) -> Self {
        let mut data = Self {
            intervals: [x_interval, y_interval, z_interval],
            values,
            num_columns,
            ..Self::default()
        };
        data.update();
        data
    }

    pub fn set_resample_mode(&mut self, mode: ResampleMode) {
        self.resample_mode = mode;
    }

    pub fn resample_mode(&self) -> ResampleMode {
        self.resample_mode
    }

    pub fn set_attribute(&mut self, attribute: RasterAttribute, on: bool) {
        self.attributes.set(attribute, on);
    }

    /// Assign the bounding interval of an axis.
    ///
    /// The X/Y intervals position the matrix cells. The Z interval is the
    /// range for color mapping and does not need to bound the values.
    pub fn set_interval(&mut self, axis: Axis, interval: Interval) {
        self.intervals[axis.index()] = interval;
        self.update();
    }

    /// Replace the matrix. The number of rows is `values.len() / num_columns`.
    pub fn set_value_matrix(&mut self, values: Vec<f64>, num_columns: usize) {
        self.values = values;
        self.num_columns = num_columns;
        self.update();
    }

    pub fn value_matrix(&self) -> &[f64] {
        &self.values
    }

    /// Change a single cell. Indexes outside the matrix are ignored.
    pub fn set_value(&mut self, row: usize, col: usize, value: f64) {
        if row < self.num_rows && col < self.num_columns {
            self.values[row * self.num_columns + col] = value;
        }
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Recompute the number of rows and the cell size.
    fn update(&mut self) {
        self.num_rows = 0;
        self.dx = 0.0;
        self.dy = 0.0;

        if self.num_columns == 0 {
            return;
        }

        self.num_rows = self.values.len() / self.num_columns;

        let x_interval = self.intervals[Axis::X.index()];
        if x_interval.is_valid() {
            self.dx = x_interval.width() / self.num_columns as f64;
        }

        let y_interval = self.intervals[Axis::Y.index()];
        if y_interval.is_valid() && self.num_rows > 0 {
            self.dy = y_interval.width() / self.num_rows as f64;
        }
    }

    #[inline(always)]
    fn cell(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.num_columns + col]
    }

    fn nearest_value(&self, col_f: f64, row_f: f64) -> f64 {
        let col = clamp_index(col_f as i64, self.num_columns);
        let row = clamp_index(row_f as i64, self.num_rows);
        self.cell(row, col)
    }

    fn bilinear_value(&self, x: f64, y: f64, x_min: f64, y_min: f64) -> f64 {
        let (col1, col2) = bilinear_pair(round_half_away((x - x_min) / self.dx), self.num_columns);
        let (row1, row2) = bilinear_pair(round_half_away((y - y_min) / self.dy), self.num_rows);

        let v11 = self.cell(row1, col1);
        let v21 = self.cell(row1, col2);
        let v12 = self.cell(row2, col1);
        let v22 = self.cell(row2, col2);

        let x2 = x_min + (col2 as f64 + 0.5) * self.dx;
        let y2 = y_min + (row2 as f64 + 0.5) * self.dy;

        let rx = (x2 - x) / self.dx;
        let ry = (y2 - y) / self.dy;

        let vr1 = rx * v11 + (1.0 - rx) * v21;
        let vr2 = rx * v12 + (1.0 - rx) * v22;

        ry * vr1 + (1.0 - ry) * vr2
    }

    fn bicubic_value(&self, col_f: f64, row_f: f64) -> f64 {
        let col = round_half_away(col_f);
        let row = round_half_away(row_f);

        let cols = bicubic_indices(col, self.num_columns);
        let rows = bicubic_indices(row, self.num_rows);

        let mut v = [0.0; 4];
        for (i, &r) in rows.iter().enumerate() {
            v[i] = hermite_interpolate(
                self.cell(r, cols[0]),
                self.cell(r, cols[1]),
                self.cell(r, cols[2]),
                self.cell(r, cols[3]),
                col_f - col as f64 + 0.5,
            );
        }

        hermite_interpolate(v[0], v[1], v[2], v[3], row_f - row as f64 + 0.5)
    }
}

impl RasterData for MatrixRasterData {
    fn interval(&self, axis: Axis) -> Interval {
        self.intervals[axis.index()]
    }

    fn attributes(&self) -> RasterAttributes {
        self.attributes
    }

    /// In nearest neighbour mode the cell around the first value, otherwise empty.
    fn pixel_hint(&self, _area: &RectF) -> RectF {
        if self.resample_mode != ResampleMode::NearestNeighbour {
            return RectF::default();
        }

        let x_interval = self.interval(Axis::X);
        let y_interval = self.interval(Axis::Y);
        if x_interval.is_valid() && y_interval.is_valid() {
            RectF::new(x_interval.min_value(), y_interval.min_value(), self.dx, self.dy)
        } else {
            RectF::default()
        }
    }

    fn value(&self, x: f64, y: f64) -> f64 {
        let x_interval = self.interval(Axis::X);
        let y_interval = self.interval(Axis::Y);

        if !(x_interval.contains(x) && y_interval.contains(y)) {
            return f64::NAN;
        }

        if self.num_rows == 0 || self.num_columns == 0 {
            return f64::NAN;
        }

        let x_min = x_interval.min_value();
        let y_min = y_interval.min_value();

        match self.resample_mode {
            ResampleMode::NearestNeighbour => {
                self.nearest_value((x - x_min) / self.dx, (y - y_min) / self.dy)
            }
            ResampleMode::BilinearInterpolation => self.bilinear_value(x, y, x_min, y_min),
            ResampleMode::BicubicInterpolation => {
                self.bicubic_value((x - x_min) / self.dx, (y - y_min) / self.dy)
            }
        }
    }
}

/// Round half away from zero. Non-finite input saturates.
#[inline]
fn round_half_away(v: f64) -> i64 {
    if v >= 0.0 {
        (v + 0.5) as i64
    } else {
        (v - 0.5) as i64
    }
}

#[inline]
fn clamp_index(index: i64, len: usize) -> usize {
    index.clamp(0, len as i64 - 1) as usize
}

/// Neighbour pair for bilinear interpolation around the rounded position `rounded`.
///
/// On the matrix borders both indexes collapse to the one cell inside.
fn bilinear_pair(rounded: i64, len: usize) -> (usize, usize) {
    let mut i1 = rounded - 1;
    let mut i2 = i1 + 1;

    if i1 < 0 {
        i1 = i2;
    } else if i2 >= len as i64 {
        i2 = i1;
    }

    (clamp_index(i1, len), clamp_index(i2, len))
}

/// Indexes `rounded - 2 ..= rounded + 1`, repeating the border cells.
fn bicubic_indices(rounded: i64, len: usize) -> [usize; 4] {
    let n = len as i64;
    let mut i0 = rounded - 2;
    let mut i1 = rounded - 1;
    let mut i2 = rounded;
    let mut i3 = rounded + 1;

    if i1 < 0 {
        i1 = i2;
    }
    if i0 < 0 {
        i0 = i1;
    }
    if i2 >= n {
        i2 = i1;
    }
    if i3 >= n {
        i3 = i2;
    }

    [
        clamp_index(i0, len),
        clamp_index(i1, len),
        clamp_index(i2, len),
        clamp_index(i3, len),
    ]
}

/// Cubic Hermite (Catmull-Rom) interpolation between `b` and `c` at `t` in `[0, 1]`.
#[inline]
pub fn hermite_interpolate(a: f64, b: f64, c: f64, d: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    let ca = -a / 2.0 + (3.0 * b) / 2.0 - (3.0 * c) / 2.0 + d / 2.0;
    let cb = a - (5.0 * b) / 2.0 + 2.0 * c - d / 2.0;
    let cc = -a / 2.0 + c / 2.0;
    let cd = b;

    ca * t3 + cb * t2 + cc * t + cd
}
