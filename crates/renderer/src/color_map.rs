//! Mapping scalar values to colors.
//!
//! A [`ColorMap`] turns a value inside an [`Interval`] into a [`Color`] or into
//! an index of a precomputed color table. [`LinearColorMap`] interpolates
//! between a sorted list of color stops positioned in `[0, 1]`.

use raster_common::{Color, Interval};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum distance between two color stops. A stop closer than this to an
/// existing one replaces it.
const STOP_EPSILON: f64 = 0.001;

/// Preferred output of a color map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    /// Every pixel is an ARGB32 value computed with [`ColorMap::rgb`].
    #[default]
    Rgb,
    /// Every pixel is an 8 bit index into [`ColorMap::color_table_256`].
    Indexed,
}

/// Lookup mode of a [`LinearColorMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Use the color of the next lower stop.
    Fixed,
    /// Interpolate between the adjacent stops.
    #[default]
    Scaled,
}

/// Maps values of an interval to colors.
///
/// Implementations are shared read-only between render workers.
pub trait ColorMap: Send + Sync + fmt::Debug {
    fn format(&self) -> ColorFormat;

    /// Color for `value`, or transparent when the interval has no width.
    fn rgb(&self, interval: &Interval, value: f64) -> Color;

    /// Index in `[0, num_colors - 1]` for `value`.
    fn color_index(&self, num_colors: usize, interval: &Interval, value: f64) -> usize {
        quantize(num_colors, interval, value)
    }

    /// `num_colors` samples of [`ColorMap::rgb`] evenly spaced over `[0, 1]`.
    fn color_table(&self, num_colors: usize) -> Vec<Color> {
        let interval = Interval::new(0.0, 1.0);

        match num_colors {
            0 => Vec::new(),
            1 => vec![self.rgb(&interval, 0.0)],
            n => {
                let step = 1.0 / (n - 1) as f64;
                (0..n).map(|i| self.rgb(&interval, step * i as f64)).collect()
            }
        }
    }

    /// The table used with [`ColorMap::color_index`] for indexed images.
    ///
    /// Samples `[0, 256]` at every integer so that the entries match what
    /// `rgb` returns for the corresponding indices.
    fn color_table_256(&self) -> Vec<Color> {
        let interval = Interval::new(0.0, 256.0);
        (0..256).map(|i| self.rgb(&interval, i as f64)).collect()
    }
}

/// Generic quantizer shared by color maps: round to the nearest index.
pub fn quantize(num_colors: usize, interval: &Interval, value: f64) -> usize {
    let width = interval.width();
    if width <= 0.0 || num_colors == 0 {
        return 0;
    }

    if value <= interval.min_value() {
        return 0;
    }

    let max_index = num_colors - 1;
    if value >= interval.max_value() {
        return max_index;
    }

    let v = max_index as f64 * ((value - interval.min_value()) / width);
    // NaN lands here and saturates to 0
    ((v + 0.5) as usize).min(max_index)
}

#[derive(Debug, Clone, Copy)]
struct ColorStop {
    pos: f64,
    color: Color,
    // Components with the rounding offset already added
    r0: f64,
    g0: f64,
    b0: f64,
    a0: f64,
    r_step: f64,
    g_step: f64,
    b_step: f64,
    a_step: f64,
    pos_step: f64,
}

impl ColorStop {
    fn new(pos: f64, color: Color) -> Self {
        Self {
            pos,
            color,
            r0: color.r as f64 + 0.5,
            g0: color.g as f64 + 0.5,
            b0: color.b as f64 + 0.5,
            a0: color.a as f64 + 0.5,
            r_step: 0.0,
            g_step: 0.0,
            b_step: 0.0,
            a_step: 0.0,
            pos_step: 0.0,
        }
    }

    fn update_steps(&mut self, next: &ColorStop) {
        self.r_step = next.color.r as f64 - self.color.r as f64;
        self.g_step = next.color.g as f64 - self.color.g as f64;
        self.b_step = next.color.b as f64 - self.color.b as f64;
        self.a_step = next.color.a as f64 - self.color.a as f64;
        self.pos_step = next.pos - self.pos;
    }
}

/// Sorted list of color stops with precomputed deltas to the next stop.
#[derive(Debug, Clone, Default)]
pub struct ColorStops {
    stops: Vec<ColorStop>,
    do_alpha: bool,
}

impl ColorStops {
    pub fn new() -> Self {
        Self {
            stops: Vec::with_capacity(256),
            do_alpha: false,
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// True once a non-opaque stop has been inserted.
    pub fn has_alpha(&self) -> bool {
        self.do_alpha
    }

    /// Insert a stop, replacing an existing one closer than `0.001`.
    ///
    /// Both the lower and the upper neighbour are checked, so a stop at an
    /// existing position (0.0 included) replaces it instead of doubling it.
    ///
    /// Positions outside `[0, 1]` are ignored.
    pub fn insert(&mut self, pos: f64, color: Color) {
        if !(0.0..=1.0).contains(&pos) {
            return;
        }

        let upper = self.find_upper(pos);
        let index = if upper > 0 && (self.stops[upper - 1].pos - pos).abs() < STOP_EPSILON {
            self.stops[upper - 1] = ColorStop::new(pos, color);
            upper - 1
        } else if upper < self.stops.len() && (self.stops[upper].pos - pos).abs() < STOP_EPSILON {
            self.stops[upper] = ColorStop::new(pos, color);
            upper
        } else {
            self.stops.insert(upper, ColorStop::new(pos, color));
            upper
        };

        if color.a != 255 {
            self.do_alpha = true;
        }

        if index > 0 {
            let next = self.stops[index];
            self.stops[index - 1].update_steps(&next);
        }
        if index + 1 < self.stops.len() {
            let next = self.stops[index + 1];
            self.stops[index].update_steps(&next);
        }
    }

    /// Positions of all stops in increasing order.
    pub fn positions(&self) -> Vec<f64> {
        self.stops.iter().map(|s| s.pos).collect()
    }

    /// Index of the first stop with a position greater than `pos`.
    fn find_upper(&self, pos: f64) -> usize {
        self.stops.partition_point(|s| s.pos <= pos)
    }

    /// Color at the normalized position `pos`.
    pub fn rgb(&self, mode: ColorMode, pos: f64) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::transparent(),
        };

        if pos <= 0.0 {
            return first.color;
        }
        if pos >= 1.0 {
            return last.color;
        }

        let index = self.find_upper(pos);
        if index == 0 {
            // NaN, or no stop at 0.0
            return first.color;
        }

        let s1 = &self.stops[index - 1];
        if mode == ColorMode::Fixed || s1.pos_step == 0.0 {
            return s1.color;
        }

        let ratio = (pos - s1.pos) / s1.pos_step;
        let r = (s1.r0 + ratio * s1.r_step) as u8;
        let g = (s1.g0 + ratio * s1.g_step) as u8;
        let b = (s1.b0 + ratio * s1.b_step) as u8;

        if !self.do_alpha {
            return Color::rgb(r, g, b);
        }

        let a = if s1.a_step != 0.0 {
            (s1.a0 + ratio * s1.a_step) as u8
        } else {
            s1.color.a
        };
        Color::new(r, g, b, a)
    }
}

/// Color map interpolating between color stops.
///
/// Always holds a stop at 0.0 and one at 1.0, set by
/// [`LinearColorMap::set_color_interval`].
#[derive(Debug, Clone)]
pub struct LinearColorMap {
    format: ColorFormat,
    mode: ColorMode,
    stops: ColorStops,
}

impl Default for LinearColorMap {
    /// Blue to yellow, scaled, RGB.
    fn default() -> Self {
        Self::new(Color::BLUE, Color::YELLOW)
    }
}

impl LinearColorMap {
    pub fn new(color1: Color, color2: Color) -> Self {
        Self::with_format(color1, color2, ColorFormat::Rgb)
    }

    pub fn with_format(color1: Color, color2: Color, format: ColorFormat) -> Self {
        let mut map = Self {
            format,
            mode: ColorMode::Scaled,
            stops: ColorStops::new(),
        };
        map.set_color_interval(color1, color2);
        map
    }

    pub fn set_format(&mut self, format: ColorFormat) {
        self.format = format;
    }

    pub fn set_mode(&mut self, mode: ColorMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Reset the stops to exactly `color1` at 0.0 and `color2` at 1.0.
    pub fn set_color_interval(&mut self, color1: Color, color2: Color) {
        self.stops = ColorStops::new();
        self.stops.insert(0.0, color1);
        self.stops.insert(1.0, color2);
    }

    /// Add a stop at `value` in `[0, 1]`. Other positions are ignored.
    pub fn add_color_stop(&mut self, value: f64, color: Color) {
        if (0.0..=1.0).contains(&value) {
            self.stops.insert(value, color);
        }
    }

    /// Positions of the color stops in increasing order.
    pub fn color_stops(&self) -> Vec<f64> {
        self.stops.positions()
    }

    pub fn color1(&self) -> Color {
        self.stops.rgb(self.mode, 0.0)
    }

    pub fn color2(&self) -> Color {
        self.stops.rgb(self.mode, 1.0)
    }
}

impl ColorMap for LinearColorMap {
    fn format(&self) -> ColorFormat {
        self.format
    }

    fn rgb(&self, interval: &Interval, value: f64) -> Color {
        let width = interval.width();
        if width <= 0.0 {
            return Color::transparent();
        }

        let ratio = (value - interval.min_value()) / width;
        self.stops.rgb(self.mode, ratio)
    }

    /// Truncates in [`ColorMode::Fixed`] and rounds in [`ColorMode::Scaled`],
    /// so that indexes agree with the colors `rgb` would return.
    fn color_index(&self, num_colors: usize, interval: &Interval, value: f64) -> usize {
        let width = interval.width();
        if width <= 0.0 || num_colors == 0 {
            return 0;
        }

        if value <= interval.min_value() {
            return 0;
        }

        let max_index = num_colors - 1;
        if value >= interval.max_value() {
            return max_index;
        }

        let v = max_index as f64 * (value - interval.min_value()) / width;
        let index = match self.mode {
            ColorMode::Fixed => v as usize,
            ColorMode::Scaled => (v + 0.5) as usize,
        };
        index.min(max_index)
    }
}
