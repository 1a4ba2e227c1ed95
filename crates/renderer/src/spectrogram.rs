//! Spectrogram: renders raster data as a color image and/or contour lines.
//!
//! The image is composed in horizontal bands rendered in parallel with
//! rayon. Every band maps its pixels back to scale coordinates, samples the
//! data and maps the value to a color. Bands only read shared state, so the
//! result does not depend on the number of threads.

use crate::color_map::{ColorFormat, ColorMap, LinearColorMap};
use crate::contour::{ConrecFlags, ContourLines};
use crate::image::{ImagePixels, RasterImage};
use crate::raster_data::{RasterAttribute, RasterData, RasterScope};
use crate::scale_map::ScaleMap;
use raster_common::{Axis, Color, Interval, PointF, RectF, Size};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Extra pixels around the canvas when calculating contour lines.
const CONTOUR_MARGIN: f64 = 2.0;

/// Representation of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Color image.
    Image,
    /// Contour lines at the contour levels.
    Contour,
}

/// Set of enabled [`DisplayMode`]s. Only the image is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayModes {
    pub image: bool,
    pub contour: bool,
}

impl Default for DisplayModes {
    fn default() -> Self {
        Self {
            image: true,
            contour: false,
        }
    }
}

impl DisplayModes {
    pub fn set(&mut self, mode: DisplayMode, on: bool) {
        match mode {
            DisplayMode::Image => self.image = on,
            DisplayMode::Contour => self.contour = on,
        }
    }

    pub fn test(&self, mode: DisplayMode) -> bool {
        match mode {
            DisplayMode::Image => self.image,
            DisplayMode::Contour => self.contour,
        }
    }
}

/// Whether [`Spectrogram::draw`] keeps the last rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Render the image on every draw.
    #[default]
    NoCache,
    /// Reuse the last image while the maps, the area and the size are unchanged.
    PaintCache,
}

/// The image part of a [`Frame`], placed in paint coordinates.
#[derive(Debug, Clone)]
pub struct FrameImage {
    pub rect: RectF,
    pub image: Arc<RasterImage>,
}

/// Contour segments of one level, in paint coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContour {
    pub level: f64,
    pub color: Color,
    pub segments: Vec<(PointF, PointF)>,
}

/// Everything a painter needs to display a spectrogram.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub image: Option<FrameImage>,
    pub contours: Vec<FrameContour>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.contours.is_empty()
    }
}

#[derive(Debug)]
struct CachedImage {
    x_map: ScaleMap,
    y_map: ScaleMap,
    area: RectF,
    size: Size,
    image: Arc<RasterImage>,
}

/// Raster data with a color map, contour levels and render settings.
pub struct Spectrogram {
    data: Option<Box<dyn RasterData>>,
    color_map: Box<dyn ColorMap>,
    color_table_size: usize,
    color_table: Vec<Color>,
    display_modes: DisplayModes,
    contour_levels: Vec<f64>,
    default_contour_color: Option<Color>,
    conrec_flags: ConrecFlags,
    render_thread_count: usize,
    cache_policy: CachePolicy,
    cache: Mutex<Option<CachedImage>>,
}

impl Default for Spectrogram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Spectrogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spectrogram")
            .field("has_data", &self.data.is_some())
            .field("color_map", &self.color_map)
            .field("color_table_size", &self.color_table_size)
            .field("display_modes", &self.display_modes)
            .field("contour_levels", &self.contour_levels)
            .field("conrec_flags", &self.conrec_flags)
            .field("render_thread_count", &self.render_thread_count)
            .field("cache_policy", &self.cache_policy)
            .finish()
    }
}

impl Spectrogram {
    /// No data, a blue to yellow color map, image mode only.
    pub fn new() -> Self {
        let mut spectrogram = Self {
            data: None,
            color_map: Box::new(LinearColorMap::default()),
            color_table_size: 0,
            color_table: Vec::new(),
            display_modes: DisplayModes::default(),
            contour_levels: Vec::new(),
            default_contour_color: None,
            conrec_flags: ConrecFlags::IGNORE_ALL_VERTICES_ON_LEVEL,
            render_thread_count: 0,
            cache_policy: CachePolicy::NoCache,
            cache: Mutex::new(None),
        };
        spectrogram.update_color_table();
        spectrogram
    }

    // === Data and colors ===

    pub fn set_data(&mut self, data: Box<dyn RasterData>) {
        self.data = Some(data);
        self.invalidate_cache();
    }

    pub fn data(&self) -> Option<&dyn RasterData> {
        self.data.as_deref()
    }

    pub fn set_color_map(&mut self, color_map: Box<dyn ColorMap>) {
        self.color_map = color_map;
        self.update_color_table();
        self.invalidate_cache();
    }

    pub fn color_map(&self) -> &dyn ColorMap {
        self.color_map.as_ref()
    }

    /// Limit the number of colors of RGB images to a precomputed table.
    ///
    /// 0 disables the table. Indexed color maps always use 256 colors.
    pub fn set_color_table_size(&mut self, num_colors: usize) {
        if num_colors != self.color_table_size {
            self.color_table_size = num_colors;
            self.update_color_table();
            self.invalidate_cache();
        }
    }

    pub fn color_table_size(&self) -> usize {
        self.color_table_size
    }

    /// The cached color table; empty when RGB images map every pixel directly.
    pub fn color_table(&self) -> &[Color] {
        &self.color_table
    }

    fn update_color_table(&mut self) {
        self.color_table = match self.color_map.format() {
            ColorFormat::Indexed => self.color_map.color_table_256(),
            ColorFormat::Rgb if self.color_table_size == 0 => Vec::new(),
            ColorFormat::Rgb => self.color_map.color_table(self.color_table_size),
        };
    }

    /// Bounding interval of an axis, invalid without data.
    pub fn interval(&self, axis: Axis) -> Interval {
        self.data
            .as_ref()
            .map(|d| d.interval(axis))
            .unwrap_or_default()
    }

    /// Rectangle spanned by the X/Y intervals, empty unless both are valid.
    pub fn bounding_rect(&self) -> RectF {
        let x = self.interval(Axis::X);
        let y = self.interval(Axis::Y);

        if x.is_valid() && y.is_valid() {
            RectF::new(x.min_value(), y.min_value(), x.width(), y.width())
        } else {
            RectF::default()
        }
    }

    pub fn pixel_hint(&self, area: &RectF) -> RectF {
        self.data
            .as_ref()
            .map(|d| d.pixel_hint(area))
            .unwrap_or_default()
    }

    // === Settings ===

    pub fn set_display_mode(&mut self, mode: DisplayMode, on: bool) {
        self.display_modes.set(mode, on);
    }

    pub fn test_display_mode(&self, mode: DisplayMode) -> bool {
        self.display_modes.test(mode)
    }

    pub fn set_display_modes(&mut self, modes: DisplayModes) {
        self.display_modes = modes;
    }

    /// Set the contour levels. They are stored sorted in increasing order.
    pub fn set_contour_levels(&mut self, mut levels: Vec<f64>) {
        levels.sort_by(f64::total_cmp);
        self.contour_levels = levels;
    }

    pub fn contour_levels(&self) -> &[f64] {
        &self.contour_levels
    }

    pub fn set_conrec_flags(&mut self, flags: ConrecFlags) {
        self.conrec_flags = flags;
    }

    pub fn conrec_flags(&self) -> ConrecFlags {
        self.conrec_flags
    }

    /// Color for all contour lines. `None` colors each level with the color map.
    pub fn set_default_contour_color(&mut self, color: Option<Color>) {
        self.default_contour_color = color;
    }

    pub fn default_contour_color(&self) -> Option<Color> {
        self.default_contour_color
    }

    /// Color of the contour line at `level`, `None` without data.
    pub fn contour_color(&self, level: f64) -> Option<Color> {
        if let Some(color) = self.default_contour_color {
            return Some(color);
        }

        let data = self.data.as_ref()?;
        Some(self.color_map.rgb(&data.interval(Axis::Z), level))
    }

    /// Number of render bands; 0 uses the size of the rayon thread pool.
    pub fn set_render_thread_count(&mut self, num_threads: usize) {
        self.render_thread_count = num_threads;
    }

    pub fn render_thread_count(&self) -> usize {
        self.render_thread_count
    }

    pub fn set_cache_policy(&mut self, policy: CachePolicy) {
        if policy != self.cache_policy {
            self.cache_policy = policy;
            self.invalidate_cache();
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Drop the cached image.
    pub fn invalidate_cache(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // === Image rendering ===

    /// Render an image of `image_size` pixels for `area` in scale coordinates.
    ///
    /// Pixel `(x, y)` shows the value at `(x_map.inv_transform(x), y_map.inv_transform(y))`.
    /// The image is Indexed8 with the 256 color table for indexed color maps
    /// and ARGB32 otherwise. Gaps are transparent (index 0).
    ///
    /// Returns an empty image without data, for an empty size or an invalid
    /// Z interval.
    pub fn render_image(
        &self,
        x_map: &ScaleMap,
        y_map: &ScaleMap,
        area: &RectF,
        image_size: Size,
    ) -> RasterImage {
        let data = match self.data.as_deref() {
            Some(data) if !image_size.is_empty() => data,
            _ => {
                tracing::trace!(
                    width = image_size.width,
                    height = image_size.height,
                    has_data = self.data.is_some(),
                    "render_image: nothing to render"
                );
                return RasterImage::default();
            }
        };

        let range = data.interval(Axis::Z);
        if !range.is_valid() {
            tracing::trace!(z_interval = %range, "render_image: invalid Z interval");
            return RasterImage::default();
        }

        let format = self.color_map.format();
        let mut image = match format {
            ColorFormat::Rgb => RasterImage::new_argb(image_size),
            ColorFormat::Indexed => RasterImage::new_indexed(image_size, self.color_table.clone()),
        };

        let num_bands = self.num_bands(image_size.height);
        let start = Instant::now();

        tracing::debug!(
            width = image_size.width,
            height = image_size.height,
            format = ?format,
            num_bands = num_bands,
            "render_image start"
        );

        {
            let _scope = RasterScope::new(data, area, image_size);
            let tile = TileRenderer::new(self, data, x_map, y_map, image_size.width);

            match image.pixels_mut() {
                ImagePixels::Argb32(argb) => {
                    render_bands(argb, image_size, num_bands, |first_row, band| {
                        tile.render_argb(first_row, band)
                    })
                }
                ImagePixels::Indexed8 { indices, .. } => {
                    render_bands(indices, image_size, num_bands, |first_row, band| {
                        tile.render_indexed(first_row, band)
                    })
                }
            }
        }

        tracing::debug!(
            width = image_size.width,
            height = image_size.height,
            elapsed_us = start.elapsed().as_micros() as u64,
            "render_image done"
        );

        image
    }

    /// Render the rows `rows` of `image` on the calling thread.
    ///
    /// Callers compositing an image themselves have to bracket their passes
    /// with `init_raster`/`discard_raster` of the data.
    pub fn render_tile(
        &self,
        x_map: &ScaleMap,
        y_map: &ScaleMap,
        rows: Range<usize>,
        image: &mut RasterImage,
    ) {
        let data = match self.data.as_deref() {
            Some(data) => data,
            None => return,
        };

        let width = image.width();
        let end = rows.end.min(image.height());
        let rows = rows.start.min(end)..end;
        let pixels = rows.start * width..rows.end * width;
        let tile = TileRenderer::new(self, data, x_map, y_map, width);

        match image.pixels_mut() {
            ImagePixels::Argb32(argb) => tile.render_argb(rows.start, &mut argb[pixels]),
            ImagePixels::Indexed8 { indices, .. } => {
                tile.render_indexed(rows.start, &mut indices[pixels])
            }
        }
    }

    fn num_bands(&self, height: usize) -> usize {
        let threads = if self.render_thread_count > 0 {
            self.render_thread_count
        } else {
            rayon::current_num_threads()
        };

        threads.clamp(1, height.max(1))
    }

    // === Contour lines ===

    /// Raster for contouring inside the paint rectangle `rect`.
    ///
    /// Half the size of `rect`, but not finer than the data resolution
    /// given by the pixel hint of `area`.
    pub fn contour_raster_size(&self, area: &RectF, rect: &RectF) -> Size {
        let size = rect.to_size();
        let raster = Size::new(size.width / 2, size.height / 2);

        let pixel_rect = self.pixel_hint(area);
        if pixel_rect.is_empty() {
            return raster;
        }

        let resolution = Size::new(
            (rect.width / pixel_rect.width).ceil().max(0.0) as usize,
            (rect.height / pixel_rect.height).ceil().max(0.0) as usize,
        );
        raster.bounded_to(resolution)
    }

    /// Contour lines at the contour levels for `rect` sampled on `raster`.
    pub fn render_contour_lines(&self, rect: &RectF, raster: Size) -> ContourLines {
        match &self.data {
            Some(data) => data.contour_lines(rect, raster, &self.contour_levels, self.conrec_flags),
            None => ContourLines::new(),
        }
    }

    /// Map contour lines to paint coordinates, one entry per colored level.
    pub fn contour_segments(
        &self,
        x_map: &ScaleMap,
        y_map: &ScaleMap,
        lines: &ContourLines,
    ) -> Vec<FrameContour> {
        if self.data.is_none() {
            return Vec::new();
        }

        let mut contours = Vec::new();
        for &level in &self.contour_levels {
            let color = match self.contour_color(level) {
                Some(color) => color,
                None => continue,
            };

            let segments: Vec<_> = lines
                .segments(level)
                .map(|(p1, p2)| {
                    (
                        ScaleMap::transform_point(x_map, y_map, p1),
                        ScaleMap::transform_point(x_map, y_map, p2),
                    )
                })
                .collect();

            if !segments.is_empty() {
                contours.push(FrameContour {
                    level,
                    color,
                    segments,
                });
            }
        }
        contours
    }

    // === Drawing ===

    /// Produce everything visible inside `canvas_rect` (paint coordinates).
    pub fn draw(&self, x_map: &ScaleMap, y_map: &ScaleMap, canvas_rect: &RectF) -> Frame {
        let mut frame = Frame::default();

        if self.display_modes.image {
            frame.image = self.draw_image(x_map, y_map, canvas_rect);
        }

        if self.display_modes.contour {
            frame.contours = self.draw_contour_lines(x_map, y_map, canvas_rect);
        }

        frame
    }

    fn draw_image(&self, x_map: &ScaleMap, y_map: &ScaleMap, canvas_rect: &RectF) -> Option<FrameImage> {
        let mut area = ScaleMap::inv_transform_rect(x_map, y_map, canvas_rect);

        let br = self.bounding_rect();
        if br.is_valid() {
            area = area.intersected(&br);
            if area.is_empty() {
                return None;
            }
        }

        let paint_rect = ScaleMap::transform_rect(x_map, y_map, &area);
        let size = paint_rect.to_size();
        if size.is_empty() {
            return None;
        }

        // Pixel 0 of the image is the left/top edge of the paint rectangle
        let image_x_map = ScaleMap::new(
            x_map.s1(),
            x_map.s2(),
            x_map.p1() - paint_rect.x,
            x_map.p2() - paint_rect.x,
        );
        let image_y_map = ScaleMap::new(
            y_map.s1(),
            y_map.s2(),
            y_map.p1() - paint_rect.y,
            y_map.p2() - paint_rect.y,
        );

        let image = self.cached_image(&image_x_map, &image_y_map, &area, size);
        if image.is_empty() {
            return None;
        }

        Some(FrameImage {
            rect: RectF::new(paint_rect.x, paint_rect.y, size.width as f64, size.height as f64),
            image,
        })
    }

    fn cached_image(
        &self,
        x_map: &ScaleMap,
        y_map: &ScaleMap,
        area: &RectF,
        size: Size,
    ) -> Arc<RasterImage> {
        if self.cache_policy == CachePolicy::NoCache {
            return Arc::new(self.render_image(x_map, y_map, area, size));
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            if cached.x_map == *x_map
                && cached.y_map == *y_map
                && cached.area == *area
                && cached.size == size
            {
                return Arc::clone(&cached.image);
            }
        }

        let image = Arc::new(self.render_image(x_map, y_map, area, size));
        *cache = Some(CachedImage {
            x_map: *x_map,
            y_map: *y_map,
            area: *area,
            size,
            image: Arc::clone(&image),
        });
        image
    }

    fn draw_contour_lines(
        &self,
        x_map: &ScaleMap,
        y_map: &ScaleMap,
        canvas_rect: &RectF,
    ) -> Vec<FrameContour> {
        let mut raster_rect = canvas_rect.adjusted(CONTOUR_MARGIN);
        let mut area = ScaleMap::inv_transform_rect(x_map, y_map, &raster_rect);

        let br = self.bounding_rect();
        if br.is_valid() {
            area = area.intersected(&br);
            if area.is_empty() {
                return Vec::new();
            }
            raster_rect = ScaleMap::transform_rect(x_map, y_map, &area);
        }

        let raster = self
            .contour_raster_size(&area, &raster_rect)
            .bounded_to(raster_rect.to_size());
        if raster.is_empty() {
            return Vec::new();
        }

        let lines = self.render_contour_lines(&area, raster);
        self.contour_segments(x_map, y_map, &lines)
    }
}

/// Per-band pixel loop, shared read-only between the band workers.
struct TileRenderer<'a> {
    data: &'a dyn RasterData,
    color_map: &'a dyn ColorMap,
    color_table: Vec<u32>,
    x_map: &'a ScaleMap,
    y_map: &'a ScaleMap,
    range: Interval,
    has_gaps: bool,
    width: usize,
}

impl<'a> TileRenderer<'a> {
    fn new(
        spectrogram: &'a Spectrogram,
        data: &'a dyn RasterData,
        x_map: &'a ScaleMap,
        y_map: &'a ScaleMap,
        width: usize,
    ) -> Self {
        let color_table = match spectrogram.color_map.format() {
            ColorFormat::Rgb => spectrogram.color_table.iter().map(|c| c.to_argb()).collect(),
            ColorFormat::Indexed => Vec::new(),
        };

        Self {
            data,
            color_map: spectrogram.color_map.as_ref(),
            color_table,
            x_map,
            y_map,
            range: data.interval(Axis::Z),
            has_gaps: !data.test_attribute(RasterAttribute::WithoutGaps),
            width,
        }
    }

    fn render_argb(&self, first_row: usize, band: &mut [u32]) {
        if self.range.width() <= 0.0 || self.width == 0 {
            return;
        }

        let num_colors = self.color_table.len();

        for (row, line) in band.chunks_exact_mut(self.width).enumerate() {
            let ty = self.y_map.inv_transform((first_row + row) as f64);

            for (x, pixel) in line.iter_mut().enumerate() {
                let tx = self.x_map.inv_transform(x as f64);
                let value = self.data.value(tx, ty);

                *pixel = if self.has_gaps && value.is_nan() {
                    0
                } else if num_colors == 0 {
                    self.color_map.rgb(&self.range, value).to_argb()
                } else {
                    let index = self.color_map.color_index(num_colors, &self.range, value);
                    self.color_table[index.min(num_colors - 1)]
                };
            }
        }
    }

    fn render_indexed(&self, first_row: usize, band: &mut [u8]) {
        if self.range.width() <= 0.0 || self.width == 0 {
            return;
        }

        for (row, line) in band.chunks_exact_mut(self.width).enumerate() {
            let ty = self.y_map.inv_transform((first_row + row) as f64);

            for (x, pixel) in line.iter_mut().enumerate() {
                let tx = self.x_map.inv_transform(x as f64);
                let value = self.data.value(tx, ty);

                *pixel = if self.has_gaps && value.is_nan() {
                    0
                } else {
                    self.color_map.color_index(256, &self.range, value).min(255) as u8
                };
            }
        }
    }
}

/// Split `pixels` into `num_bands` row bands and render them in parallel.
///
/// Every band has `height / num_bands` rows and the last one takes the
/// remainder. The last band is rendered on the calling thread; the scope
/// joins all bands and re-raises a panic of any of them afterwards.
fn render_bands<T, F>(pixels: &mut [T], size: Size, num_bands: usize, render_band: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    let num_bands = num_bands.max(1);
    let rows_per_band = size.height / num_bands;
    let render_band = &render_band;

    rayon::scope(|s| {
        let mut rest = pixels;

        for i in 0..num_bands - 1 {
            let (band, tail) = std::mem::take(&mut rest).split_at_mut(rows_per_band * size.width);
            rest = tail;

            let first_row = i * rows_per_band;
            s.spawn(move |_| render_band(first_row, band));
        }

        render_band((num_bands - 1) * rows_per_band, rest);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bands_covers_every_row_once() {
        let size = Size::new(3, 10);
        let mut pixels = vec![0u32; size.area()];

        render_bands(&mut pixels, size, 4, |first_row, band| {
            for (i, p) in band.iter_mut().enumerate() {
                *p += (first_row * size.width + i) as u32 + 1;
            }
        });

        let expected: Vec<u32> = (1..=30).collect();
        assert_eq!(pixels, expected);
    }

    #[test]
    fn test_num_bands_bounded_by_height() {
        let mut spectrogram = Spectrogram::new();
        spectrogram.set_render_thread_count(8);
        assert_eq!(spectrogram.num_bands(3), 3);
        assert_eq!(spectrogram.num_bands(100), 8);
        assert_eq!(spectrogram.num_bands(0), 1);

        spectrogram.set_render_thread_count(0);
        assert!(spectrogram.num_bands(1000) >= 1);
    }

    #[test]
    fn test_display_modes_default() {
        let modes = DisplayModes::default();
        assert!(modes.test(DisplayMode::Image));
        assert!(!modes.test(DisplayMode::Contour));
    }
}
