//! Pixel buffers produced by the renderer.

use crate::color_map::ColorFormat;
use raster_common::{Color, Size};

/// Pixels of a [`RasterImage`], row-major, one entry per pixel.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixels {
    /// `0xAARRGGBB` per pixel.
    Argb32(Vec<u32>),
    /// Index into `color_table` per pixel.
    Indexed8 {
        indices: Vec<u8>,
        color_table: Vec<Color>,
    },
}

/// A rendered image. The default image is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    size: Size,
    pixels: ImagePixels,
}

impl Default for RasterImage {
    fn default() -> Self {
        Self {
            size: Size::default(),
            pixels: ImagePixels::Argb32(Vec::new()),
        }
    }
}

impl RasterImage {
    /// Transparent ARGB32 image.
    pub fn new_argb(size: Size) -> Self {
        Self {
            size,
            pixels: ImagePixels::Argb32(vec![0; size.area()]),
        }
    }

    /// Indexed image with all pixels at index 0.
    pub fn new_indexed(size: Size, color_table: Vec<Color>) -> Self {
        Self {
            size,
            pixels: ImagePixels::Indexed8 {
                indices: vec![0; size.area()],
                color_table,
            },
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn format(&self) -> ColorFormat {
        match self.pixels {
            ImagePixels::Argb32(_) => ColorFormat::Rgb,
            ImagePixels::Indexed8 { .. } => ColorFormat::Indexed,
        }
    }

    pub fn pixels(&self) -> &ImagePixels {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut ImagePixels {
        &mut self.pixels
    }

    /// Color of the pixel at `(x, y)`, resolving indexes through the color table.
    ///
    /// Indexes without a table entry read as transparent.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }

        let offset = y * self.size.width + x;
        match &self.pixels {
            ImagePixels::Argb32(argb) => argb.get(offset).map(|&p| Color::from_argb(p)),
            ImagePixels::Indexed8 {
                indices,
                color_table,
            } => indices.get(offset).map(|&i| {
                color_table
                    .get(i as usize)
                    .copied()
                    .unwrap_or_else(Color::transparent)
            }),
        }
    }

    /// Expand to RGBA bytes (4 per pixel).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.size.area() * 4);
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let c = self.pixel(x, y).unwrap_or_else(Color::transparent);
                rgba.extend_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        }
        rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let image = RasterImage::default();
        assert!(image.is_empty());
        assert_eq!(image.pixel(0, 0), None);
        assert!(image.to_rgba().is_empty());
    }

    #[test]
    fn test_indexed_pixel_lookup() {
        let mut image = RasterImage::new_indexed(Size::new(2, 1), vec![Color::RED, Color::GREEN]);
        if let ImagePixels::Indexed8 { indices, .. } = image.pixels_mut() {
            indices[1] = 1;
        }
        assert_eq!(image.pixel(0, 0), Some(Color::RED));
        assert_eq!(image.pixel(1, 0), Some(Color::GREEN));
        assert_eq!(image.format(), ColorFormat::Indexed);
        assert_eq!(image.to_rgba(), vec![255, 0, 0, 255, 0, 255, 0, 255]);
    }
}
