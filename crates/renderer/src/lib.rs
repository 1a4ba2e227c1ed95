//! Rendering of 2D scalar fields.
//!
//! Turns a sampled field into:
//! - a color image (ARGB32 or indexed), composed in parallel bands
//! - contour lines at given levels (CONREC)
//!
//! The pieces are [`ScaleMap`] for pixel/scale conversion, [`ColorMap`]
//! for value/color conversion, [`RasterData`] as the source of values and
//! [`Spectrogram`] tying them together.

pub mod color_map;
pub mod config;
pub mod contour;
pub mod image;
pub mod raster_data;
pub mod scale_map;
pub mod spectrogram;

pub use color_map::{ColorFormat, ColorMap, ColorMode, ColorStops, LinearColorMap};
pub use config::{ColorMapConfig, ColorStopConfig, SpectrogramConfig};
pub use contour::{contour_lines, ConrecFlags, ContourLines, ContourPlane};
pub use image::{ImagePixels, RasterImage};
pub use raster_data::{
    MatrixRasterData, RasterAttribute, RasterAttributes, RasterData, ResampleMode,
};
pub use scale_map::ScaleMap;
pub use spectrogram::{
    CachePolicy, DisplayMode, DisplayModes, Frame, FrameContour, FrameImage, Spectrogram,
};
