//! Common types shared by the scalar raster rendering crates.

pub mod color;
pub mod error;
pub mod geometry;
pub mod interval;

pub use color::Color;
pub use error::{RasterError, RasterResult};
pub use geometry::{Axis, Point3D, PointF, RectF, Size};
pub use interval::{BorderFlags, Interval};
