//! Configuration for spectrogram rendering.
//!
//! Settings are read from JSON and can be overridden from the environment:
//!
//! - `RASTER_RENDER_THREADS`: number of render bands (0 = rayon pool size)
//! - `RASTER_COLOR_TABLE_SIZE`: size of the RGB color table (0 = none)

use crate::color_map::{ColorFormat, ColorMode, LinearColorMap};
use crate::contour::ConrecFlags;
use crate::spectrogram::{CachePolicy, DisplayModes, Spectrogram};
use raster_common::{Color, RasterError, RasterResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for the number of render bands.
pub const MAX_RENDER_THREADS: usize = 1024;

/// Upper bound for the size of an RGB color table.
pub const MAX_COLOR_TABLE_SIZE: usize = 65536;

/// A color stop of a [`ColorMapConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStopConfig {
    /// Position in `[0, 1]`; stops outside are ignored.
    pub position: f64,
    /// `#RRGGBB` or `#AARRGGBB`.
    pub color: String,
}

/// Serializable description of a [`LinearColorMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMapConfig {
    pub format: ColorFormat,
    pub mode: ColorMode,
    pub color1: String,
    pub color2: String,
    pub stops: Vec<ColorStopConfig>,
}

impl Default for ColorMapConfig {
    fn default() -> Self {
        Self {
            format: ColorFormat::Rgb,
            mode: ColorMode::Scaled,
            color1: Color::BLUE.to_hex(),
            color2: Color::YELLOW.to_hex(),
            stops: Vec::new(),
        }
    }
}

impl ColorMapConfig {
    /// Build the color map. Fails on malformed colors.
    pub fn build(&self) -> RasterResult<LinearColorMap> {
        let color1 = Color::from_hex(&self.color1)?;
        let color2 = Color::from_hex(&self.color2)?;

        let mut map = LinearColorMap::with_format(color1, color2, self.format);
        map.set_mode(self.mode);

        for stop in &self.stops {
            let color = Color::from_hex(&stop.color)?;
            map.add_color_stop(stop.position, color);
        }

        Ok(map)
    }
}

/// Settings of a [`Spectrogram`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramConfig {
    /// Number of render bands, 0 for the size of the rayon pool.
    pub render_thread_count: usize,

    /// Size of the RGB color table, 0 to map every pixel directly.
    pub color_table_size: usize,

    pub contour_levels: Vec<f64>,

    pub conrec: ConrecFlags,

    pub display_modes: DisplayModes,

    pub cache_policy: CachePolicy,

    /// Color for all contour lines; per-level colors from the color map when unset.
    pub default_contour_color: Option<String>,

    pub color_map: Option<ColorMapConfig>,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            render_thread_count: 0,
            color_table_size: 0,
            contour_levels: Vec::new(),
            conrec: ConrecFlags::IGNORE_ALL_VERTICES_ON_LEVEL,
            display_modes: DisplayModes::default(),
            cache_policy: CachePolicy::NoCache,
            default_contour_color: None,
            color_map: None,
        }
    }
}

impl SpectrogramConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> RasterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> RasterResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override settings from environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_env(&mut self) {
        if let Some(threads) = env_usize("RASTER_RENDER_THREADS") {
            self.render_thread_count = threads;
        }

        if let Some(size) = env_usize("RASTER_COLOR_TABLE_SIZE") {
            self.color_table_size = size;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> RasterResult<()> {
        if self.render_thread_count > MAX_RENDER_THREADS {
            return Err(RasterError::invalid_config(
                "render_thread_count",
                format!("must be <= {}", MAX_RENDER_THREADS),
            ));
        }

        if self.color_table_size > MAX_COLOR_TABLE_SIZE {
            return Err(RasterError::invalid_config(
                "color_table_size",
                format!("must be <= {}", MAX_COLOR_TABLE_SIZE),
            ));
        }

        if let Some(level) = self.contour_levels.iter().find(|l| !l.is_finite()) {
            return Err(RasterError::invalid_config(
                "contour_levels",
                format!("level {} is not finite", level),
            ));
        }

        if let Some(color) = &self.default_contour_color {
            Color::from_hex(color)?;
        }

        if let Some(color_map) = &self.color_map {
            color_map.build()?;
        }

        Ok(())
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    match val.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(variable = name, value = %val, "Ignoring unparsable environment value");
            None
        }
    }
}

impl Spectrogram {
    /// Build a spectrogram without data from a validated configuration.
    pub fn from_config(config: &SpectrogramConfig) -> RasterResult<Self> {
        config.validate()?;

        let mut spectrogram = Spectrogram::new();
        spectrogram.set_render_thread_count(config.render_thread_count);
        spectrogram.set_contour_levels(config.contour_levels.clone());
        spectrogram.set_conrec_flags(config.conrec);
        spectrogram.set_display_modes(config.display_modes);
        spectrogram.set_cache_policy(config.cache_policy);

        if let Some(color) = &config.default_contour_color {
            spectrogram.set_default_contour_color(Some(Color::from_hex(color)?));
        }

        if let Some(color_map) = &config.color_map {
            spectrogram.set_color_map(Box::new(color_map.build()?));
        }

        spectrogram.set_color_table_size(config.color_table_size);

        Ok(spectrogram)
    }
}
