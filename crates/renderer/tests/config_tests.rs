//! Tests for spectrogram configuration loading and validation.

use raster_common::{Color, RasterError};
use renderer::config::{MAX_COLOR_TABLE_SIZE, MAX_RENDER_THREADS};
use renderer::{
    CachePolicy, ColorFormat, ColorMapConfig, ColorMode, ColorStopConfig, ConrecFlags,
    DisplayMode, Spectrogram, SpectrogramConfig,
};
use std::io::Write;

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_empty_json_is_default() {
    let config = SpectrogramConfig::from_json("{}").unwrap();
    assert_eq!(config, SpectrogramConfig::default());
    assert_eq!(config.conrec, ConrecFlags::IGNORE_ALL_VERTICES_ON_LEVEL);
    assert!(config.display_modes.image);
    assert!(!config.display_modes.contour);
}

#[test]
fn test_full_json() {
    let json = r##"{
        "render_thread_count": 4,
        "color_table_size": 64,
        "contour_levels": [10.0, 0.0, 5.0],
        "conrec": { "ignore_out_of_range": true },
        "display_modes": { "contour": true },
        "cache_policy": "paint_cache",
        "default_contour_color": "#FF0000",
        "color_map": {
            "format": "indexed",
            "mode": "fixed",
            "color1": "#000000",
            "color2": "#FFFFFF",
            "stops": [{ "position": 0.5, "color": "#80FF0000" }]
        }
    }"##;

    let config = SpectrogramConfig::from_json(json).unwrap();
    assert_eq!(config.render_thread_count, 4);
    assert_eq!(config.color_table_size, 64);
    assert_eq!(config.contour_levels, vec![10.0, 0.0, 5.0]);
    assert!(config.conrec.ignore_out_of_range);
    assert!(!config.conrec.ignore_all_vertices_on_level);
    assert!(config.display_modes.image);
    assert!(config.display_modes.contour);
    assert_eq!(config.cache_policy, CachePolicy::PaintCache);

    let color_map = config.color_map.as_ref().unwrap();
    assert_eq!(color_map.format, ColorFormat::Indexed);
    assert_eq!(color_map.mode, ColorMode::Fixed);
    assert_eq!(
        color_map.stops,
        vec![ColorStopConfig {
            position: 0.5,
            color: "#80FF0000".to_string()
        }]
    );

    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_json() {
    let err = SpectrogramConfig::from_json("{ \"render_thread_count\": \"four\" }").unwrap_err();
    assert!(matches!(err, RasterError::Json(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "color_table_size": 16, "contour_levels": [1.5] }}"#).unwrap();

    let config = SpectrogramConfig::from_file(file.path()).unwrap();
    assert_eq!(config.color_table_size, 16);
    assert_eq!(config.contour_levels, vec![1.5]);
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SpectrogramConfig::from_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, RasterError::Io(_)));
}

// Only test touching these variables, tests run in parallel
#[test]
fn test_environment_overrides() {
    std::env::set_var("RASTER_RENDER_THREADS", "3");
    std::env::set_var("RASTER_COLOR_TABLE_SIZE", " 128 ");

    let config = SpectrogramConfig::from_env();
    assert_eq!(config.render_thread_count, 3);
    assert_eq!(config.color_table_size, 128);

    std::env::set_var("RASTER_RENDER_THREADS", "many");
    let mut config = SpectrogramConfig {
        render_thread_count: 2,
        ..Default::default()
    };
    config.apply_env();
    assert_eq!(config.render_thread_count, 2);
    assert_eq!(config.color_table_size, 128);

    std::env::remove_var("RASTER_RENDER_THREADS");
    std::env::remove_var("RASTER_COLOR_TABLE_SIZE");

    let config = SpectrogramConfig::from_env();
    assert_eq!(config, SpectrogramConfig::default());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_limits() {
    let config = SpectrogramConfig {
        render_thread_count: MAX_RENDER_THREADS + 1,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(RasterError::InvalidConfig { ref param, .. }) if param == "render_thread_count"
    ));

    let config = SpectrogramConfig {
        render_thread_count: MAX_RENDER_THREADS,
        color_table_size: MAX_COLOR_TABLE_SIZE,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_levels() {
    let config = SpectrogramConfig {
        contour_levels: vec![0.0, f64::INFINITY],
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("contour_levels"));
}

#[test]
fn test_validate_colors() {
    let config = SpectrogramConfig {
        default_contour_color: Some("red".to_string()),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(RasterError::InvalidColor(_))));

    let config = SpectrogramConfig {
        color_map: Some(ColorMapConfig {
            stops: vec![ColorStopConfig {
                position: 0.5,
                color: "#GG0000".to_string(),
            }],
            ..Default::default()
        }),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(RasterError::InvalidColor(_))));
}

// ============================================================================
// Building
// ============================================================================

#[test]
fn test_color_map_config_build() {
    let config = ColorMapConfig {
        mode: ColorMode::Fixed,
        color1: "#000000".to_string(),
        color2: "#FFFFFF".to_string(),
        stops: vec![ColorStopConfig {
            position: 0.5,
            color: "#FF0000".to_string(),
        }],
        ..Default::default()
    };

    let map = config.build().unwrap();
    assert_eq!(map.mode(), ColorMode::Fixed);
    assert_eq!(map.color_stops(), vec![0.0, 0.5, 1.0]);
    assert_eq!(map.color1(), Color::BLACK);
    assert_eq!(map.color2(), Color::WHITE);
}

#[test]
fn test_default_color_map_config() {
    let map = ColorMapConfig::default().build().unwrap();
    assert_eq!(map.color1(), Color::BLUE);
    assert_eq!(map.color2(), Color::YELLOW);
}

#[test]
fn test_spectrogram_from_config() {
    let config = SpectrogramConfig {
        render_thread_count: 2,
        color_table_size: 16,
        contour_levels: vec![3.0, 1.0],
        conrec: ConrecFlags::NONE,
        cache_policy: CachePolicy::PaintCache,
        default_contour_color: Some("#00FF00".to_string()),
        color_map: Some(ColorMapConfig::default()),
        ..Default::default()
    };

    let spectrogram = Spectrogram::from_config(&config).unwrap();
    assert_eq!(spectrogram.render_thread_count(), 2);
    assert_eq!(spectrogram.color_table_size(), 16);
    assert_eq!(spectrogram.color_table().len(), 16);
    assert_eq!(spectrogram.contour_levels(), &[1.0, 3.0]);
    assert_eq!(spectrogram.conrec_flags(), ConrecFlags::NONE);
    assert_eq!(spectrogram.cache_policy(), CachePolicy::PaintCache);
    assert_eq!(spectrogram.default_contour_color(), Some(Color::GREEN));
    assert!(spectrogram.test_display_mode(DisplayMode::Image));
    assert!(spectrogram.data().is_none());
}

#[test]
fn test_spectrogram_from_invalid_config() {
    let config = SpectrogramConfig {
        color_table_size: MAX_COLOR_TABLE_SIZE + 1,
        ..Default::default()
    };
    assert!(Spectrogram::from_config(&config).is_err());
}
