//! Tests for the scale/paint coordinate mapping.

use raster_common::{PointF, RectF};
use renderer::ScaleMap;
use test_utils::{assert_approx_eq, assert_coords_approx_eq};

// ============================================================================
// transform / inv_transform
// ============================================================================

#[test]
fn test_transform_linear() {
    let map = ScaleMap::new(0.0, 10.0, 0.0, 200.0);
    assert_approx_eq!(map.transform(0.0), 0.0, 1e-12);
    assert_approx_eq!(map.transform(2.5), 50.0, 1e-12);
    assert_approx_eq!(map.transform(10.0), 200.0, 1e-12);
}

#[test]
fn test_inv_transform_is_inverse() {
    let map = ScaleMap::new(-3.0, 7.0, 40.0, 440.0);
    for s in [-3.0, -1.25, 0.0, 3.3, 7.0] {
        assert_approx_eq!(map.inv_transform(map.transform(s)), s, 1e-9);
    }
}

#[test]
fn test_inverted_paint_interval() {
    // Y axis drawn top-down
    let map = ScaleMap::new(0.0, 100.0, 400.0, 0.0);
    assert!(map.is_inverting());
    assert_approx_eq!(map.transform(0.0), 400.0, 1e-12);
    assert_approx_eq!(map.transform(100.0), 0.0, 1e-12);
    assert_approx_eq!(map.inv_transform(100.0), 75.0, 1e-12);
}

#[test]
fn test_not_inverting() {
    assert!(!ScaleMap::new(0.0, 1.0, 0.0, 10.0).is_inverting());
    assert!(!ScaleMap::new(1.0, 0.0, 10.0, 0.0).is_inverting());
    assert!(ScaleMap::new(1.0, 0.0, 0.0, 10.0).is_inverting());
}

#[test]
fn test_setters_update_factor() {
    let mut map = ScaleMap::default();
    map.set_scale_interval(0.0, 4.0);
    map.set_paint_interval(0.0, 8.0);
    assert_approx_eq!(map.transform(1.0), 2.0, 1e-12);
    assert_eq!(map.s_dist(), 4.0);
    assert_eq!(map.p_dist(), 8.0);
}

// ============================================================================
// points and rectangles
// ============================================================================

#[test]
fn test_point_round_trip() {
    let x_map = ScaleMap::new(0.0, 10.0, 0.0, 100.0);
    let y_map = ScaleMap::new(0.0, 5.0, 50.0, 0.0);

    let p = ScaleMap::transform_point(&x_map, &y_map, PointF::new(2.0, 1.0));
    assert_coords_approx_eq!((p.x, p.y), (20.0, 40.0), 1e-9);

    let back = ScaleMap::inv_transform_point(&x_map, &y_map, p);
    assert_coords_approx_eq!((back.x, back.y), (2.0, 1.0), 1e-9);
}

#[test]
fn test_transform_rect_covers_whole_pixels() {
    let x_map = ScaleMap::new(0.0, 10.0, 0.0, 100.0);
    let y_map = ScaleMap::new(0.0, 10.0, 100.0, 0.0);

    let r = ScaleMap::transform_rect(&x_map, &y_map, &RectF::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(r, RectF::new(0.0, 0.0, 101.0, 101.0));
}

#[test]
fn test_transform_rect_snaps_to_zero() {
    let x_map = ScaleMap::new(0.0, 3.0, 0.0, 300.0);
    let y_map = ScaleMap::new(0.0, 3.0, 0.0, 300.0);

    // An offset far below the pixel extent is snapped away
    let r = ScaleMap::transform_rect(&x_map, &y_map, &RectF::new(1e-12, 0.0, 1.0, 1.0));
    assert_eq!(r.x, 0.0);
    assert_eq!(r.y, 0.0);
}

#[test]
fn test_inv_transform_rect_uses_pixel_centers() {
    let x_map = ScaleMap::new(0.0, 10.0, 0.0, 10.0);
    let y_map = ScaleMap::new(0.0, 10.0, 10.0, 0.0);

    let area = ScaleMap::inv_transform_rect(&x_map, &y_map, &RectF::new(0.0, 0.0, 11.0, 11.0));
    assert_eq!(area, RectF::new(0.0, 0.0, 10.0, 10.0));
}
