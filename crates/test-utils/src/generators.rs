//! Test data generators for synthetic scalar fields.
//!
//! All generators return row-major `Vec<f64>` buffers (row 0 first), the
//! layout expected by `MatrixRasterData::set_value_matrix`.

/// Creates a grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly
/// by checking that grid[row * width + col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);  // col=1, row=0
/// assert_eq!(grid[10], 1.0);    // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates a diagonal ramp where each cell holds `col + row`.
///
/// Sampled at cell centers of a matrix spanning `[0, width] x [0, height]`
/// the field is `x + y - 1`, so every contour level is a straight line.
pub fn diagonal_ramp(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col + row) as f64);
        }
    }
    data
}

/// Creates a horizontal ramp from `min` (first column) to `max` (last column).
pub fn horizontal_ramp(width: usize, height: usize, min: f64, max: f64) -> Vec<f64> {
    let step = if width > 1 {
        (max - min) / (width - 1) as f64
    } else {
        0.0
    };

    let mut data = Vec::with_capacity(width * height);
    for _ in 0..height {
        for col in 0..width {
            data.push(min + col as f64 * step);
        }
    }
    data
}

/// The 4x4 matrix `{0,1,2,3; 1,2,3,4; 2,3,4,5; 3,4,5,6}`.
pub fn four_by_four_ramp() -> Vec<f64> {
    diagonal_ramp(4, 4)
}

/// Creates a smooth, wavy field in `[-1, 1]`, a cheap stand-in for
/// a real spectrogram.
pub fn create_wave_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let y = row as f64 / height.max(1) as f64;
        for col in 0..width {
            let x = col as f64 / width.max(1) as f64;
            let v = (x * std::f64::consts::TAU * 2.0).sin() * (y * std::f64::consts::PI).cos();
            data.push(v);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates a grid with NaN values at the given `(col, row)` positions.
///
/// Useful for testing gap handling.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    base_value: f64,
    nan_positions: &[(usize, usize)],
) -> Vec<f64> {
    let mut data = vec![base_value; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f64::NAN;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(3, 2);
        assert_eq!(grid, vec![0.0, 1000.0, 2000.0, 1.0, 1001.0, 2001.0]);
    }

    #[test]
    fn test_four_by_four_ramp() {
        let grid = four_by_four_ramp();
        assert_eq!(grid.len(), 16);
        assert_eq!(&grid[0..4], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(&grid[12..16], &[3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_horizontal_ramp() {
        let grid = horizontal_ramp(5, 2, 0.0, 1.0);
        assert_eq!(&grid[0..5], &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(&grid[5..10], &grid[0..5]);

        let single = horizontal_ramp(1, 1, 3.0, 7.0);
        assert_eq!(single, vec![3.0]);
    }

    #[test]
    fn test_create_wave_grid_range() {
        let grid = create_wave_grid(32, 16);
        assert_eq!(grid.len(), 512);
        assert!(grid.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(3, 3, 1.0, &[(1, 1), (5, 5)]);
        assert!(grid[4].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 1);
    }
}
