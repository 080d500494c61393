//! Test data generators for creating synthetic grids.
//!
//! The patterns are chosen so that a value identifies its cell, which makes
//! neighborhood reads easy to check.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Terrain-like heights in metres rising towards the north-east.
pub fn create_elevation_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((100 + 10 * col + 50 * row) as f32);
        }
    }
    data
}

/// Constant grid with NaN at the listed `(col, row)` cells.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    value: f32,
    nan_cells: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![value; width * height];
    for &(col, row) in nan_cells {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}
