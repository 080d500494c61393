//! Nearest grid cell lookup on projected NDFD grids.

use grib2_parser::{GridSpacing, Grib2Message};
use ndfd_common::{NdfdError, NdfdResult};
use projection::{MapProjection, ProjectionError, ProjectionParams};
use serde::{Deserialize, Serialize};

use crate::decoder::decode_error;

/// Grid cell nearest to a query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column index.
    pub x: i64,
    /// Row index.
    pub y: i64,
    /// Planar coordinates of the query point.
    pub grid_x: f64,
    pub grid_y: f64,
    /// Geographic coordinates of the cell centre.
    pub lat: f64,
    pub lon: f64,
}

/// Find the cell of `message` nearest to (`lat`, `lon`).
///
/// The grid's own projection is used unless `projection_override` is
/// given, which lets a second grid on the same projection be indexed
/// consistently with the first.
pub fn nearest_grid_point(
    message: &Grib2Message,
    lat: f64,
    lon: f64,
    projection_override: Option<&ProjectionParams>,
) -> NdfdResult<GridPoint> {
    let params = match projection_override {
        Some(params) => *params,
        None => message.projection_params().map_err(decode_error)?,
    };
    let projection = params.build().map_err(projection_error)?;
    let (dx, dy) = cell_size(&message.spacing())?;

    let (first_lat, first_lon) = message.first_grid_point();
    let (offset_x, offset_y) = projection.project(first_lat, first_lon).map_err(projection_error)?;
    let (grid_x, grid_y) = projection.project(lat, lon).map_err(projection_error)?;

    let x = ((grid_x - offset_x) / dx).round();
    let y = ((grid_y - offset_y) / dy).round();

    let (cell_lat, cell_lon) = projection
        .unproject(x * dx + offset_x, y * dy + offset_y)
        .map_err(projection_error)?;

    Ok(GridPoint {
        x: x as i64,
        y: y as i64,
        grid_x,
        grid_y,
        lat: cell_lat,
        lon: cell_lon,
    })
}

/// Cell size in metres: `Dx/Dy` when declared, otherwise `Di/Dj`.
pub fn cell_size(spacing: &GridSpacing) -> NdfdResult<(f64, f64)> {
    let pair = if spacing.dx.is_some() || spacing.dy.is_some() {
        spacing.dx.zip(spacing.dy)
    } else {
        spacing.di.zip(spacing.dj)
    };

    match pair {
        Some((dx, dy)) if dx != 0.0 && dy != 0.0 => Ok((dx, dy)),
        Some(_) => Err(NdfdError::Decode("Grid declares a zero increment".to_string())),
        None => Err(NdfdError::Decode(
            "Grid declares neither Dx/Dy nor Di/Dj increments".to_string(),
        )),
    }
}

/// Values of the `(2n+1)x(2n+1)` window centred on (`x`, `y`).
///
/// `values` is row-major with `nx` columns. Columns are the outer loop.
/// A window reaching past any grid edge is an error.
pub fn collect_window(
    values: &[f32],
    nx: usize,
    ny: usize,
    x: i64,
    y: i64,
    radius: i64,
) -> NdfdResult<Vec<f32>> {
    let out_of_bounds = || NdfdError::OutOfBounds {
        x,
        y,
        radius,
        nx,
        ny,
    };

    if x - radius < 0 || y - radius < 0 || x + radius >= nx as i64 || y + radius >= ny as i64 {
        return Err(out_of_bounds());
    }

    let mut window = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    for i in -radius..=radius {
        for j in -radius..=radius {
            let index = ((y + j) as usize) * nx + (x + i) as usize;
            window.push(*values.get(index).ok_or_else(out_of_bounds)?);
        }
    }
    Ok(window)
}

/// Widen a sample, mapping the missing sentinel and NaN to NaN.
pub fn mask_missing(value: f32, missing: Option<f64>) -> f64 {
    match missing {
        _ if value.is_nan() => f64::NAN,
        Some(sentinel) if value == sentinel as f32 => f64::NAN,
        _ => value as f64,
    }
}

fn projection_error(e: ProjectionError) -> NdfdError {
    NdfdError::Projection(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_size_prefers_dx_dy() {
        let spacing = GridSpacing {
            dx: Some(2539.703),
            dy: Some(2539.703),
            di: Some(1.0),
            dj: Some(1.0),
        };
        assert_eq!(cell_size(&spacing).unwrap(), (2539.703, 2539.703));
    }

    #[test]
    fn test_cell_size_falls_back_to_di_dj() {
        let spacing = GridSpacing {
            di: Some(2500.0),
            dj: Some(2500.0),
            ..Default::default()
        };
        assert_eq!(cell_size(&spacing).unwrap(), (2500.0, 2500.0));
    }

    #[test]
    fn test_cell_size_missing() {
        assert!(matches!(
            cell_size(&GridSpacing::default()),
            Err(NdfdError::Decode(_))
        ));
        let half = GridSpacing {
            dx: Some(1.0),
            di: Some(1.0),
            dj: Some(1.0),
            ..Default::default()
        };
        assert!(matches!(cell_size(&half), Err(NdfdError::Decode(_))));
    }

    #[test]
    fn test_window_order() {
        // 3x3 grid, value = row * 10 + col
        let values: Vec<f32> = (0..3)
            .flat_map(|row| (0..3).map(move |col| (row * 10 + col) as f32))
            .collect();
        let window = collect_window(&values, 3, 3, 1, 1, 1).unwrap();
        assert_eq!(
            window,
            vec![0.0, 10.0, 20.0, 1.0, 11.0, 21.0, 2.0, 12.0, 22.0]
        );
        assert_eq!(collect_window(&values, 3, 3, 2, 0, 0).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_window_out_of_bounds() {
        let values = vec![0.0; 12];
        for (x, y, r) in [(0, 1, 1), (1, 0, 1), (3, 1, 1), (1, 2, 1), (-1, 0, 0), (4, 0, 0)] {
            let result = collect_window(&values, 4, 3, x, y, r);
            assert!(
                matches!(result, Err(NdfdError::OutOfBounds { .. })),
                "({x}, {y}) r={r} should be out of bounds"
            );
        }
        assert!(collect_window(&values, 4, 3, 2, 1, 1).is_ok());
    }

    #[test]
    fn test_mask_missing() {
        assert_eq!(mask_missing(1.5, Some(9999.0)), 1.5);
        assert!(mask_missing(9999.0, Some(9999.0)).is_nan());
        assert!(mask_missing(f32::NAN, None).is_nan());
        assert_eq!(mask_missing(9999.0, None), 9999.0);
    }
}
