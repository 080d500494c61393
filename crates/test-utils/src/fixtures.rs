//! Common test fixtures for NDFD tests.
//!
//! Grids are built so that a chosen query point falls exactly on a chosen
//! cell, which keeps locator and neighborhood expectations simple.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use projection::{MapProjection, ProjectionParams};

use crate::builder::{Grib2Builder, GridLayout};

/// Query points used across the test suite, as (lat, lon).
pub mod points {
    /// Topeka, Kansas (CONUS, `crplains` sector)
    pub const TOPEKA: (f64, f64) = (39.0483, -95.6780);

    /// Hagatna, Guam
    pub const HAGATNA: (f64, f64) = (13.4745, 144.7504);

    /// Anchorage, Alaska
    pub const ANCHORAGE: (f64, f64) = (61.2181, -149.9003);

    /// Mauna Kea, Hawaii, with the longitude sign dropped
    pub const MAUNA_KEA_EAST: (f64, f64) = (19.8968, 155.5828);
}

pub const NDFD_RADIUS: f64 = 6_371_200.0;

/// NDFD CONUS 2.5 km Lambert conformal parameters.
pub const CONUS_LAMBERT: ProjectionParams = ProjectionParams::LambertConformal {
    lat_0: 25.0,
    lon_0: 265.0,
    lat_1: 25.0,
    lat_2: 25.0,
    radius: NDFD_RADIUS,
};

/// NDFD Alaska 3 km polar stereographic parameters.
pub const ALASKA_POLAR: ProjectionParams = ProjectionParams::PolarStereographic {
    lat_ts: 60.0,
    lon_0: 210.0,
    south_pole: false,
    radius: NDFD_RADIUS,
};

/// NDFD Guam 2.5 km Mercator parameters.
pub const GUAM_MERCATOR: ProjectionParams = ProjectionParams::Mercator {
    lat_ts: 20.0,
    lon_0: 145.0,
    radius: NDFD_RADIUS,
};

pub const CONUS_SPACING: f64 = 2539.703;
pub const ALASKA_SPACING: f64 = 2976.563;
pub const GUAM_SPACING: f64 = 2500.0;

/// An `ni` x `nj` Lambert grid whose cell `(col, row)` is the point.
pub fn conus_grid_at(point: (f64, f64), ni: u32, nj: u32, col: u32, row: u32) -> Grib2Builder {
    let first = first_point(&CONUS_LAMBERT, point, col, row, CONUS_SPACING, CONUS_SPACING);
    Grib2Builder::new_conus()
        .with_grid(ni, nj)
        .with_first_point(first.0, first.1)
        .with_layout(GridLayout::Lambert {
            lat_d: 25.0,
            lov: 265.0,
            latin1: 25.0,
            latin2: 25.0,
            dx: CONUS_SPACING,
            dy: CONUS_SPACING,
        })
}

/// A polar stereographic grid whose cell `(col, row)` is the point.
pub fn alaska_grid_at(point: (f64, f64), ni: u32, nj: u32, col: u32, row: u32) -> Grib2Builder {
    let first = first_point(&ALASKA_POLAR, point, col, row, ALASKA_SPACING, ALASKA_SPACING);
    Grib2Builder::new_conus()
        .with_grid(ni, nj)
        .with_first_point(first.0, first.1)
        .with_layout(GridLayout::Polar {
            lat_d: 60.0,
            lov: 210.0,
            dx: ALASKA_SPACING,
            dy: ALASKA_SPACING,
            south_pole: false,
        })
}

/// A Mercator grid whose cell `(col, row)` is the point.
///
/// The central meridian recovered from the first and last longitudes
/// differs from [`GUAM_MERCATOR`], which does not move cell indices.
pub fn guam_grid_at(point: (f64, f64), ni: u32, nj: u32, col: u32, row: u32) -> Grib2Builder {
    let first = first_point(&GUAM_MERCATOR, point, col, row, GUAM_SPACING, GUAM_SPACING);
    let last = offset_point(
        &GUAM_MERCATOR,
        first,
        (ni - 1) as f64 * GUAM_SPACING,
        (nj - 1) as f64 * GUAM_SPACING,
    );
    Grib2Builder::new_conus()
        .with_grid(ni, nj)
        .with_first_point(first.0, first.1)
        .with_layout(GridLayout::Mercator {
            lat_d: 20.0,
            last_lat: last.0,
            last_lon: last.1,
            di: GUAM_SPACING,
            dj: GUAM_SPACING,
        })
}

fn first_point(
    params: &ProjectionParams,
    point: (f64, f64),
    col: u32,
    row: u32,
    dx: f64,
    dy: f64,
) -> (f64, f64) {
    offset_point(params, point, -(col as f64) * dx, -(row as f64) * dy)
}

fn offset_point(params: &ProjectionParams, point: (f64, f64), dx: f64, dy: f64) -> (f64, f64) {
    let proj = params.build().expect("fixture projection");
    let (x, y) = proj.project(point.0, point.1).expect("fixture point projects");
    proj.unproject(x + dx, y + dy).expect("fixture point unprojects")
}

/// Concatenate messages into one GRIB2 file.
pub fn write_grib_file(path: &Path, messages: &[Vec<u8>]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, messages.concat())
}

/// Place a variable file in a local source tree laid out like the NWS
/// distribution server.
pub fn write_source_variable(
    source_root: &Path,
    region: &str,
    period: &str,
    variable: &str,
    messages: &[Vec<u8>],
) -> io::Result<PathBuf> {
    let path = source_root
        .join("DC.ndfd")
        .join(format!("AR.{}", region))
        .join(format!("VP.{}", period))
        .join(format!("ds.{}.bin", variable));
    write_grib_file(&path, messages)?;
    Ok(path)
}

/// Place a static elevation file in a local source tree.
pub fn write_source_elevation(
    source_root: &Path,
    region: &str,
    messages: &[Vec<u8>],
) -> io::Result<PathBuf> {
    let path = source_root
        .join("static")
        .join("DC.ndfd")
        .join(format!("AR.{}", region))
        .join("ds.elev.bin");
    write_grib_file(&path, messages)?;
    Ok(path)
}

/// Known packed `wwa` local use payload and the codes it carries.
pub mod packed {
    pub const WWA_SAMPLE: &[u8] =
        b"\x01\x00\x01\x00\x00\x00\x16\x00\x00\x00\x00\x00\x00\x07\x01y;~\xec\xaf\x80G\x98\xba\x08\np\xd7Y\x01\"\xd2\xe8 \x00";

    pub const WWA_SAMPLE_CODES: [&str; 4] = ["<None>", "GL.A", "SC.Y", "HZ.A"];
}
