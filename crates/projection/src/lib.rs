//! Coordinate reference system transformations.
//!
//! Implements the spherical map projections used by NDFD grids, plus
//! ellipsoidal geodesics, from scratch without external dependencies.

pub mod geodesic;
pub mod lambert;
pub mod mercator;
pub mod polar;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geodesic::{DirectSolution, Ellipsoid, Geodesic, InverseSolution};
pub use lambert::LambertConformal;
pub use mercator::Mercator;
pub use polar::PolarStereographic;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invalid projection parameter: {0}")]
    InvalidParameter(String),

    #[error("Point ({lat}, {lon}) is outside the projection domain")]
    OutOfDomain { lat: f64, lon: f64 },
}

/// A forward/inverse planar projection.
///
/// Geographic coordinates are degrees; planar coordinates are metres.
pub trait MapProjection {
    /// (lat, lon) to (x, y).
    fn project(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError>;

    /// (x, y) to (lat, lon), longitude in [-180, 180].
    fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError>;
}

/// Declared projection parameters of a grid, independent of its extent.
///
/// These are what a grid message carries and what may be reused to locate
/// points in a second grid sharing the same projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "proj", rename_all = "snake_case")]
pub enum ProjectionParams {
    LambertConformal {
        lat_0: f64,
        lon_0: f64,
        lat_1: f64,
        lat_2: f64,
        radius: f64,
    },
    PolarStereographic {
        lat_ts: f64,
        lon_0: f64,
        south_pole: bool,
        radius: f64,
    },
    Mercator {
        lat_ts: f64,
        lon_0: f64,
        radius: f64,
    },
}

impl ProjectionParams {
    pub fn build(&self) -> Result<Projection, ProjectionError> {
        Projection::new(self)
    }
}

/// A concrete projection built from [`ProjectionParams`].
#[derive(Debug, Clone)]
pub enum Projection {
    Lambert(LambertConformal),
    Polar(PolarStereographic),
    Mercator(Mercator),
}

impl Projection {
    pub fn new(params: &ProjectionParams) -> Result<Self, ProjectionError> {
        let projection = match *params {
            ProjectionParams::LambertConformal {
                lat_0,
                lon_0,
                lat_1,
                lat_2,
                radius,
            } => Projection::Lambert(LambertConformal::new(lat_0, lon_0, lat_1, lat_2, radius)?),
            ProjectionParams::PolarStereographic {
                lat_ts,
                lon_0,
                south_pole,
                radius,
            } => Projection::Polar(PolarStereographic::new(lat_ts, lon_0, south_pole, radius)?),
            ProjectionParams::Mercator { lat_ts, lon_0, radius } => {
                Projection::Mercator(Mercator::new(lat_ts, lon_0, radius)?)
            }
        };
        Ok(projection)
    }
}

impl MapProjection for Projection {
    fn project(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError> {
        match self {
            Projection::Lambert(p) => p.project(lat, lon),
            Projection::Polar(p) => p.project(lat, lon),
            Projection::Mercator(p) => p.project(lat, lon),
        }
    }

    fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        match self {
            Projection::Lambert(p) => p.unproject(x, y),
            Projection::Polar(p) => p.unproject(x, y),
            Projection::Mercator(p) => p.unproject(x, y),
        }
    }
}

/// Wrap a longitude difference in radians into [-PI, PI].
pub(crate) fn normalize_lon_rad(lon: f64) -> f64 {
    let mut l = lon % (2.0 * PI);
    if l > PI {
        l -= 2.0 * PI;
    } else if l < -PI {
        l += 2.0 * PI;
    }
    l
}
