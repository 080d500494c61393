//! Mercator projection on a sphere (GRIB2 template 3.10).
//!
//! NDFD's Hawaii, Guam, Puerto Rico and North Pacific grids use this
//! projection, with true scale at LaD and the central meridian midway between
//! the first and last grid longitudes.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::{normalize_lon_rad, MapProjection, ProjectionError};

#[derive(Debug, Clone)]
pub struct Mercator {
    /// Latitude of true scale in radians
    pub lat_ts: f64,
    /// Central meridian in radians
    pub lon0: f64,
    pub earth_radius: f64,
    /// R * cos(lat_ts)
    k: f64,
}

impl Mercator {
    pub fn new(lat_ts_deg: f64, lon0_deg: f64, earth_radius: f64) -> Result<Self, ProjectionError> {
        let lat_ts = lat_ts_deg.to_radians();
        if lat_ts.abs() >= FRAC_PI_2 {
            return Err(ProjectionError::InvalidParameter(format!(
                "latitude of true scale must be inside (-90, 90), got {}",
                lat_ts_deg
            )));
        }
        if earth_radius <= 0.0 {
            return Err(ProjectionError::InvalidParameter(format!(
                "earth radius must be positive, got {}",
                earth_radius
            )));
        }
        Ok(Self {
            lat_ts,
            lon0: lon0_deg.to_radians(),
            earth_radius,
            k: earth_radius * lat_ts.cos(),
        })
    }
}

impl MapProjection for Mercator {
    fn project(&self, lat_deg: f64, lon_deg: f64) -> Result<(f64, f64), ProjectionError> {
        let lat = lat_deg.to_radians();
        if (lat.abs() - FRAC_PI_2).abs() < 1e-10 {
            return Err(ProjectionError::OutOfDomain { lat: lat_deg, lon: lon_deg });
        }
        let dlon = normalize_lon_rad(lon_deg.to_radians() - self.lon0);
        let x = self.k * dlon;
        let y = self.k * (FRAC_PI_4 + 0.5 * lat).tan().ln();
        Ok((x, y))
    }

    fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let lat = FRAC_PI_2 - 2.0 * (-y / self.k).exp().atan();
        let lon = normalize_lon_rad(x / self.k + self.lon0);
        Ok((lat.to_degrees(), lon.to_degrees()))
    }
}
