//! Lambert Conformal Conic projection.
//!
//! Used by the CONUS and most NDFD sector grids. It maps a cone tangent or
//! secant to a spherical Earth onto a flat plane.
//!
//! The projection parameters include:
//! - Origin latitude (lat_0): LaD in GRIB2
//! - Central meridian (lon_0): LoV in GRIB2
//! - Standard parallel(s): Latin1 and Latin2 (equal for a tangent cone)
//!
//! Planar coordinates are metres from the origin with no false easting or
//! northing.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::{normalize_lon_rad, MapProjection, ProjectionError};

/// Lambert Conformal Conic projection on a sphere.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Origin latitude in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// R * F
    rf: f64,
    /// Rho at the origin latitude
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection from GRIB2 template 3.30 parameters.
    ///
    /// # Arguments
    /// * `lat0_deg` - Origin latitude (LaD, degrees)
    /// * `lon0_deg` - Central meridian (LoV, degrees)
    /// * `latin1_deg` - First standard parallel (degrees)
    /// * `latin2_deg` - Second standard parallel (degrees)
    /// * `earth_radius` - Sphere radius (meters)
    pub fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        earth_radius: f64,
    ) -> Result<Self, ProjectionError> {
        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        if (latin1 + latin2).abs() < 1e-10 {
            return Err(ProjectionError::InvalidParameter(
                "standard parallels must not be symmetric about the equator".to_string(),
            ));
        }
        if earth_radius <= 0.0 {
            return Err(ProjectionError::InvalidParameter(format!(
                "earth radius must be positive, got {}",
                earth_radius
            )));
        }

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((FRAC_PI_4 + latin2 / 2.0).tan() / (FRAC_PI_4 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (FRAC_PI_4 + latin1 / 2.0).tan().powf(n)) / n;
        let rf = earth_radius * f;
        let rho0 = rho_at(rf, n, lat0);

        Ok(Self {
            lon0,
            lat0,
            latin1,
            latin2,
            earth_radius,
            n,
            rf,
            rho0,
        })
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }
}

fn rho_at(rf: f64, n: f64, lat: f64) -> f64 {
    let t = (FRAC_PI_4 + lat / 2.0).tan();
    if t.abs() < 1e-12 {
        // Pole opposite the cone apex
        f64::INFINITY
    } else {
        rf / t.powf(n)
    }
}

impl MapProjection for LambertConformal {
    fn project(&self, lat_deg: f64, lon_deg: f64) -> Result<(f64, f64), ProjectionError> {
        let lat = lat_deg.to_radians();
        let dlon = normalize_lon_rad(lon_deg.to_radians() - self.lon0);

        let rho = if (lat.abs() - FRAC_PI_2).abs() < 1e-10 && lat * self.n > 0.0 {
            0.0
        } else {
            rho_at(self.rf, self.n, lat)
        };
        if !rho.is_finite() {
            return Err(ProjectionError::OutOfDomain { lat: lat_deg, lon: lon_deg });
        }

        let theta = self.n * dlon;
        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        Ok((x, y))
    }

    fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let dy = self.rho0 - y;
        let sign = self.n.signum();
        let rho = sign * x.hypot(dy);

        let (lat, theta) = if rho == 0.0 {
            (sign * FRAC_PI_2, 0.0)
        } else {
            let theta = (sign * x).atan2(sign * dy);
            let lat = 2.0 * (self.rf / rho).powf(1.0 / self.n).atan() - FRAC_PI_2;
            (lat, theta)
        };

        let lon = normalize_lon_rad(theta / self.n + self.lon0);
        let (lat_deg, lon_deg) = (lat.to_degrees(), lon.to_degrees());
        if !lat_deg.is_finite() || !lon_deg.is_finite() {
            return Err(ProjectionError::OutOfDomain { lat: lat_deg, lon: lon_deg });
        }
        Ok((lat_deg, lon_deg))
    }
}
