//! Polar stereographic projection on a sphere (GRIB2 template 3.20).
//!
//! NDFD's Alaska grid uses this projection with true scale at 60°N.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::{normalize_lon_rad, MapProjection, ProjectionError};

#[derive(Debug, Clone)]
pub struct PolarStereographic {
    /// Latitude of true scale in radians (absolute value)
    pub lat_ts: f64,
    /// Orientation meridian in radians
    pub lon0: f64,
    pub south_pole: bool,
    pub earth_radius: f64,
    /// R * k at the pole, scaled for true scale at `lat_ts`
    akm1: f64,
}

impl PolarStereographic {
    pub fn new(
        lat_ts_deg: f64,
        lon0_deg: f64,
        south_pole: bool,
        earth_radius: f64,
    ) -> Result<Self, ProjectionError> {
        if earth_radius <= 0.0 {
            return Err(ProjectionError::InvalidParameter(format!(
                "earth radius must be positive, got {}",
                earth_radius
            )));
        }
        let lat_ts = lat_ts_deg.to_radians().abs();
        let akm1 = if (lat_ts - FRAC_PI_2).abs() >= 1e-10 {
            earth_radius * lat_ts.cos() / (FRAC_PI_4 - 0.5 * lat_ts).tan()
        } else {
            2.0 * earth_radius
        };

        Ok(Self {
            lat_ts,
            lon0: lon0_deg.to_radians(),
            south_pole,
            earth_radius,
            akm1,
        })
    }
}

impl MapProjection for PolarStereographic {
    fn project(&self, lat_deg: f64, lon_deg: f64) -> Result<(f64, f64), ProjectionError> {
        let mut lat = lat_deg.to_radians();
        let dlon = normalize_lon_rad(lon_deg.to_radians() - self.lon0);
        let mut cos_lam = dlon.cos();

        if !self.south_pole {
            cos_lam = -cos_lam;
            lat = -lat;
        }
        if (lat - FRAC_PI_2).abs() < 1e-10 {
            // Opposite pole
            return Err(ProjectionError::OutOfDomain { lat: lat_deg, lon: lon_deg });
        }

        let rho = self.akm1 * (FRAC_PI_4 + 0.5 * lat).tan();
        Ok((rho * dlon.sin(), rho * cos_lam))
    }

    fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let rho = x.hypot(y);
        let colat = 2.0 * (rho / self.akm1).atan();

        let (lat, lon) = if self.south_pole {
            (colat - FRAC_PI_2, x.atan2(y))
        } else {
            (FRAC_PI_2 - colat, x.atan2(-y))
        };

        let lon = if rho == 0.0 { self.lon0 } else { lon + self.lon0 };
        Ok((lat.to_degrees(), normalize_lon_rad(lon).to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alaska() -> PolarStereographic {
        PolarStereographic::new(60.0, 210.0, false, 6_371_200.0).unwrap()
    }

    #[test]
    fn test_pole_is_origin() {
        let (x, y) = alaska().project(90.0, -150.0).unwrap();
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn test_orientation_meridian_points_down() {
        let (x, y) = alaska().project(60.0, -150.0).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y < 0.0);
    }

    #[test]
    fn test_true_scale_at_lat_ts() {
        // Moving 1e-6 rad of longitude along 60N should cover R*cos(60)*dlon
        let proj = alaska();
        let d = 1e-6_f64;
        let (x1, y1) = proj.project(60.0, -150.0).unwrap();
        let (x2, y2) = proj.project(60.0, -150.0 + d.to_degrees()).unwrap();
        let planar = (x2 - x1).hypot(y2 - y1);
        let expected = 6_371_200.0 * 60.0_f64.to_radians().cos() * d;
        assert!((planar - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn test_roundtrip_north() {
        let proj = alaska();
        for &(lat, lon) in &[(64.2, -147.7), (51.0, 175.0), (70.0, -130.0), (40.53, -178.0)] {
            let (x, y) = proj.project(lat, lon).unwrap();
            let (lat2, lon2) = proj.unproject(x, y).unwrap();
            assert!((lat - lat2).abs() < 1e-9);
            assert!((lon - lon2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_roundtrip_south() {
        let proj = PolarStereographic::new(-71.0, 0.0, true, 6_371_229.0).unwrap();
        let (x, y) = proj.project(-75.0, 100.0).unwrap();
        let (lat, lon) = proj.unproject(x, y).unwrap();
        assert!((lat + 75.0).abs() < 1e-9);
        assert!((lon - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_pole_is_out_of_domain() {
        assert!(alaska().project(-90.0, 0.0).is_err());
    }
}
