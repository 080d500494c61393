//! Section 3 grid definition templates.
//!
//! Supported templates are the ones NDFD publishes:
//! - 3.10 Mercator
//! - 3.20 Polar stereographic
//! - 3.30 Lambert conformal
//!
//! Other templates are kept with their dimensions only.

use projection::ProjectionParams;

use super::{read_signed_u32, read_u32};
use crate::Grib2Error;

/// Angles in the grid templates are in units of 10^-6 degrees.
const MICRODEGREES: f64 = 1e-6;

/// Grid lengths in the projected templates are in units of 10^-3 m.
const MILLIMETRES: f64 = 1e-3;

/// Shape of the Earth (Code Table 3.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthShape {
    pub shape: u8,
    pub radius_scale_factor: u8,
    pub radius_scaled_value: u32,
}

impl EarthShape {
    /// Sphere radius in metres.
    pub fn radius(&self) -> Result<f64, Grib2Error> {
        match self.shape {
            0 => Ok(6_367_470.0),
            1 => Ok(self.radius_scaled_value as f64 / 10f64.powi(self.radius_scale_factor as i32)),
            6 => Ok(6_371_229.0),
            8 => Ok(6_371_200.0),
            shape => Err(Grib2Error::InvalidSection {
                section: 3,
                reason: format!("Non-spherical earth shape {} is not supported", shape),
            }),
        }
    }
}

/// Template-specific grid parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum GridTemplate {
    /// Template 3.10
    Mercator {
        lat_d: f64,
        last_lat: f64,
        last_lon: f64,
        di: f64,
        dj: f64,
    },
    /// Template 3.20
    PolarStereographic {
        lat_d: f64,
        lov: f64,
        dx: f64,
        dy: f64,
        south_pole: bool,
    },
    /// Template 3.30
    LambertConformal {
        lat_d: f64,
        lov: f64,
        dx: f64,
        dy: f64,
        latin1: f64,
        latin2: f64,
    },
    Unsupported(u16),
}

/// Section 3: Grid Definition Section
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    pub template_number: u16,
    pub num_data_points: u32,
    /// Points along the x axis (Ni / Nx)
    pub ni: u32,
    /// Points along the y axis (Nj / Ny)
    pub nj: u32,
    pub earth: EarthShape,
    pub first_lat: f64,
    pub first_lon: f64,
    pub scanning_mode: u8,
    pub template: GridTemplate,
}

/// Grid increments in metres, keyed the way the template declares them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridSpacing {
    pub dx: Option<f64>,
    pub dy: Option<f64>,
    pub di: Option<f64>,
    pub dj: Option<f64>,
}

impl GridDefinition {
    pub fn spacing(&self) -> GridSpacing {
        match self.template {
            GridTemplate::Mercator { di, dj, .. } => GridSpacing {
                di: Some(di),
                dj: Some(dj),
                ..Default::default()
            },
            GridTemplate::PolarStereographic { dx, dy, .. }
            | GridTemplate::LambertConformal { dx, dy, .. } => GridSpacing {
                dx: Some(dx),
                dy: Some(dy),
                ..Default::default()
            },
            GridTemplate::Unsupported(_) => GridSpacing::default(),
        }
    }

    /// Projection parameters declared by the grid.
    pub fn projection_params(&self) -> Result<ProjectionParams, Grib2Error> {
        let radius = self.earth.radius()?;
        let params = match self.template {
            GridTemplate::Mercator { lat_d, last_lon, .. } => {
                let lon1 = self.first_lon;
                let mut lon2 = last_lon;
                if lon2 < lon1 {
                    lon2 += 360.0;
                }
                ProjectionParams::Mercator {
                    lat_ts: lat_d,
                    lon_0: 0.5 * (lon1 + lon2),
                    radius,
                }
            }
            GridTemplate::PolarStereographic {
                lat_d,
                lov,
                south_pole,
                ..
            } => ProjectionParams::PolarStereographic {
                lat_ts: lat_d,
                lon_0: lov,
                south_pole,
                radius,
            },
            GridTemplate::LambertConformal {
                lat_d,
                lov,
                latin1,
                latin2,
                ..
            } => ProjectionParams::LambertConformal {
                lat_0: lat_d,
                lon_0: lov,
                lat_1: latin1,
                lat_2: latin2,
                radius,
            },
            GridTemplate::Unsupported(template) => {
                return Err(Grib2Error::UnsupportedTemplate {
                    section: 3,
                    template,
                })
            }
        };
        Ok(params)
    }
}

fn degrees(b: &[u8]) -> f64 {
    read_signed_u32(b) as f64 * MICRODEGREES
}

fn metres(b: &[u8]) -> f64 {
    read_u32(b) as f64 * MILLIMETRES
}

fn require(gd: &[u8], len: usize, template: u16) -> Result<(), Grib2Error> {
    if gd.len() < len {
        return Err(Grib2Error::InvalidSection {
            section: 3,
            reason: format!(
                "Template {} needs at least {} bytes, got {}",
                template,
                len,
                gd.len()
            ),
        });
    }
    Ok(())
}

pub(super) fn parse(section: &[u8]) -> Result<GridDefinition, Grib2Error> {
    if section.len() < 14 {
        return Err(Grib2Error::InvalidSection {
            section: 3,
            reason: "Not enough data".to_string(),
        });
    }

    // Bytes 6-9: number of data points, 12-13: template number
    let num_data_points = read_u32(&section[6..10]);
    let template_number = u16::from_be_bytes([section[12], section[13]]);

    // Template data starts at byte 14. The first 16 bytes describe the
    // shape of the earth in every template handled here, followed by
    // the x and y point counts and the first grid point.
    let gd = &section[14..];
    require(gd, 33, template_number)?;

    let earth = EarthShape {
        shape: gd[0],
        radius_scale_factor: gd[1],
        radius_scaled_value: read_u32(&gd[2..6]),
    };
    let ni = read_u32(&gd[16..20]);
    let nj = read_u32(&gd[20..24]);
    let first_lat = degrees(&gd[24..28]);
    let first_lon = degrees(&gd[28..32]);

    let (template, scanning_mode) = match template_number {
        10 => {
            // 33-36 LaD, 37-40 La2, 41-44 Lo2, 45 scanning mode,
            // 46-49 orientation, 50-53 Di, 54-57 Dj
            require(gd, 58, template_number)?;
            let template = GridTemplate::Mercator {
                lat_d: degrees(&gd[33..37]),
                last_lat: degrees(&gd[37..41]),
                last_lon: degrees(&gd[41..45]),
                di: metres(&gd[50..54]),
                dj: metres(&gd[54..58]),
            };
            (template, gd[45])
        }
        20 => {
            // 33-36 LaD, 37-40 LoV, 41-44 Dx, 45-48 Dy,
            // 49 projection centre flag, 50 scanning mode
            require(gd, 51, template_number)?;
            let template = GridTemplate::PolarStereographic {
                lat_d: degrees(&gd[33..37]),
                lov: degrees(&gd[37..41]),
                dx: metres(&gd[41..45]),
                dy: metres(&gd[45..49]),
                south_pole: gd[49] & 0x80 != 0,
            };
            (template, gd[50])
        }
        30 => {
            // Same as 3.20 up to the scanning mode, then
            // 51-54 Latin1, 55-58 Latin2
            require(gd, 59, template_number)?;
            let template = GridTemplate::LambertConformal {
                lat_d: degrees(&gd[33..37]),
                lov: degrees(&gd[37..41]),
                dx: metres(&gd[41..45]),
                dy: metres(&gd[45..49]),
                latin1: degrees(&gd[51..55]),
                latin2: degrees(&gd[55..59]),
            };
            (template, gd[50])
        }
        other => {
            tracing::debug!(template = other, "Grid template kept without projection");
            (GridTemplate::Unsupported(other), 0)
        }
    };

    Ok(GridDefinition {
        template_number,
        num_data_points,
        ni,
        nj,
        earth,
        first_lat,
        first_lon,
        scanning_mode,
        template,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(template: GridTemplate) -> GridDefinition {
        GridDefinition {
            template_number: 10,
            num_data_points: 4,
            ni: 2,
            nj: 2,
            earth: EarthShape {
                shape: 1,
                radius_scale_factor: 0,
                radius_scaled_value: 6_371_200,
            },
            first_lat: 12.35,
            first_lon: 143.69,
            scanning_mode: 0x40,
            template,
        }
    }

    #[test]
    fn test_earth_radius() {
        let earth = EarthShape {
            shape: 1,
            radius_scale_factor: 1,
            radius_scaled_value: 63_712_000,
        };
        assert_eq!(earth.radius().unwrap(), 6_371_200.0);
        let earth = EarthShape {
            shape: 6,
            radius_scale_factor: 0,
            radius_scaled_value: 0,
        };
        assert_eq!(earth.radius().unwrap(), 6_371_229.0);
        let earth = EarthShape {
            shape: 5,
            radius_scale_factor: 0,
            radius_scaled_value: 0,
        };
        assert!(earth.radius().is_err());
    }

    #[test]
    fn test_mercator_central_meridian() {
        let g = grid(GridTemplate::Mercator {
            lat_d: 20.0,
            last_lat: 16.79,
            last_lon: 146.83,
            di: 2500.0,
            dj: 2500.0,
        });
        match g.projection_params().unwrap() {
            ProjectionParams::Mercator { lat_ts, lon_0, radius } => {
                assert_eq!(lat_ts, 20.0);
                assert!((lon_0 - 145.26).abs() < 1e-9);
                assert_eq!(radius, 6_371_200.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(g.spacing().di, Some(2500.0));
        assert_eq!(g.spacing().dx, None);
    }

    #[test]
    fn test_mercator_across_dateline() {
        let mut g = grid(GridTemplate::Mercator {
            lat_d: 20.0,
            last_lat: 30.0,
            last_lon: -170.0,
            di: 10000.0,
            dj: 10000.0,
        });
        g.first_lon = 170.0;
        match g.projection_params().unwrap() {
            ProjectionParams::Mercator { lon_0, .. } => assert!((lon_0 - 180.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_template_has_no_projection() {
        let g = grid(GridTemplate::Unsupported(0));
        assert!(matches!(
            g.projection_params(),
            Err(Grib2Error::UnsupportedTemplate { section: 3, template: 0 })
        ));
        assert_eq!(g.spacing(), GridSpacing::default());
    }
}
