//! Ellipsoidal geodesics (Vincenty's inverse and direct formulae).
//!
//! Distances are in metres, angles in degrees. Azimuths are clockwise from
//! north in (-180, 180].

use std::f64::consts::PI;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Semi-minor axis (meters)
    pub b: f64,
}

impl Ellipsoid {
    /// Clarke 1866, used for grid-point and region distances.
    pub const CLARKE_1866: Ellipsoid = Ellipsoid {
        a: 6_378_206.4,
        b: 6_356_583.8,
    };

    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        b: 6_356_752.314_245,
    };

    pub fn flattening(&self) -> f64 {
        (self.a - self.b) / self.a
    }
}

/// Result of an inverse geodesic computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSolution {
    /// Azimuth at the first point towards the second.
    pub azimuth_fwd: f64,
    /// Azimuth at the second point back towards the first.
    pub azimuth_back: f64,
    pub distance: f64,
}

/// Result of a direct geodesic computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectSolution {
    pub lat: f64,
    pub lon: f64,
    /// Azimuth at the destination back towards the start.
    pub azimuth_back: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Geodesic {
    ellipsoid: Ellipsoid,
}

impl Default for Geodesic {
    fn default() -> Self {
        Self::new(Ellipsoid::CLARKE_1866)
    }
}

impl Geodesic {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Distance between two points in metres.
    pub fn distance(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        self.inverse(lat1, lon1, lat2, lon2).distance
    }

    /// Solve the inverse problem between two points.
    ///
    /// Nearly antipodal points may not converge; the last iterate is
    /// returned in that case.
    pub fn inverse(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> InverseSolution {
        let Ellipsoid { a, b } = self.ellipsoid;
        let f = self.ellipsoid.flattening();

        let l = normalize_rad((lon2 - lon1).to_radians());
        let u1 = ((1.0 - f) * lat1.to_radians().tan()).atan();
        let u2 = ((1.0 - f) * lat2.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut sin_sigma = 0.0;
        let mut cos_sigma = 1.0;
        let mut sigma = 0.0;
        let mut cos_sq_alpha = 1.0;
        let mut cos_2sigma_m = 0.0;

        for _ in 0..MAX_ITERATIONS {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let t1 = cos_u2 * sin_lambda;
            let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
            sin_sigma = t1.hypot(t2);
            if sin_sigma == 0.0 {
                // Coincident points
                return InverseSolution {
                    azimuth_fwd: 0.0,
                    azimuth_back: 180.0,
                    distance: 0.0,
                };
            }
            cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            cos_2sigma_m = if cos_sq_alpha != 0.0 {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            } else {
                // Equatorial line
                0.0
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let prev = lambda;
            let inner = cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m);
            lambda = l + (1.0 - c) * f * sin_alpha * (sigma + c * sin_sigma * inner);
            if (lambda - prev).abs() < CONVERGENCE {
                break;
            }
        }

        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let (big_a, big_b) = series_coefficients(u_sq);
        let delta_sigma = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
        let distance = b * big_a * (sigma - delta_sigma);

        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let alpha1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
        let alpha2 = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

        InverseSolution {
            azimuth_fwd: normalize_deg(alpha1.to_degrees()),
            azimuth_back: normalize_deg(alpha2.to_degrees() + 180.0),
            distance,
        }
    }

    /// Solve the direct problem: travel `distance` metres from a point along
    /// `azimuth`.
    pub fn direct(&self, lat: f64, lon: f64, azimuth: f64, distance: f64) -> DirectSolution {
        let Ellipsoid { a, b } = self.ellipsoid;
        let f = self.ellipsoid.flattening();

        let alpha1 = azimuth.to_radians();
        let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();
        let tan_u1 = (1.0 - f) * lat.to_radians().tan();
        let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
        let sin_u1 = tan_u1 * cos_u1;

        let sigma1 = tan_u1.atan2(cos_alpha1);
        let sin_alpha = cos_u1 * sin_alpha1;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let (big_a, big_b) = series_coefficients(u_sq);

        let mut sigma = distance / (b * big_a);
        for _ in 0..MAX_ITERATIONS {
            let (sin_sigma, cos_sigma) = sigma.sin_cos();
            let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
            let prev = sigma;
            sigma = distance / (b * big_a) + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
            if (sigma - prev).abs() < CONVERGENCE {
                break;
            }
        }
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();

        let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
        let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
            .atan2((1.0 - f) * sin_alpha.hypot(tmp));
        let lambda = (sin_sigma * sin_alpha1)
            .atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let inner = cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m);
        let l = lambda - (1.0 - c) * f * sin_alpha * (sigma + c * sin_sigma * inner);
        let lon2 = normalize_rad(lon.to_radians() + l);
        let alpha2 = sin_alpha.atan2(-tmp);

        DirectSolution {
            lat: lat2.to_degrees(),
            lon: lon2.to_degrees(),
            azimuth_back: normalize_deg(alpha2.to_degrees() + 180.0),
        }
    }
}

fn series_coefficients(u_sq: f64) -> (f64, f64) {
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (big_a, big_b)
}

fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let c2 = cos_2sigma_m * cos_2sigma_m;
    let sin_sq = sin_sigma * sin_sigma;
    let tail = big_b / 6.0 * cos_2sigma_m * (-3.0 + 4.0 * sin_sq) * (-3.0 + 4.0 * c2);
    big_b * sin_sigma * (cos_2sigma_m + big_b / 4.0 * (cos_sigma * (-1.0 + 2.0 * c2) - tail))
}

fn normalize_rad(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

fn normalize_deg(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coincident_points() {
        let g = Geodesic::default();
        assert_eq!(g.distance(13.44, 144.79, 13.44, 144.79), 0.0);
    }

    #[test]
    fn test_equator_degree_is_semi_major_arc() {
        let g = Geodesic::default();
        let d = g.distance(0.0, 0.0, 0.0, 1.0);
        let expected = Ellipsoid::CLARKE_1866.a * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-3, "{} vs {}", d, expected);
    }

    #[test]
    fn test_meridian_azimuths() {
        let g = Geodesic::default();
        let inv = g.inverse(10.0, 20.0, 11.0, 20.0);
        assert!(inv.azimuth_fwd.abs() < 1e-9);
        assert!((inv.azimuth_back.abs() - 180.0).abs() < 1e-9);
        // One degree of latitude near 10N on Clarke 1866 is about 110.6 km
        assert!((inv.distance - 110_600.0).abs() < 500.0, "{}", inv.distance);
    }

    #[test]
    fn test_symmetry() {
        let g = Geodesic::default();
        let d1 = g.distance(39.74, -104.99, 13.44, 144.79);
        let d2 = g.distance(13.44, 144.79, 39.74, -104.99);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn test_direct_inverts_inverse() {
        let g = Geodesic::default();
        let inv = g.inverse(19.8968, 155.5828, 13.432, 144.767);
        let dest = g.direct(19.8968, 155.5828, inv.azimuth_fwd, inv.distance);
        assert!((dest.lat - 13.432).abs() < 1e-8, "{}", dest.lat);
        assert!((dest.lon - 144.767).abs() < 1e-8, "{}", dest.lon);
        assert!((dest.azimuth_back - inv.azimuth_back).abs() < 1e-6);
    }

    #[test]
    fn test_crosses_dateline() {
        let g = Geodesic::default();
        let d = g.distance(0.0, 179.5, 0.0, -179.5);
        let expected = Ellipsoid::CLARKE_1866.a * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-3);
    }
}
