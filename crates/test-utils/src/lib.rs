//! Test support for the NDFD workspace crates.
//!
//! Synthetic GRIB2 messages come from [`Grib2Builder`]; [`fixtures`] places
//! well-known points on exact grid cells and writes source trees. Real
//! samples are optional and found through [`find_test_file`].

pub mod builder;
pub mod codes;
pub mod fixtures;
pub mod generators;
pub mod paths;

pub use builder::{Grib2Builder, GridLayout};
pub use codes::pack_codes;
pub use generators::*;
pub use paths::find_test_file;

/// Path of an optional sample, or return from the test when it is absent.
///
/// ```ignore
/// let path = test_utils::require_test_file!("ds.wx.bin");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("skipping: sample '{}' not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    };
}

/// `|left - right| <= epsilon`, compared as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        assert!(
            (left - right).abs() <= epsilon,
            "{} differs from {} by more than {}",
            left,
            right,
            epsilon
        );
    }};
}

/// Both components of a `(lat, lon)` pair within `epsilon` degrees.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let (actual, expected): ((f64, f64), (f64, f64)) = ($actual, $expected);
        $crate::assert_approx_eq!(actual.0, expected.0, $epsilon);
        $crate::assert_approx_eq!(actual.1, expected.1, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_within_epsilon() {
        assert_approx_eq!(271.15_f32, 271.15, 1e-4);
        assert_approx_eq!(-5.5, -5.500001, 1e-4);
    }

    #[test]
    #[should_panic(expected = "differs from")]
    fn test_approx_outside_epsilon() {
        assert_approx_eq!(2539.703, 2500.0, 1.0);
    }

    #[test]
    fn test_coords_within_epsilon() {
        assert_coords_approx_eq!((39.04831, -95.67799), (39.0483, -95.6780), 1e-4);
    }
}
