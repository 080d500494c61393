//! Region selection and query argument checks.

use ndfd_common::{NdfdError, NdfdResult};
use ndfd_tables::{find_region, Region, REGIONS};
use projection::Geodesic;

/// Region consulted first; a later region must be strictly closer to win.
const SEED_REGION: &str = "neast";

/// Name of the non-aggregate region whose centre is geodesically nearest
/// to (`lat`, `lon`).
pub fn nearest_region(lat: f64, lon: f64) -> &'static str {
    let geodesic = Geodesic::default();
    let distance_to = |r: &Region| geodesic.distance(lat, lon, r.center_lat, r.center_lon);

    let mut best = SEED_REGION;
    let mut best_distance = find_region(SEED_REGION).map_or(f64::INFINITY, distance_to);

    for region in REGIONS.iter().filter(|r| !r.super_region) {
        let distance = distance_to(region);
        if distance < best_distance {
            best = region.name;
            best_distance = distance;
        }
    }
    best
}

/// Check a query against the region tables.
///
/// Checked in order: time step, region, then whether the region publishes
/// the variable.
pub fn validate_arguments(
    variable: &str,
    region: &str,
    time_step_hours: u32,
) -> NdfdResult<&'static Region> {
    if time_step_hours < 1 {
        return Err(NdfdError::InvalidTimeStep(time_step_hours));
    }
    let area = find_region(region).ok_or_else(|| NdfdError::InvalidRegion(region.to_string()))?;
    if !area.publishes(variable) {
        return Err(NdfdError::InvalidVariable {
            variable: variable.to_string(),
            region: region.to_string(),
        });
    }
    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::points;

    #[test]
    fn test_nearest_region() {
        assert_eq!(nearest_region(points::TOPEKA.0, points::TOPEKA.1), "crplains");
        assert_eq!(nearest_region(points::HAGATNA.0, points::HAGATNA.1), "guam");
        assert_eq!(nearest_region(points::ANCHORAGE.0, points::ANCHORAGE.1), "alaska");
        assert_eq!(
            nearest_region(points::MAUNA_KEA_EAST.0, points::MAUNA_KEA_EAST.1),
            "guam"
        );
    }

    #[test]
    fn test_super_regions_never_chosen() {
        // Centre of the conus aggregate still resolves to a sector
        let region = nearest_region(38.229, -95.438);
        assert_ne!(region, "conus");
        assert!(!find_region(region).unwrap().super_region);
    }

    #[test]
    fn test_validate_order() {
        assert!(matches!(
            validate_arguments("nope", "atlantis", 0),
            Err(NdfdError::InvalidTimeStep(0))
        ));
        assert!(matches!(
            validate_arguments("nope", "atlantis", 1),
            Err(NdfdError::InvalidRegion(_))
        ));
        assert!(matches!(
            validate_arguments("nope", "conus", 1),
            Err(NdfdError::InvalidVariable { .. })
        ));
        assert_eq!(validate_arguments("temp", "conus", 3).unwrap().name, "conus");
    }

    #[test]
    fn test_island_variables() {
        assert!(matches!(
            validate_arguments("snow", "hawaii", 1),
            Err(NdfdError::InvalidVariable { .. })
        ));
        assert!(validate_arguments("wx", "hawaii", 1).is_ok());
    }
}
