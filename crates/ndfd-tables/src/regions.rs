//! NDFD grid areas.

/// A sub-resolution (valid period) group and the variables it publishes.
#[derive(Debug, Clone, Copy)]
pub struct VariableGroup {
    /// Directory suffix, e.g. `001-003` for `VP.001-003`.
    pub period: &'static str,
    pub variables: &'static [&'static str],
}

impl VariableGroup {
    pub fn contains(&self, variable: &str) -> bool {
        self.variables.contains(&variable)
    }
}

/// A named NDFD grid area.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub name: &'static str,
    pub center_lat: f64,
    pub center_lon: f64,
    /// Aggregate areas that overlap smaller ones and are never chosen
    /// automatically.
    pub super_region: bool,
    /// Whether a static elevation grid exists.
    pub has_elevation: bool,
    pub groups: &'static [VariableGroup],
}

impl Region {
    /// Groups publishing `variable`, in declared order.
    pub fn groups_for<'a>(
        &'a self,
        variable: &'a str,
    ) -> impl Iterator<Item = &'a VariableGroup> + 'a {
        self.groups.iter().filter(move |g| g.contains(variable))
    }

    pub fn publishes(&self, variable: &str) -> bool {
        self.groups.iter().any(|g| g.contains(variable))
    }
}

/// Look up a region by name.
pub fn find_region(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.name == name)
}

const SHORT_RANGE: &[&str] = &[
    "apt", "conhazo", "critfireo", "dryfireo", "iceaccum", "maxrh", "maxt", "minrh", "mint",
    "phail", "pop12", "ptornado", "ptotsvrtstm", "ptotxsvrtstm", "ptstmwinds", "pxhail",
    "pxtornado", "pxtotsvrtstm", "pxtstmwinds", "qpf", "rhm", "sky", "snow", "tcwspdabv34c",
    "tcwspdabv34i", "tcwspdabv50c", "tcwspdabv50i", "tcwspdabv64c", "tcwspdabv64i", "td",
    "temp", "waveh", "wdir", "wgust", "wspd", "wwa", "wx",
];

const MEDIUM_RANGE: &[&str] = &[
    "apt", "conhazo", "critfireo", "dryfireo", "maxrh", "maxt", "minrh", "mint", "pop12",
    "qpf", "rhm", "sky", "snow", "tcwspdabv34c", "tcwspdabv34i", "tcwspdabv50c",
    "tcwspdabv50i", "tcwspdabv64c", "tcwspdabv64i", "td", "temp", "waveh", "wdir", "wgust",
    "wspd", "wwa", "wx",
];

const OUTLOOKS: &[&str] = &[
    "prcpabv14d", "prcpabv30d", "prcpabv90d", "prcpblw14d", "prcpblw30d", "prcpblw90d",
    "tmpabv14d", "tmpabv30d", "tmpabv90d", "tmpblw14d", "tmpblw30d", "tmpblw90d",
];

const ISLAND_SHORT_RANGE: &[&str] = &[
    "apt", "maxrh", "maxt", "minrh", "mint", "pop12", "qpf", "rhm", "sky", "tcwspdabv34c",
    "tcwspdabv34i", "tcwspdabv50c", "tcwspdabv50i", "tcwspdabv64c", "tcwspdabv64i", "td",
    "temp", "waveh", "wdir", "wgust", "wspd", "wwa", "wx",
];

const ISLAND_MEDIUM_RANGE: &[&str] = &[
    "apt", "maxrh", "maxt", "minrh", "mint", "pop12", "qpf", "rhm", "sky", "td", "temp",
    "waveh", "wdir", "wgust", "wspd", "wx",
];

const OCEAN: &[&str] = &["waveh", "wdir", "wgust", "wspd", "wwa", "wx"];

const NHEMI: &[&str] = &[
    "tcwspdabv34c",
    "tcwspdabv34i",
    "tcwspdabv50c",
    "tcwspdabv50i",
    "tcwspdabv64c",
    "tcwspdabv64i",
];

const fn group(period: &'static str, variables: &'static [&'static str]) -> VariableGroup {
    VariableGroup { period, variables }
}

const CONUS_GROUPS: &[VariableGroup] = &[
    group("001-003", SHORT_RANGE),
    group("004-007", MEDIUM_RANGE),
    group("008-450", OUTLOOKS),
];

const SECTOR_GROUPS: &[VariableGroup] = &[
    group("001-003", SHORT_RANGE),
    group("004-007", MEDIUM_RANGE),
];

const ISLAND_GROUPS: &[VariableGroup] = &[
    group("001-003", ISLAND_SHORT_RANGE),
    group("004-007", ISLAND_MEDIUM_RANGE),
];

const OCEAN_GROUPS: &[VariableGroup] = &[
    group("001-003", OCEAN),
    group("004-007", OCEAN),
];

const NHEMI_GROUPS: &[VariableGroup] = &[
    group("001-003", NHEMI),
    group("004-007", NHEMI),
];

macro_rules! sector {
    ($name:literal, $lat:expr, $lon:expr) => {
        Region {
            name: $name,
            center_lat: $lat,
            center_lon: $lon,
            super_region: false,
            has_elevation: true,
            groups: SECTOR_GROUPS,
        }
    };
}

/// All NDFD grid areas.
pub static REGIONS: &[Region] = &[
    Region {
        name: "conus",
        center_lat: 38.229,
        center_lon: -95.438,
        super_region: true,
        has_elevation: true,
        groups: CONUS_GROUPS,
    },
    Region {
        name: "alaska",
        center_lat: 60.885,
        center_lon: -151.012,
        super_region: false,
        has_elevation: true,
        groups: CONUS_GROUPS,
    },
    Region {
        name: "hawaii",
        center_lat: 20.586,
        center_lon: -157.464,
        super_region: false,
        has_elevation: true,
        groups: ISLAND_GROUPS,
    },
    Region {
        name: "guam",
        center_lat: 13.432,
        center_lon: 144.767,
        super_region: false,
        has_elevation: true,
        groups: ISLAND_GROUPS,
    },
    Region {
        name: "puertori",
        center_lat: 18.095,
        center_lon: -66.428,
        super_region: false,
        has_elevation: false,
        groups: ISLAND_GROUPS,
    },
    Region {
        name: "npacocn",
        center_lat: 29.361,
        center_lon: -171.962,
        super_region: true,
        has_elevation: true,
        groups: OCEAN_GROUPS,
    },
    Region {
        name: "nhemi",
        center_lat: 37.054,
        center_lon: -111.374,
        super_region: true,
        has_elevation: true,
        groups: NHEMI_GROUPS,
    },
    sector!("pacnwest", 45.436, -120.763),
    sector!("pacswest", 36.525, -119.340),
    sector!("nrockies", 45.130, -110.410),
    sector!("crrocks", 39.426, -108.564),
    sector!("srockies", 33.915, -108.660),
    sector!("nplains", 45.489, -100.475),
    sector!("crplains", 39.511, -99.398),
    sector!("splains", 31.943, -98.969),
    sector!("umissvly", 44.575, -92.571),
    sector!("crmissvy", 38.501, -90.541),
    sector!("smissvly", 32.630, -90.060),
    sector!("crgrlake", 43.483, -85.545),
    sector!("ergrlake", 42.465, -79.571),
    sector!("neast", 43.494, -72.104),
    sector!("seast", 30.283, -83.064),
    sector!("midatlan", 38.490, -77.503),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_region() {
        let guam = find_region("guam").unwrap();
        assert!(guam.publishes("apt"));
        assert!(!guam.publishes("tmpblw14d"));
        assert!(find_region("atlantis").is_none());
    }

    #[test]
    fn test_apt_published_in_two_conus_groups() {
        let conus = find_region("conus").unwrap();
        let periods: Vec<_> = conus.groups_for("apt").map(|g| g.period).collect();
        assert_eq!(periods, vec!["001-003", "004-007"]);
    }

    #[test]
    fn test_outlooks_only_in_long_range_group() {
        let alaska = find_region("alaska").unwrap();
        let periods: Vec<_> = alaska.groups_for("tmpblw14d").map(|g| g.period).collect();
        assert_eq!(periods, vec!["008-450"]);
    }

    #[test]
    fn test_region_flags() {
        assert!(!find_region("puertori").unwrap().has_elevation);
        let supers: Vec<_> = REGIONS.iter().filter(|r| r.super_region).map(|r| r.name).collect();
        assert_eq!(supers, vec!["conus", "npacocn", "nhemi"]);
    }

    #[test]
    fn test_region_names_unique() {
        for (i, a) in REGIONS.iter().enumerate() {
            for b in &REGIONS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
