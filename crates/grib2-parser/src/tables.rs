//! GRIB2 parameter lookup tables.
//!
//! Translates (discipline, category, number) codes into short names and
//! units. [`Grib2Tables::ndfd`] covers the parameters NDFD publishes;
//! further entries can be added at runtime.

use std::collections::HashMap;

/// Lookup key for parameter: (discipline, category, number)
pub type ParamKey = (u8, u8, u8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub short_name: String,
    pub units: String,
}

/// GRIB2 parameter lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Grib2Tables {
    parameters: HashMap<ParamKey, ParameterInfo>,
}

impl Grib2Tables {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables pre-populated with the NDFD element codes.
    pub fn ndfd() -> Self {
        let mut tables = Self::new();
        for &(d, c, n, name, units) in NDFD_PARAMETERS {
            tables.add_parameter(d, c, n, name, units);
        }
        tables
    }

    /// Add a parameter mapping
    pub fn add_parameter(
        &mut self,
        discipline: u8,
        category: u8,
        number: u8,
        name: &str,
        units: &str,
    ) {
        self.parameters.insert(
            (discipline, category, number),
            ParameterInfo {
                short_name: name.to_string(),
                units: units.to_string(),
            },
        );
    }

    pub fn get(&self, discipline: u8, category: u8, number: u8) -> Option<&ParameterInfo> {
        self.parameters.get(&(discipline, category, number))
    }

    /// Look up parameter short name by GRIB2 codes.
    ///
    /// Returns "P{discipline}_{category}_{number}" if not found.
    pub fn get_parameter_name(&self, discipline: u8, category: u8, number: u8) -> String {
        self.get(discipline, category, number)
            .map(|p| p.short_name.clone())
            .unwrap_or_else(|| format!("P{}_{}_{}", discipline, category, number))
    }

    /// Look up parameter units, "unknown" if not found.
    pub fn get_units(&self, discipline: u8, category: u8, number: u8) -> String {
        self.get(discipline, category, number)
            .map(|p| p.units.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Get the number of parameters in the table
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

const NDFD_PARAMETERS: &[(u8, u8, u8, &str, &str)] = &[
    // Temperature
    (0, 0, 0, "TMP", "K"),
    (0, 0, 4, "TMAX", "K"),
    (0, 0, 5, "TMIN", "K"),
    (0, 0, 6, "DPT", "K"),
    (0, 0, 21, "APTMP", "K"),
    // Moisture
    (0, 1, 1, "RH", "%"),
    (0, 1, 8, "APCP", "kg m**-2"),
    (0, 1, 29, "ASNOW", "m"),
    (0, 1, 227, "FICEAC", "m"),
    (0, 1, 192, "WX", "code"),
    // Momentum
    (0, 2, 0, "WDIR", "degree true"),
    (0, 2, 1, "WIND", "m s**-1"),
    (0, 2, 22, "GUST", "m s**-1"),
    // Mass
    (0, 3, 5, "HGT", "gpm"),
    (0, 3, 6, "DIST", "m"),
    // Cloud
    (0, 6, 1, "TCDC", "%"),
    // Physical atmospheric properties
    (0, 19, 2, "TSTM", "%"),
    (0, 19, 217, "WWA", "code"),
    // Land surface
    (2, 0, 7, "MTERH", "m"),
    // Oceanographic
    (10, 0, 3, "HTSGW", "m"),
];
