//! GRIB2 parser implementation (WMO FM 92 GRIB Edition 2).
//!
//! Reads the single-field messages NDFD publishes: section metadata,
//! projected grid definitions and decoded values. Simple packing is
//! decoded in-crate, every other packing goes through the `grib` crate.

pub mod sections;
pub mod tables;
pub mod unpacking;

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use projection::ProjectionParams;
use thiserror::Error;

pub use sections::{
    Bitmap, DataRepresentation, DataSection, EarthShape, GridDefinition, GridSpacing,
    GridTemplate, Identification, Indicator, ProductDefinition,
};
pub use tables::{Grib2Tables, ParameterInfo};
pub use unpacking::{unpack_simple, unpack_with_grib_crate};

#[derive(Debug, Error)]
pub enum Grib2Error {
    #[error("Invalid GRIB2 format: {0}")]
    InvalidFormat(String),

    #[error("Invalid section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("Unsupported template {template} in section {section}")]
    UnsupportedTemplate { section: u8, template: u16 },

    #[error("Unpacking error: {0}")]
    UnpackingError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single parsed GRIB2 message.
#[derive(Debug, Clone)]
pub struct Grib2Message {
    pub indicator: Indicator,
    pub identification: Identification,
    /// Section 2 payload, without the section header
    pub local_use: Option<Bytes>,
    pub grid_definition: GridDefinition,
    pub product_definition: ProductDefinition,
    pub data_representation: DataRepresentation,
    pub bitmap: Option<Bitmap>,
    pub data_section: DataSection,
    pub raw_data: Bytes,
    parameter: String,
    units: String,
}

impl Grib2Message {
    /// Parse one complete message (`GRIB` through `7777`).
    pub fn parse(raw_data: Bytes, tables: &Grib2Tables) -> Result<Self, Grib2Error> {
        let data = raw_data.as_ref();
        let indicator = sections::parse_indicator(data)?;
        let identification = sections::parse_identification(data)?;
        let local_use = sections::parse_local_use(data)?;
        let grid_definition = sections::parse_grid_definition(data)?;
        let product_definition = sections::parse_product_definition(data)?;
        let data_representation = sections::parse_data_representation(data)?;
        let bitmap = sections::parse_bitmap(data)?;
        let data_section = sections::parse_data_section(data)?;

        let discipline = indicator.discipline;
        let category = product_definition.parameter_category;
        let number = product_definition.parameter_number;
        let parameter = tables.get_parameter_name(discipline, category, number);
        let units = if product_definition.is_probability() {
            "%".to_string()
        } else {
            tables.get_units(discipline, category, number)
        };

        Ok(Self {
            indicator,
            identification,
            local_use,
            grid_definition,
            product_definition,
            data_representation,
            bitmap,
            data_section,
            raw_data,
            parameter,
            units,
        })
    }

    /// Short parameter name, e.g. "APTMP".
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.identification.reference_time
    }

    /// Reference time truncated to the hour plus the forecast offset.
    pub fn valid_time(&self) -> Result<DateTime<Utc>, Grib2Error> {
        let reference = self.reference_time();
        let hour = reference.date_naive().and_time(NaiveTime::MIN)
            + Duration::hours(reference.hour() as i64);
        Ok(Utc.from_utc_datetime(&hour) + self.product_definition.forecast_offset()?)
    }

    /// Grid dimensions as (nj, ni).
    pub fn grid_dims(&self) -> (u32, u32) {
        (self.grid_definition.nj, self.grid_definition.ni)
    }

    /// Latitude and longitude of the first grid point.
    pub fn first_grid_point(&self) -> (f64, f64) {
        (self.grid_definition.first_lat, self.grid_definition.first_lon)
    }

    pub fn spacing(&self) -> GridSpacing {
        self.grid_definition.spacing()
    }

    pub fn projection_params(&self) -> Result<ProjectionParams, Grib2Error> {
        self.grid_definition.projection_params()
    }

    /// Substitute value that marks missing points, when one is declared.
    pub fn missing_value(&self) -> Option<f64> {
        self.data_representation.primary_missing_value
    }

    /// Decode the field values in scan order.
    ///
    /// Points masked by the bitmap are NaN.
    pub fn values(&self) -> Result<Vec<f32>, Grib2Error> {
        let values = match self.data_representation.template {
            0 => {
                let bitmap = self.bitmap.as_ref().map(|b| b.data.as_ref());
                unpack_simple(
                    &self.data_section.data,
                    self.grid_definition.num_data_points,
                    self.data_representation.bits_per_value,
                    self.data_representation.reference_value,
                    self.data_representation.binary_scale_factor,
                    self.data_representation.decimal_scale_factor,
                    bitmap,
                )?
                .into_iter()
                .map(|v| v.unwrap_or(f32::NAN))
                .collect()
            }
            template => {
                tracing::trace!(template, "Decoding packed field with grib crate");
                unpack_with_grib_crate(&self.raw_data)?
            }
        };

        let expected = self.grid_definition.num_data_points as usize;
        if values.len() != expected {
            return Err(Grib2Error::UnpackingError(format!(
                "Decoded {} values, grid declares {}",
                values.len(),
                expected
            )));
        }
        Ok(values)
    }
}

/// Sequential reader over the messages of a GRIB2 file.
pub struct Grib2Reader {
    data: Bytes,
    offset: usize,
    tables: Arc<Grib2Tables>,
}

impl Grib2Reader {
    pub fn new(data: Bytes, tables: Arc<Grib2Tables>) -> Self {
        Self {
            data,
            offset: 0,
            tables,
        }
    }

    /// Read a whole file into a reader.
    pub fn open(path: impl AsRef<Path>, tables: Arc<Grib2Tables>) -> Result<Self, Grib2Error> {
        let data = std::fs::read(path)?;
        Ok(Self::new(Bytes::from(data), tables))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Next message, or `None` once no further `GRIB` marker is found.
    pub fn next_message(&mut self) -> Result<Option<Grib2Message>, Grib2Error> {
        let remaining = &self.data[self.offset.min(self.data.len())..];
        let start = match remaining.windows(4).position(|w| w == b"GRIB") {
            Some(pos) => self.offset + pos,
            None => {
                self.offset = self.data.len();
                return Ok(None);
            }
        };

        let indicator = sections::parse_indicator(&self.data[start..])?;
        let length = usize::try_from(indicator.message_length)
            .map_err(|_| Grib2Error::InvalidFormat("Message length overflow".to_string()))?;
        let end = start
            .checked_add(length)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Grib2Error::InvalidFormat(format!(
                    "Message at offset {} declares {} bytes, file has {}",
                    start,
                    length,
                    self.data.len() - start
                ))
            })?;

        self.offset = end;
        let message = Grib2Message::parse(self.data.slice(start..end), &self.tables)?;
        Ok(Some(message))
    }

    /// All remaining messages.
    pub fn read_all(&mut self) -> Result<Vec<Grib2Message>, Grib2Error> {
        let mut messages = Vec::new();
        while let Some(message) = self.next_message()? {
            messages.push(message);
        }
        Ok(messages)
    }
}
