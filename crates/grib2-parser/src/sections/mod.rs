//! GRIB2 section parsing.
//!
//! This module handles parsing of individual GRIB2 message sections.
//! Each GRIB2 message consists of multiple sections containing
//! metadata, grid information, and compressed data.

mod grid;

pub use grid::{EarthShape, GridDefinition, GridSpacing, GridTemplate};

use crate::Grib2Error;
use bytes::Bytes;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Section 0: Indicator Section (16 bytes)
#[derive(Debug, Clone)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub message_length: u64,
}

/// Section 1: Identification Section
#[derive(Debug, Clone)]
pub struct Identification {
    pub center: u16,
    pub sub_center: u16,
    pub table_version: u8,
    pub local_table_version: u8,
    pub significance_of_reference_time: u8,
    pub reference_time: DateTime<Utc>,
    pub production_status: u8,
    pub data_type: u8,
}

/// Section 4: Product Definition Section
#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub template: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
    /// Indicator of unit of time range (Code Table 4.4)
    pub time_unit: u8,
    /// Forecast time in `time_unit` units
    pub forecast_time: u32,
}

impl ProductDefinition {
    /// Forecast offset from the reference time.
    pub fn forecast_offset(&self) -> Result<Duration, Grib2Error> {
        let t = self.forecast_time as i64;
        let offset = match self.time_unit {
            0 => Duration::minutes(t),
            1 => Duration::hours(t),
            2 => Duration::days(t),
            10 => Duration::hours(3 * t),
            11 => Duration::hours(6 * t),
            12 => Duration::hours(12 * t),
            13 => Duration::seconds(t),
            unit => {
                return Err(Grib2Error::InvalidSection {
                    section: 4,
                    reason: format!("Unsupported time range unit {}", unit),
                })
            }
        };
        Ok(offset)
    }

    /// Whether the product is a probability forecast (templates 4.5 / 4.9).
    pub fn is_probability(&self) -> bool {
        matches!(self.template, 5 | 9)
    }
}

/// Section 5: Data Representation Section
#[derive(Debug, Clone)]
pub struct DataRepresentation {
    pub num_data_points: u32,
    pub template: u16,
    pub reference_value: f32,
    pub binary_scale_factor: i16,
    pub decimal_scale_factor: i16,
    pub bits_per_value: u8,
    /// Type of original field values (0 = float, 1 = integer)
    pub original_data_type: u8,
    /// Missing value management for complex packing (templates 5.2 / 5.3)
    pub missing_value_management: u8,
    /// Primary missing value substitute, when missing values are managed
    pub primary_missing_value: Option<f64>,
}

/// Section 6: Bitmap Section
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub indicator: u8,
    pub data: Bytes,
}

/// Section 7: Data Section
#[derive(Debug, Clone)]
pub struct DataSection {
    pub data: Bytes,
}

// ===== Parsing Functions =====

/// Parse Section 0 (Indicator) from start of message
pub fn parse_indicator(data: &[u8]) -> Result<Indicator, Grib2Error> {
    if data.len() < 16 {
        return Err(Grib2Error::InvalidFormat(
            "Not enough data for indicator section".to_string(),
        ));
    }

    if &data[0..4] != b"GRIB" {
        return Err(Grib2Error::InvalidFormat(
            "Invalid GRIB magic bytes".to_string(),
        ));
    }

    // Octets 1-4: "GRIB", 5-6: reserved, 7: discipline, 8: edition,
    // 9-16: total message length
    let discipline = data[6];
    let edition = data[7];
    let message_length = read_u64(&data[8..16]);

    if edition != 2 {
        return Err(Grib2Error::InvalidFormat(format!(
            "Expected GRIB edition 2, got {}",
            edition
        )));
    }

    Ok(Indicator {
        discipline,
        edition,
        message_length,
    })
}

/// Parse Section 1 (Identification)
pub fn parse_identification(data: &[u8]) -> Result<Identification, Grib2Error> {
    let section = section_slice(data, 1)?;
    if section.len() < 21 {
        return Err(Grib2Error::InvalidSection {
            section: 1,
            reason: format!("Expected at least 21 bytes, got {}", section.len()),
        });
    }

    let year = read_u16(&section[12..14]);
    let (month, day, hour, minute, second) =
        (section[14], section[15], section[16], section[17], section[18]);

    let reference_time = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or_else(|| Grib2Error::InvalidSection {
            section: 1,
            reason: format!(
                "Invalid date: {}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
        })?;

    Ok(Identification {
        center: read_u16(&section[5..7]),
        sub_center: read_u16(&section[7..9]),
        table_version: section[9],
        local_table_version: section[10],
        significance_of_reference_time: section[11],
        reference_time: DateTime::<Utc>::from_naive_utc_and_offset(reference_time, Utc),
        production_status: section[19],
        data_type: section[20],
    })
}

/// Parse Section 2 (Local Use), if the message carries one.
pub fn parse_local_use(data: &[u8]) -> Result<Option<Bytes>, Grib2Error> {
    match find_section(data, 2) {
        Ok(offset) => {
            let section = section_at(data, offset)?;
            Ok(Some(Bytes::copy_from_slice(&section[5..])))
        }
        Err(Grib2Error::InvalidSection { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parse Section 3 (Grid Definition)
pub fn parse_grid_definition(data: &[u8]) -> Result<GridDefinition, Grib2Error> {
    let section = section_slice(data, 3)?;
    grid::parse(section)
}

/// Parse Section 4 (Product Definition)
pub fn parse_product_definition(data: &[u8]) -> Result<ProductDefinition, Grib2Error> {
    let section = section_slice(data, 4)?;

    if section.len() < 22 {
        return Err(Grib2Error::InvalidSection {
            section: 4,
            reason: format!("Expected at least 22 bytes, got {}", section.len()),
        });
    }

    // Octets 10-22 share one layout across templates 4.0 - 4.15:
    // category, number, process ids, cutoff, time unit, forecast time
    Ok(ProductDefinition {
        template: read_u16(&section[7..9]),
        parameter_category: section[9],
        parameter_number: section[10],
        time_unit: section[17],
        forecast_time: read_u32(&section[18..22]),
    })
}

/// Parse Section 5 (Data Representation)
pub fn parse_data_representation(data: &[u8]) -> Result<DataRepresentation, Grib2Error> {
    let section = section_slice(data, 5)?;

    if section.len() < 21 {
        return Err(Grib2Error::InvalidSection {
            section: 5,
            reason: format!("Expected at least 21 bytes, got {}", section.len()),
        });
    }

    // Octets 12-21 are common to templates 5.0, 5.2, 5.3, 5.40 and 5.41:
    // reference value (IEEE float), binary scale (E), decimal scale (D),
    // bits per value, type of original field values
    let template = read_u16(&section[9..11]);
    let original_data_type = section[20];

    let (missing_value_management, primary_missing_value) =
        if matches!(template, 2 | 3) && section.len() >= 27 {
            let management = section[22];
            let raw = &section[23..27];
            let substitute = if original_data_type == 0 {
                f32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64
            } else {
                read_u32(raw) as f64
            };
            (management, (management != 0).then_some(substitute))
        } else {
            (0, None)
        };

    Ok(DataRepresentation {
        num_data_points: read_u32(&section[5..9]),
        template,
        reference_value: f32::from_be_bytes([section[11], section[12], section[13], section[14]]),
        binary_scale_factor: read_signed_u16(&section[15..17]),
        decimal_scale_factor: read_signed_u16(&section[17..19]),
        bits_per_value: section[19],
        original_data_type,
        missing_value_management,
        primary_missing_value,
    })
}

/// Parse Section 6 (Bitmap)
///
/// Returns `None` when the indicator says no bitmap applies.
pub fn parse_bitmap(data: &[u8]) -> Result<Option<Bitmap>, Grib2Error> {
    let section = section_slice(data, 6)?;

    if section.len() < 6 {
        return Err(Grib2Error::InvalidSection {
            section: 6,
            reason: "Not enough data".to_string(),
        });
    }

    match section[5] {
        255 => Ok(None),
        0 => Ok(Some(Bitmap {
            indicator: 0,
            data: Bytes::copy_from_slice(&section[6..]),
        })),
        indicator => Err(Grib2Error::InvalidSection {
            section: 6,
            reason: format!("Unsupported bitmap indicator {}", indicator),
        }),
    }
}

/// Parse Section 7 (Data)
pub fn parse_data_section(data: &[u8]) -> Result<DataSection, Grib2Error> {
    let section = section_slice(data, 7)?;
    Ok(DataSection {
        data: Bytes::copy_from_slice(&section[5..]),
    })
}

// ===== Helper Functions =====

/// Find a section by number within a message
pub(crate) fn find_section(data: &[u8], section_num: u8) -> Result<usize, Grib2Error> {
    let mut offset = 16; // After Section 0

    loop {
        if offset + 4 <= data.len() && &data[offset..offset + 4] == b"7777" {
            return Err(Grib2Error::InvalidSection {
                section: section_num,
                reason: "Reached end of message without finding section".to_string(),
            });
        }

        if offset + 5 > data.len() {
            return Err(Grib2Error::InvalidSection {
                section: section_num,
                reason: "Section not found".to_string(),
            });
        }

        let section_length = read_u32(&data[offset..offset + 4]) as usize;

        if section_length < 5 || offset + section_length > data.len() {
            return Err(Grib2Error::InvalidFormat(format!(
                "Invalid section length {} at offset {}",
                section_length, offset
            )));
        }

        if data[offset + 4] == section_num {
            return Ok(offset);
        }

        offset += section_length;
    }
}

fn section_at(data: &[u8], offset: usize) -> Result<&[u8], Grib2Error> {
    let length = read_u32(&data[offset..offset + 4]) as usize;
    data.get(offset..offset + length)
        .ok_or_else(|| Grib2Error::InvalidFormat(format!("Truncated section at offset {}", offset)))
}

fn section_slice(data: &[u8], section_num: u8) -> Result<&[u8], Grib2Error> {
    let offset = find_section(data, section_num)?;
    section_at(data, offset)
}

pub(crate) fn read_u16(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

pub(crate) fn read_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn read_u64(b: &[u8]) -> u64 {
    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// GRIB2 signed integers are sign-magnitude: the top bit is the sign.
pub(crate) fn read_signed_u16(b: &[u8]) -> i16 {
    let raw = read_u16(b);
    let magnitude = (raw & 0x7FFF) as i16;
    if raw & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

pub(crate) fn read_signed_u32(b: &[u8]) -> i32 {
    let raw = read_u32(b);
    let magnitude = (raw & 0x7FFF_FFFF) as i32;
    if raw & 0x8000_0000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}
