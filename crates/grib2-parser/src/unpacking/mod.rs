//! GRIB2 data unpacking algorithms.
//!
//! - Simple packing (template 5.0) is decoded here.
//! - Complex packing, JPEG2000 and PNG (templates 5.2, 5.3, 5.40, 5.41),
//!   which NDFD uses for most elements, are delegated to the `grib` crate.

use std::io::Cursor;

use crate::Grib2Error;

/// Unpack simple packed GRIB2 data
///
/// Simple packing:
/// `value = (reference_value + packed_value * 2^binary_scale) * 10^(-decimal_scale)`
///
/// With a bitmap, points whose bit is 0 are `None` and consume no packed bits.
pub fn unpack_simple(
    packed_data: &[u8],
    num_points: u32,
    bits_per_value: u8,
    reference_value: f32,
    binary_scale_factor: i16,
    decimal_scale_factor: i16,
    bitmap: Option<&[u8]>,
) -> Result<Vec<Option<f32>>, Grib2Error> {
    let binary_scale = 2.0_f64.powi(binary_scale_factor as i32);
    let decimal_scale = 10.0_f64.powi(-(decimal_scale_factor as i32));
    let reference_value = reference_value as f64;

    let mut values = Vec::with_capacity(num_points as usize);
    let mut bit_position = 0;
    let bits_per_value = bits_per_value as usize;

    for i in 0..(num_points as usize) {
        // Bitmap: 1 bit per data point, 1 = value present, 0 = missing
        let has_value = match bitmap {
            Some(bm) => {
                let byte_idx = i / 8;
                let bit_idx = 7 - (i % 8);
                byte_idx >= bm.len() || (bm[byte_idx] >> bit_idx) & 1 == 1
            }
            None => true,
        };

        if !has_value {
            values.push(None);
            continue;
        }

        if bits_per_value == 0 {
            // All present values are the reference value
            values.push(Some((reference_value * decimal_scale) as f32));
            continue;
        }

        let packed_value = extract_bits(packed_data, bit_position, bits_per_value)
            .map_err(|e| Grib2Error::UnpackingError(format!("Failed to extract bits: {}", e)))?;
        bit_position += bits_per_value;

        let value = (reference_value + packed_value as f64 * binary_scale) * decimal_scale;
        values.push(Some(value as f32));
    }

    Ok(values)
}

/// Decode every value of a single-field message with the `grib` crate.
///
/// Missing points come back as NaN.
pub fn unpack_with_grib_crate(message: &[u8]) -> Result<Vec<f32>, Grib2Error> {
    let grib_file = grib::from_reader(Cursor::new(message))
        .map_err(|e| Grib2Error::UnpackingError(format!("{:?}", e)))?;

    let (_, submessage) = grib_file
        .iter()
        .next()
        .ok_or_else(|| Grib2Error::UnpackingError("Message has no fields".to_string()))?;

    let decoder = grib::Grib2SubmessageDecoder::from(submessage)
        .map_err(|e| Grib2Error::UnpackingError(e.to_string()))?;
    let values = decoder
        .dispatch()
        .map_err(|e| Grib2Error::UnpackingError(e.to_string()))?
        .collect();

    Ok(values)
}

/// Extract bits from a byte array
/// Returns the bits as a 32-bit unsigned integer
fn extract_bits(data: &[u8], start_bit: usize, num_bits: usize) -> Result<u32, String> {
    if num_bits > 32 || num_bits == 0 {
        return Err(format!("Invalid number of bits: {}", num_bits));
    }

    let mut result = 0u32;

    for i in 0..num_bits {
        let absolute_bit = start_bit + i;
        let byte_idx = absolute_bit / 8;
        let bit_idx = 7 - (absolute_bit % 8); // MSB first

        if byte_idx >= data.len() {
            return Err("Not enough data to extract bits".to_string());
        }

        let bit = (data[byte_idx] >> bit_idx) & 1;
        result = (result << 1) | (bit as u32);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bits() {
        // Test with simple byte: 0b10110101
        let data = vec![0b10110101];

        // Extract first 2 bits (should be 0b10 = 2)
        let result = extract_bits(&data, 0, 2).unwrap();
        assert_eq!(result, 0b10);

        // Extract bits 2-4 (should be 0b11 = 3)
        let result = extract_bits(&data, 2, 2).unwrap();
        assert_eq!(result, 0b11);

        // Extract all 8 bits
        let result = extract_bits(&data, 0, 8).unwrap();
        assert_eq!(result, 0b10110101);
    }

    #[test]
    fn test_simple_unpacking() {
        let packed = vec![100, 200];
        let values = unpack_simple(&packed, 2, 8, 0.0, 0, 0, None).unwrap();
        assert_eq!(values, vec![Some(100.0), Some(200.0)]);
    }

    #[test]
    fn test_scaled_unpacking() {
        // (300 + 4 * 2^-1) / 10 = 30.2
        let packed = vec![4];
        let values = unpack_simple(&packed, 1, 8, 300.0, -1, 1, None).unwrap();
        assert!((values[0].unwrap() - 30.2).abs() < 1e-5);
    }

    #[test]
    fn test_bitmap_skips_packed_bits() {
        // Points 0 and 2 present, point 1 missing
        let bitmap = vec![0b1010_0000];
        let packed = vec![7, 9];
        let values = unpack_simple(&packed, 3, 8, 0.0, 0, 0, Some(&bitmap)).unwrap();
        assert_eq!(values, vec![Some(7.0), None, Some(9.0)]);
    }

    #[test]
    fn test_constant_field() {
        let values = unpack_simple(&[], 3, 0, 288.5, 0, 0, None).unwrap();
        assert_eq!(values, vec![Some(288.5); 3]);
    }

    #[test]
    fn test_truncated_data() {
        let result = unpack_simple(&[1], 2, 8, 0.0, 0, 0, None);
        assert!(matches!(result, Err(Grib2Error::UnpackingError(_))));
    }
}
