//! Synthetic NDFD GRIB2 message builder.
//!
//! Creates small single-field messages on the projected grids NDFD uses
//! (templates 3.10, 3.20 and 3.30) with simple packing, an optional bitmap
//! for NaN values and an optional local use section.

/// Projection-specific part of the grid definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridLayout {
    /// Template 3.30
    Lambert {
        lat_d: f64,
        lov: f64,
        latin1: f64,
        latin2: f64,
        dx: f64,
        dy: f64,
    },
    /// Template 3.20
    Polar {
        lat_d: f64,
        lov: f64,
        dx: f64,
        dy: f64,
        south_pole: bool,
    },
    /// Template 3.10
    Mercator {
        lat_d: f64,
        last_lat: f64,
        last_lon: f64,
        di: f64,
        dj: f64,
    },
}

impl GridLayout {
    fn template_number(&self) -> u16 {
        match self {
            GridLayout::Mercator { .. } => 10,
            GridLayout::Polar { .. } => 20,
            GridLayout::Lambert { .. } => 30,
        }
    }
}

/// Build a single-field GRIB2 message.
#[derive(Debug, Clone)]
pub struct Grib2Builder {
    discipline: u8,
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    // Grid definition
    ni: u32,
    nj: u32,
    first_lat: f64,
    first_lon: f64,
    earth_radius: u32,
    layout: GridLayout,
    scanning_mode: u8,
    // Product definition
    product_template: u16,
    param_category: u8,
    param_number: u8,
    time_unit: u8,
    forecast_time: u32,
    // Section 2
    local_use: Option<Vec<u8>>,
    // Data
    data_values: Vec<f32>,
}

impl Grib2Builder {
    /// 5x5 apparent temperature grid on the NDFD CONUS Lambert projection.
    pub fn new_conus() -> Self {
        let ni = 5;
        let nj = 5;
        Self {
            discipline: 0,
            center: 8, // US NWS Telecommunications Gateway
            year: 2024,
            month: 3,
            day: 14,
            hour: 12,
            minute: 0,
            ni,
            nj,
            first_lat: 38.0,
            first_lon: 262.0,
            earth_radius: 6_371_200,
            layout: GridLayout::Lambert {
                lat_d: 25.0,
                lov: 265.0,
                latin1: 25.0,
                latin2: 25.0,
                dx: 2539.703,
                dy: 2539.703,
            },
            scanning_mode: 0b0100_0000, // +i, +j, i consecutive
            product_template: 0,
            param_category: 0,
            param_number: 21, // APTMP
            time_unit: 1,
            forecast_time: 0,
            local_use: None,
            data_values: vec![288.0; (ni * nj) as usize],
        }
    }

    pub fn with_reference_time(
        mut self,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
    ) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self.minute = minute;
        self
    }

    pub fn with_grid(mut self, ni: u32, nj: u32) -> Self {
        self.ni = ni;
        self.nj = nj;
        self.data_values = vec![0.0; (ni * nj) as usize];
        self
    }

    pub fn with_first_point(mut self, lat: f64, lon: f64) -> Self {
        self.first_lat = lat;
        self.first_lon = lon;
        self
    }

    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_earth_radius(mut self, radius: u32) -> Self {
        self.earth_radius = radius;
        self
    }

    pub fn with_parameter(mut self, discipline: u8, category: u8, number: u8) -> Self {
        self.discipline = discipline;
        self.param_category = category;
        self.param_number = number;
        self
    }

    pub fn with_product_template(mut self, template: u16) -> Self {
        self.product_template = template;
        self
    }

    pub fn with_forecast_hour(mut self, hour: u32) -> Self {
        self.time_unit = 1;
        self.forecast_time = hour;
        self
    }

    /// Forecast time in an arbitrary Code Table 4.4 unit.
    pub fn with_forecast_time(mut self, unit: u8, value: u32) -> Self {
        self.time_unit = unit;
        self.forecast_time = value;
        self
    }

    pub fn with_local_use(mut self, payload: Vec<u8>) -> Self {
        self.local_use = Some(payload);
        self
    }

    pub fn with_constant_value(mut self, value: f32) -> Self {
        self.data_values = vec![value; (self.ni * self.nj) as usize];
        self
    }

    pub fn with_gradient(mut self, min_val: f32, max_val: f32) -> Self {
        let n = (self.ni * self.nj) as usize;
        self.data_values = (0..n)
            .map(|i| min_val + (max_val - min_val) * (i as f32 / n as f32))
            .collect();
        self
    }

    /// Values in scan order; NaN entries are written as bitmap-missing.
    pub fn with_data(mut self, data: Vec<f32>) -> Self {
        self.data_values = data;
        self
    }

    /// Build the complete GRIB2 message bytes
    pub fn build(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.build_section1());
        if let Some(payload) = &self.local_use {
            body.extend_from_slice(&section(2, payload));
        }
        body.extend_from_slice(&self.build_section3());
        body.extend_from_slice(&self.build_section4());
        body.extend_from_slice(&self.build_section5());
        body.extend_from_slice(&self.build_section6());
        body.extend_from_slice(&section(7, &self.pack_simple()));

        let message_length = 16 + body.len() + 4;

        let mut message = Vec::with_capacity(message_length);
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]); // Reserved
        message.push(self.discipline);
        message.push(2); // Edition 2
        message.extend_from_slice(&(message_length as u64).to_be_bytes());
        message.extend_from_slice(&body);
        message.extend_from_slice(b"7777");
        message
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut s = Vec::new();
        s.extend_from_slice(&self.center.to_be_bytes());
        s.extend_from_slice(&0u16.to_be_bytes()); // Sub-center
        s.push(2); // Master table version
        s.push(1); // Local table version
        s.push(1); // Significance of reference time (start of forecast)
        s.extend_from_slice(&self.year.to_be_bytes());
        s.push(self.month);
        s.push(self.day);
        s.push(self.hour);
        s.push(self.minute);
        s.push(0); // Second
        s.push(0); // Production status (operational)
        s.push(1); // Type of data (forecast)
        section(1, &s)
    }

    fn build_section3(&self) -> Vec<u8> {
        let mut s = Vec::new();
        s.push(0); // Source of grid definition
        s.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        s.push(0); // Number of octets for optional list
        s.push(0); // Interpretation of optional list
        s.extend_from_slice(&self.layout.template_number().to_be_bytes());

        // Shape of the earth: spherical with radius in metres
        s.push(1);
        s.push(0);
        s.extend_from_slice(&self.earth_radius.to_be_bytes());
        s.extend_from_slice(&[0; 10]); // Major/minor axes, unused for a sphere

        s.extend_from_slice(&self.ni.to_be_bytes());
        s.extend_from_slice(&self.nj.to_be_bytes());
        s.extend_from_slice(&angle(self.first_lat));
        s.extend_from_slice(&angle(longitude(self.first_lon)));
        s.push(0b0000_1000); // Resolution and component flags

        match self.layout {
            GridLayout::Mercator {
                lat_d,
                last_lat,
                last_lon,
                di,
                dj,
            } => {
                s.extend_from_slice(&angle(lat_d));
                s.extend_from_slice(&angle(last_lat));
                s.extend_from_slice(&angle(longitude(last_lon)));
                s.push(self.scanning_mode);
                s.extend_from_slice(&0u32.to_be_bytes()); // Grid orientation
                s.extend_from_slice(&length(di));
                s.extend_from_slice(&length(dj));
            }
            GridLayout::Polar {
                lat_d,
                lov,
                dx,
                dy,
                south_pole,
            } => {
                s.extend_from_slice(&angle(lat_d));
                s.extend_from_slice(&angle(longitude(lov)));
                s.extend_from_slice(&length(dx));
                s.extend_from_slice(&length(dy));
                s.push(if south_pole { 0x80 } else { 0 });
                s.push(self.scanning_mode);
            }
            GridLayout::Lambert {
                lat_d,
                lov,
                latin1,
                latin2,
                dx,
                dy,
            } => {
                s.extend_from_slice(&angle(lat_d));
                s.extend_from_slice(&angle(longitude(lov)));
                s.extend_from_slice(&length(dx));
                s.extend_from_slice(&length(dy));
                s.push(0); // Projection centre flag
                s.push(self.scanning_mode);
                s.extend_from_slice(&angle(latin1));
                s.extend_from_slice(&angle(latin2));
                s.extend_from_slice(&angle(-90.0)); // Southern pole of projection
                s.extend_from_slice(&angle(0.0));
            }
        }
        section(3, &s)
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut s = Vec::new();
        s.extend_from_slice(&0u16.to_be_bytes()); // Number of coordinate values
        s.extend_from_slice(&self.product_template.to_be_bytes());
        s.push(self.param_category);
        s.push(self.param_number);
        s.push(2); // Type of generating process (forecast)
        s.push(0); // Background generating process
        s.push(0); // Analysis or forecast process
        s.extend_from_slice(&0u16.to_be_bytes()); // Hours of cutoff
        s.push(0); // Minutes of cutoff
        s.push(self.time_unit);
        s.extend_from_slice(&self.forecast_time.to_be_bytes());
        s.push(1); // Type of first fixed surface (ground)
        s.push(0);
        s.extend_from_slice(&0u32.to_be_bytes());
        s.push(255); // Type of second fixed surface (none)
        s.push(0);
        s.extend_from_slice(&0u32.to_be_bytes());
        section(4, &s)
    }

    fn build_section5(&self) -> Vec<u8> {
        let packing = self.packing();
        let present = self.data_values.iter().filter(|v| !v.is_nan()).count() as u32;

        let mut s = Vec::new();
        s.extend_from_slice(&present.to_be_bytes());
        s.extend_from_slice(&0u16.to_be_bytes()); // Template 5.0
        s.extend_from_slice(&packing.reference_value.to_be_bytes());
        s.extend_from_slice(&signed16(packing.binary_scale_factor));
        s.extend_from_slice(&signed16(0)); // Decimal scale factor
        s.push(packing.bits_per_value);
        s.push(0); // Original field type (floating point)
        section(5, &s)
    }

    fn build_section6(&self) -> Vec<u8> {
        if !self.data_values.iter().any(|v| v.is_nan()) {
            return section(6, &[255]);
        }

        let mut s = vec![0u8]; // Bitmap applies
        let mut bitmap = vec![0u8; self.data_values.len().div_ceil(8)];
        for (i, v) in self.data_values.iter().enumerate() {
            if !v.is_nan() {
                bitmap[i / 8] |= 0x80 >> (i % 8);
            }
        }
        s.extend_from_slice(&bitmap);
        section(6, &s)
    }

    fn packing(&self) -> Packing {
        let (min_val, max_val) = self
            .data_values
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });

        if !min_val.is_finite() {
            return Packing {
                reference_value: 0.0,
                binary_scale_factor: 0,
                bits_per_value: 0,
            };
        }

        let range = max_val - min_val;
        if range == 0.0 {
            return Packing {
                reference_value: min_val,
                binary_scale_factor: 0,
                bits_per_value: 0,
            };
        }

        // Unpacking formula: value = reference_value + packed_value * 2^E
        // For 16-bit packing: E = ceil(log2(range / 65535))
        Packing {
            reference_value: min_val,
            binary_scale_factor: (range / 65535.0).log2().ceil() as i16,
            bits_per_value: 16,
        }
    }

    fn pack_simple(&self) -> Vec<u8> {
        let packing = self.packing();
        if packing.bits_per_value == 0 {
            return Vec::new();
        }

        let binary_scale = 2.0_f64.powi(packing.binary_scale_factor as i32);
        let reference = packing.reference_value as f64;

        let mut packed = Vec::new();
        for &val in self.data_values.iter().filter(|v| !v.is_nan()) {
            let packed_value = ((val as f64 - reference) / binary_scale).round() as u16;
            packed.extend_from_slice(&packed_value.to_be_bytes());
        }
        packed
    }
}

struct Packing {
    reference_value: f32,
    binary_scale_factor: i16,
    bits_per_value: u8,
}

fn section(number: u8, content: &[u8]) -> Vec<u8> {
    let mut s = Vec::with_capacity(content.len() + 5);
    s.extend_from_slice(&((content.len() + 5) as u32).to_be_bytes());
    s.push(number);
    s.extend_from_slice(content);
    s
}

/// GRIB2 longitudes are written in [0, 360).
fn longitude(lon: f64) -> f64 {
    lon.rem_euclid(360.0)
}

/// Sign-magnitude microdegrees.
fn angle(deg: f64) -> [u8; 4] {
    let magnitude = (deg.abs() * 1e6).round() as u32 & 0x7FFF_FFFF;
    let raw = if deg < 0.0 { magnitude | 0x8000_0000 } else { magnitude };
    raw.to_be_bytes()
}

/// Millimetres.
fn length(metres: f64) -> [u8; 4] {
    ((metres * 1e3).round() as u32).to_be_bytes()
}

fn signed16(value: i16) -> [u8; 2] {
    let magnitude = value.unsigned_abs() & 0x7FFF;
    let raw = if value < 0 { magnitude | 0x8000 } else { magnitude };
    raw.to_be_bytes()
}
