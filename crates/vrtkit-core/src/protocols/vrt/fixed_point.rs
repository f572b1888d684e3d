//! Scaled-integer representation of physical quantities.
//!
//! Every fixed-point field is a two's-complement integer whose lowest
//! `frac_bits` bits hold the fractional part. The per-field formats below are
//! shared by the decoders and the encoders and must not diverge.

use num_traits::PrimInt;

use super::error::VrtError;

/// Converts `value` to a fixed-point integer with `frac_bits` fractional bits.
///
/// Rounds to the nearest representable step. Returns `None` when the value is
/// not finite or does not fit in `T`.
///
/// # Examples
/// ```
/// use vrtkit_core::protocols::vrt::fixed_point::{to_fixed, to_float};
///
/// let raw: i16 = to_fixed(-10.0, 7).unwrap();
/// assert_eq!(raw, -1280);
/// assert_eq!(to_float(raw.into(), 7), -10.0);
/// assert_eq!(to_fixed::<i16>(1000.0, 7), None);
/// ```
pub fn to_fixed<T: PrimInt>(value: f64, frac_bits: u32) -> Option<T> {
    if !value.is_finite() {
        return None;
    }
    let scaled = (value * scale(frac_bits)).round();
    T::from(scaled)
}

/// Converts a fixed-point integer with `frac_bits` fractional bits to `f64`.
pub fn to_float(fixed: i64, frac_bits: u32) -> f64 {
    fixed as f64 / scale(frac_bits)
}

fn scale(frac_bits: u32) -> f64 {
    2f64.powi(frac_bits as i32)
}

/// Named fixed-point format of a wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointFormat {
    pub field: &'static str,
    pub frac_bits: u32,
}

impl FixedPointFormat {
    pub const fn new(field: &'static str, frac_bits: u32) -> Self {
        Self { field, frac_bits }
    }

    pub fn encode<T: PrimInt>(&self, value: f64) -> Result<T, VrtError> {
        to_fixed(value, self.frac_bits).ok_or(VrtError::ArithmeticOverflow {
            field: self.field,
            value,
        })
    }

    pub fn decode(&self, fixed: i64) -> f64 {
        to_float(fixed, self.frac_bits)
    }

    /// Smallest step representable in this format.
    pub fn resolution(&self) -> f64 {
        1.0 / scale(self.frac_bits)
    }
}

pub const TEMPERATURE: FixedPointFormat = FixedPointFormat::new("temperature", 6);
pub const GAIN: FixedPointFormat = FixedPointFormat::new("gain", 7);
pub const REFERENCE_LEVEL: FixedPointFormat = FixedPointFormat::new("reference level", 7);
pub const FREQUENCY: FixedPointFormat = FixedPointFormat::new("frequency", 20);
pub const LATITUDE: FixedPointFormat = FixedPointFormat::new("latitude", 22);
pub const LONGITUDE: FixedPointFormat = FixedPointFormat::new("longitude", 22);
pub const ALTITUDE: FixedPointFormat = FixedPointFormat::new("altitude", 6);
pub const SPEED_OVER_GROUND: FixedPointFormat = FixedPointFormat::new("speed over ground", 16);
pub const HEADING_ANGLE: FixedPointFormat = FixedPointFormat::new("heading angle", 22);
pub const TRACK_ANGLE: FixedPointFormat = FixedPointFormat::new("track angle", 22);
pub const MAGNETIC_VARIATION: FixedPointFormat = FixedPointFormat::new("magnetic variation", 22);
