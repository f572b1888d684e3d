//! Formatted GPS / INS geolocation block carried in context packets.

use serde::{Deserialize, Serialize};

use super::error::VrtError;
use super::fixed_point::{self, FixedPointFormat};
use super::layout;
use super::prologue::Timestamp;
use super::reader::WordReader;
use super::writer::WordWriter;

/// Position fix with its own timestamp. Each coordinate is `None` when the
/// sender marked it unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geolocation {
    pub tsi: u8,
    pub tsf: u8,
    pub manufacturer_oui: u32,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_over_ground_mps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnetic_variation_deg: Option<f64>,
}

impl Geolocation {
    pub fn read(reader: &mut WordReader<'_>) -> Result<Self, VrtError> {
        let words = reader.read_array::<{ layout::CNTX_GEOLOCATION_WORDS }>()?;
        let head = words[layout::GEO_HEADER_OFFSET];
        let upper = words[layout::GEO_FRACTIONAL_UPPER_OFFSET] as u64;
        let lower = words[layout::GEO_FRACTIONAL_LOWER_OFFSET] as u64;
        let coordinate = |offset: usize, format: FixedPointFormat| {
            decode_coordinate(words[offset], format)
        };

        Ok(Self {
            tsi: ((head >> layout::GEO_TSI_SHIFT) & layout::HEADER_TIMESTAMP_KIND_MASK) as u8,
            tsf: ((head >> layout::GEO_TSF_SHIFT) & layout::HEADER_TIMESTAMP_KIND_MASK) as u8,
            manufacturer_oui: head & layout::DEVICE_OUI_MASK,
            timestamp: Timestamp {
                seconds: words[layout::GEO_SECONDS_OFFSET],
                picoseconds: (upper << 32) | lower,
            },
            latitude_deg: coordinate(layout::GEO_LATITUDE_OFFSET, fixed_point::LATITUDE),
            longitude_deg: coordinate(layout::GEO_LONGITUDE_OFFSET, fixed_point::LONGITUDE),
            altitude_m: coordinate(layout::GEO_ALTITUDE_OFFSET, fixed_point::ALTITUDE),
            speed_over_ground_mps: coordinate(
                layout::GEO_SPEED_OFFSET,
                fixed_point::SPEED_OVER_GROUND,
            ),
            heading_deg: coordinate(layout::GEO_HEADING_OFFSET, fixed_point::HEADING_ANGLE),
            track_deg: coordinate(layout::GEO_TRACK_OFFSET, fixed_point::TRACK_ANGLE),
            magnetic_variation_deg: coordinate(
                layout::GEO_MAGNETIC_VARIATION_OFFSET,
                fixed_point::MAGNETIC_VARIATION,
            ),
        })
    }

    /// # Errors
    /// Returns [`VrtError::ArithmeticOverflow`] when a coordinate does not fit
    /// its 32-bit fixed-point word.
    pub fn write(&self, writer: &mut WordWriter) -> Result<(), VrtError> {
        let head = (self.tsi as u32 & layout::HEADER_TIMESTAMP_KIND_MASK) << layout::GEO_TSI_SHIFT
            | (self.tsf as u32 & layout::HEADER_TIMESTAMP_KIND_MASK) << layout::GEO_TSF_SHIFT
            | self.manufacturer_oui & layout::DEVICE_OUI_MASK;
        let coordinates = [
            (self.latitude_deg, fixed_point::LATITUDE),
            (self.longitude_deg, fixed_point::LONGITUDE),
            (self.altitude_m, fixed_point::ALTITUDE),
            (self.speed_over_ground_mps, fixed_point::SPEED_OVER_GROUND),
            (self.heading_deg, fixed_point::HEADING_ANGLE),
            (self.track_deg, fixed_point::TRACK_ANGLE),
            (self.magnetic_variation_deg, fixed_point::MAGNETIC_VARIATION),
        ];
        let encoded = coordinates
            .into_iter()
            .map(|(value, format)| encode_coordinate(value, format))
            .collect::<Result<Vec<i32>, _>>()?;

        writer.push_u32(head);
        writer.push_u32(self.timestamp.seconds);
        writer.push_u32((self.timestamp.picoseconds >> 32) as u32);
        writer.push_u32(self.timestamp.picoseconds as u32);
        for value in encoded {
            writer.push_i32(value);
        }
        Ok(())
    }
}

fn decode_coordinate(word: u32, format: FixedPointFormat) -> Option<f64> {
    let raw = word as i32;
    (raw != layout::GEO_UNSPECIFIED).then(|| format.decode(raw as i64))
}

fn encode_coordinate(value: Option<f64>, format: FixedPointFormat) -> Result<i32, VrtError> {
    match value {
        Some(value) => format.encode::<i32>(value),
        None => Ok(layout::GEO_UNSPECIFIED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Geolocation {
        Geolocation {
            tsi: layout::TSI_UTC,
            tsf: layout::TSF_REAL_TIME,
            manufacturer_oui: 0x00AB_CDEF,
            timestamp: Timestamp {
                seconds: 1_700_000_123,
                picoseconds: 250_000_000_000,
            },
            latitude_deg: Some(38.8895),
            longitude_deg: Some(-77.0353),
            altitude_m: Some(17.5),
            speed_over_ground_mps: Some(3.25),
            heading_deg: Some(270.0),
            track_deg: None,
            magnetic_variation_deg: Some(-10.5),
        }
    }

    #[test]
    fn block_is_eleven_words() {
        let mut writer = WordWriter::new();
        sample().write(&mut writer).unwrap();
        assert_eq!(writer.len(), layout::CNTX_GEOLOCATION_WORDS);
    }

    #[test]
    fn write_then_read_within_resolution() {
        let mut writer = WordWriter::new();
        let original = sample();
        original.write(&mut writer).unwrap();
        let words = writer.into_host_words();
        let decoded = Geolocation::read(&mut WordReader::new(&words)).unwrap();

        assert_eq!(decoded.tsi, original.tsi);
        assert_eq!(decoded.tsf, original.tsf);
        assert_eq!(decoded.manufacturer_oui, original.manufacturer_oui);
        assert_eq!(decoded.timestamp, original.timestamp);
        let lat = decoded.latitude_deg.unwrap();
        assert!((lat - 38.8895).abs() <= fixed_point::LATITUDE.resolution());
        assert_eq!(decoded.altitude_m, Some(17.5));
        assert_eq!(decoded.heading_deg, Some(270.0));
        assert_eq!(decoded.track_deg, None);
    }

    #[test]
    fn unspecified_sentinel_decodes_as_absent() {
        let mut words = [0u32; layout::CNTX_GEOLOCATION_WORDS];
        words[layout::GEO_LATITUDE_OFFSET] = layout::GEO_UNSPECIFIED as u32;
        let decoded = Geolocation::read(&mut WordReader::new(&words)).unwrap();
        assert_eq!(decoded.latitude_deg, None);
        assert_eq!(decoded.longitude_deg, Some(0.0));
    }

    #[test]
    fn header_word_splits_timestamp_kinds_and_oui() {
        let mut words = [0u32; layout::CNTX_GEOLOCATION_WORDS];
        words[0] = (1 << 26) | (3 << 24) | 0x0012_3456;
        let decoded = Geolocation::read(&mut WordReader::new(&words)).unwrap();
        assert_eq!(decoded.tsi, 1);
        assert_eq!(decoded.tsf, 3);
        assert_eq!(decoded.manufacturer_oui, 0x0012_3456);
    }

    #[test]
    fn short_block_is_truncated() {
        let words = [0u32; 10];
        assert!(matches!(
            Geolocation::read(&mut WordReader::new(&words)),
            Err(VrtError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn out_of_range_coordinate_overflows() {
        let geo = Geolocation {
            speed_over_ground_mps: Some(1.0e6),
            ..Geolocation::default()
        };
        let err = geo.write(&mut WordWriter::new()).unwrap_err();
        assert!(matches!(err, VrtError::ArithmeticOverflow { .. }));
    }
}
