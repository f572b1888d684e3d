//! Word offsets, bit positions and field widths for the VRT wire format.

pub const PROLOGUE_WORDS: usize = 5;
pub const TRAILER_WORDS: usize = 1;
pub const INDICATOR_WORDS: usize = 1;
pub const DATA_OVERHEAD_WORDS: usize = PROLOGUE_WORDS + TRAILER_WORDS;
pub const CONTEXT_MIN_WORDS: usize = PROLOGUE_WORDS + INDICATOR_WORDS;
pub const MAX_PACKET_WORDS: usize = u16::MAX as usize;
pub const MAX_DATA_SAMPLES: usize = MAX_PACKET_WORDS - DATA_OVERHEAD_WORDS;

pub const HEADER_OFFSET: usize = 0;
pub const STREAM_ID_OFFSET: usize = 1;
pub const SECONDS_OFFSET: usize = 2;
pub const FRACTIONAL_UPPER_OFFSET: usize = 3;
pub const FRACTIONAL_LOWER_OFFSET: usize = 4;
pub const INDICATOR_OFFSET: usize = PROLOGUE_WORDS;

pub const DATA_TYPE_CODE: u8 = 1;
pub const CONTEXT_TYPE_CODE: u8 = 4;

pub const HEADER_TYPE_SHIFT: u32 = 28;
pub const HEADER_TYPE_MASK: u32 = 0xF000_0000;
pub const HEADER_CLASS_ID_BIT: u32 = 1 << 27;
pub const HEADER_TRAILER_BIT: u32 = 1 << 26;
pub const HEADER_TSM_BIT: u32 = 1 << 24;
pub const HEADER_TSI_SHIFT: u32 = 22;
pub const HEADER_TSF_SHIFT: u32 = 20;
pub const HEADER_TIMESTAMP_KIND_MASK: u32 = 0b11;
pub const HEADER_COUNT_SHIFT: u32 = 16;
pub const HEADER_COUNT_MASK: u32 = 0x000F_0000;
pub const HEADER_SIZE_MASK: u32 = 0x0000_FFFF;
pub const PACKET_COUNT_MODULUS: u8 = 16;

pub const TSI_UTC: u8 = 1;
pub const TSF_REAL_TIME: u8 = 2;

pub const TRAILER_TIME_ENABLE: u32 = 1 << 31;
pub const TRAILER_VALID_DATA_ENABLE: u32 = 1 << 30;
pub const TRAILER_REF_LOCK_ENABLE: u32 = 1 << 29;
pub const TRAILER_OVER_RANGE_ENABLE: u32 = 1 << 25;
pub const TRAILER_SAMPLE_LOSS_ENABLE: u32 = 1 << 24;
pub const TRAILER_TIME_INDICATOR: u32 = 1 << 19;
pub const TRAILER_VALID_DATA_INDICATOR: u32 = 1 << 18;
pub const TRAILER_REF_LOCK_INDICATOR: u32 = 1 << 17;
pub const TRAILER_OVER_RANGE_INDICATOR: u32 = 1 << 13;
pub const TRAILER_SAMPLE_LOSS_INDICATOR: u32 = 1 << 12;
pub const TRAILER_CONTEXT_COUNT_ENABLE: u32 = 1 << 7;
pub const TRAILER_CONTEXT_COUNT_MASK: u32 = 0x3F;

pub const CNTX_FIELD_CHANGE_BIT: u32 = 1 << 31;
pub const CNTX_REFERENCE_POINT_BIT: u32 = 1 << 30;
pub const CNTX_BANDWIDTH_BIT: u32 = 1 << 29;
pub const CNTX_IF_FREQ_BIT: u32 = 1 << 28;
pub const CNTX_RF_FREQ_BIT: u32 = 1 << 27;
pub const CNTX_FREQ_OFFSET_BIT: u32 = 1 << 26;
pub const CNTX_IF_BAND_OFFSET_BIT: u32 = 1 << 25;
pub const CNTX_REFERENCE_LEVEL_BIT: u32 = 1 << 24;
pub const CNTX_GAIN_BIT: u32 = 1 << 23;
pub const CNTX_OVER_RANGE_BIT: u32 = 1 << 22;
pub const CNTX_SAMPLE_RATE_BIT: u32 = 1 << 21;
pub const CNTX_TIMESTAMP_ADJUST_BIT: u32 = 1 << 20;
pub const CNTX_TIMESTAMP_CAL_BIT: u32 = 1 << 19;
pub const CNTX_TEMPERATURE_BIT: u32 = 1 << 18;
pub const CNTX_DEVICE_ID_BIT: u32 = 1 << 17;
pub const CNTX_STATE_EVENT_BIT: u32 = 1 << 16;
pub const CNTX_PAYLOAD_FORMAT_BIT: u32 = 1 << 15;
pub const CNTX_FORMATTED_GPS_BIT: u32 = 1 << 14;
pub const CNTX_FORMATTED_INS_BIT: u32 = 1 << 13;
pub const CNTX_ECEF_BIT: u32 = 1 << 12;
pub const CNTX_RELATIVE_EPHEMERIS_BIT: u32 = 1 << 11;
pub const CNTX_EPHEMERIS_REF_BIT: u32 = 1 << 10;
pub const CNTX_GPS_ASCII_BIT: u32 = 1 << 9;

pub const CNTX_FIELD_CHANGE_WORDS: usize = 0;
pub const CNTX_REFERENCE_POINT_WORDS: usize = 1;
pub const CNTX_FREQUENCY_WORDS: usize = 2;
pub const CNTX_REFERENCE_LEVEL_WORDS: usize = 1;
pub const CNTX_GAIN_WORDS: usize = 1;
pub const CNTX_OVER_RANGE_WORDS: usize = 1;
pub const CNTX_TIMESTAMP_ADJUST_WORDS: usize = 2;
pub const CNTX_TIMESTAMP_CAL_WORDS: usize = 1;
pub const CNTX_TEMPERATURE_WORDS: usize = 1;
pub const CNTX_DEVICE_ID_WORDS: usize = 2;
pub const CNTX_STATE_EVENT_WORDS: usize = 1;
pub const CNTX_PAYLOAD_FORMAT_WORDS: usize = 2;
pub const CNTX_GEOLOCATION_WORDS: usize = 11;
pub const CNTX_EPHEMERIS_WORDS: usize = 13;
pub const CNTX_EPHEMERIS_REF_WORDS: usize = 1;
pub const CNTX_GPS_ASCII_WORDS: usize = 1;

pub const DEVICE_OUI_MASK: u32 = 0x00FF_FFFF;
pub const DEVICE_CODE_MASK: u32 = 0x0000_FFFF;

pub const GEO_HEADER_OFFSET: usize = 0;
pub const GEO_SECONDS_OFFSET: usize = 1;
pub const GEO_FRACTIONAL_UPPER_OFFSET: usize = 2;
pub const GEO_FRACTIONAL_LOWER_OFFSET: usize = 3;
pub const GEO_LATITUDE_OFFSET: usize = 4;
pub const GEO_LONGITUDE_OFFSET: usize = 5;
pub const GEO_ALTITUDE_OFFSET: usize = 6;
pub const GEO_SPEED_OFFSET: usize = 7;
pub const GEO_HEADING_OFFSET: usize = 8;
pub const GEO_TRACK_OFFSET: usize = 9;
pub const GEO_MAGNETIC_VARIATION_OFFSET: usize = 10;
pub const GEO_TSI_SHIFT: u32 = 26;
pub const GEO_TSF_SHIFT: u32 = 24;
pub const GEO_UNSPECIFIED: i32 = 0x7FFF_FFFF;

/// Raw sample magnitude that maps onto the reference level (2^15).
pub const SAMPLE_FULL_SCALE: f32 = 32768.0;
