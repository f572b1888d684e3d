//! Context packet codec.
//!
//! A context packet is a prologue, one indicator word, and the fields whose
//! indicator bits are set, serialized in descending bit order. The order,
//! widths and conversions live in a single table ([`FIELD_TABLE`]) that both
//! the decoder and the encoder walk, so a field can never be read with one
//! width and written with another.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::byte_order::normalize;
use super::data::check_declared_size;
use super::error::VrtError;
use super::fixed_point::{self, FixedPointFormat};
use super::geolocation::Geolocation;
use super::layout;
use super::options::{DecodeOptions, GeolocationSlot};
use super::prologue::{Header, PacketType, Prologue};
use super::reader::WordReader;
use super::writer::WordWriter;

/// Manufacturer OUI plus a manufacturer-assigned device code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    pub manufacturer_oui: u32,
    pub device_code: u16,
}

pub type Ephemeris = [u32; layout::CNTX_EPHEMERIS_WORDS];

/// Decoded context fields. `None` means the indicator bit was clear.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextFields {
    pub field_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_point_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_reference_frequency_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rf_reference_frequency_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rf_frequency_offset_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_band_offset_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_level_dbm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain_db: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_range_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_adjustment_ps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_calibration_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_event_indicators: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_format: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_gps: Option<Geolocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_ins: Option<Geolocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecef_ephemeris: Option<Ephemeris>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_ephemeris: Option<Ephemeris>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeris_reference_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_ascii: Option<u32>,
}

impl ContextFields {
    /// Indicator word announcing exactly the fields that are present.
    pub fn indicator_word(&self) -> u32 {
        FIELD_TABLE
            .iter()
            .filter(|spec| (spec.present)(self))
            .fold(0, |word, spec| word | spec.bit)
    }

    /// Names of the present fields, in wire order.
    pub fn present_fields(&self) -> Vec<&'static str> {
        FIELD_TABLE
            .iter()
            .filter(|spec| (spec.present)(self))
            .map(|spec| spec.name)
            .collect()
    }

    /// Copies every field present in `other` over this record.
    pub fn merge_from(&mut self, other: &ContextFields) {
        for spec in FIELD_TABLE.iter() {
            if (spec.present)(other) {
                (spec.copy)(other, self);
            }
        }
    }
}

/// Indicator word for `fields`; mirror of the decoder's bit tests.
pub fn pack_context_indicator_word(fields: &ContextFields) -> u32 {
    fields.indicator_word()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPacket {
    pub prologue: Prologue,
    /// Indicator word as received, or as computed by [`ContextPacket::new`].
    pub indicators: u32,
    pub fields: ContextFields,
    /// Words taken by the prologue, indicator word and field walk.
    /// [`ContextPacket::new`] fills in the gated layout length.
    #[serde(default)]
    pub consumed_words: usize,
}

impl ContextPacket {
    pub fn new(prologue: Prologue, fields: ContextFields) -> Self {
        let mut packet = Self {
            prologue,
            indicators: fields.indicator_word(),
            fields,
            consumed_words: 0,
        };
        packet.consumed_words = packet.encoded_words(&DecodeOptions::default());
        packet
    }

    /// Words inside the declared packet size that no field accounts for.
    ///
    /// Non-zero usually means the sender and the decoder disagree on the
    /// geolocation slot layout.
    pub fn trailing_words(&self) -> usize {
        (self.prologue.header.packet_size as usize).saturating_sub(self.consumed_words)
    }

    /// Packet length in words once encoded with `options`.
    pub fn encoded_words(&self, options: &DecodeOptions) -> usize {
        let body: usize = FIELD_TABLE
            .iter()
            .map(|spec| spec.stride((spec.present)(&self.fields), options))
            .sum();
        layout::CONTEXT_MIN_WORDS + body
    }
}

/// One row of the context field table.
struct FieldSpec {
    name: &'static str,
    bit: u32,
    words: usize,
    /// Slot is emitted even when absent under [`GeolocationSlot::AlwaysReserved`].
    reservable: bool,
    present: fn(&ContextFields) -> bool,
    decode: fn(&mut WordReader<'_>, &mut ContextFields) -> Result<(), VrtError>,
    encode: fn(&ContextFields, &mut WordWriter) -> Result<(), VrtError>,
    copy: fn(&ContextFields, &mut ContextFields),
}

impl FieldSpec {
    fn stride(&self, present: bool, options: &DecodeOptions) -> usize {
        if present || (self.reservable && options.geolocation_slot == GeolocationSlot::AlwaysReserved)
        {
            self.words
        } else {
            0
        }
    }
}

fn read_scaled_i16(reader: &mut WordReader<'_>, format: FixedPointFormat) -> Result<f64, VrtError> {
    Ok(format.decode(reader.read_low_i16()? as i64))
}

fn write_scaled_i16(
    writer: &mut WordWriter,
    value: Option<f64>,
    format: FixedPointFormat,
) -> Result<(), VrtError> {
    if let Some(value) = value {
        writer.push_low_i16(format.encode::<i16>(value)?);
    }
    Ok(())
}

fn read_frequency(reader: &mut WordReader<'_>) -> Result<f64, VrtError> {
    Ok(fixed_point::FREQUENCY.decode(reader.read_i64()?))
}

fn write_frequency(writer: &mut WordWriter, value: Option<f64>) -> Result<(), VrtError> {
    if let Some(value) = value {
        writer.push_i64(fixed_point::FREQUENCY.encode::<i64>(value)?);
    }
    Ok(())
}

fn write_u32(writer: &mut WordWriter, value: Option<u32>) -> Result<(), VrtError> {
    if let Some(value) = value {
        writer.push_u32(value);
    }
    Ok(())
}

fn write_geolocation(writer: &mut WordWriter, value: Option<&Geolocation>) -> Result<(), VrtError> {
    match value {
        Some(geo) => geo.write(writer),
        None => Ok(()),
    }
}

fn write_ephemeris(writer: &mut WordWriter, value: Option<&Ephemeris>) -> Result<(), VrtError> {
    if let Some(words) = value {
        writer.extend(words);
    }
    Ok(())
}

fn read_device_id(reader: &mut WordReader<'_>) -> Result<DeviceId, VrtError> {
    let oui = reader.read_u32()?;
    let code = reader.read_u32()?;
    Ok(DeviceId {
        manufacturer_oui: oui & layout::DEVICE_OUI_MASK,
        device_code: (code & layout::DEVICE_CODE_MASK) as u16,
    })
}

fn write_device_id(writer: &mut WordWriter, value: Option<DeviceId>) -> Result<(), VrtError> {
    let Some(id) = value else {
        return Ok(());
    };
    if id.manufacturer_oui > layout::DEVICE_OUI_MASK {
        return Err(VrtError::ValueOutOfRange {
            field: "manufacturer oui",
            value: id.manufacturer_oui as u64,
            max: layout::DEVICE_OUI_MASK as u64,
        });
    }
    writer.push_u32(id.manufacturer_oui);
    writer.push_u32(id.device_code as u32);
    Ok(())
}

/// Context fields in wire order (indicator bits 31 down to 9).
static FIELD_TABLE: [FieldSpec; 23] = [
    FieldSpec {
        name: "context_field_change",
        bit: layout::CNTX_FIELD_CHANGE_BIT,
        words: layout::CNTX_FIELD_CHANGE_WORDS,
        reservable: false,
        present: |f| f.field_changed,
        decode: |_, f| {
            f.field_changed = true;
            Ok(())
        },
        encode: |_, _| Ok(()),
        copy: |src, dst| dst.field_changed = src.field_changed,
    },
    FieldSpec {
        name: "reference_point_id",
        bit: layout::CNTX_REFERENCE_POINT_BIT,
        words: layout::CNTX_REFERENCE_POINT_WORDS,
        reservable: false,
        present: |f| f.reference_point_id.is_some(),
        decode: |r, f| {
            f.reference_point_id = Some(r.read_u32()?);
            Ok(())
        },
        encode: |f, w| write_u32(w, f.reference_point_id),
        copy: |src, dst| dst.reference_point_id = src.reference_point_id,
    },
    FieldSpec {
        name: "bandwidth",
        bit: layout::CNTX_BANDWIDTH_BIT,
        words: layout::CNTX_FREQUENCY_WORDS,
        reservable: false,
        present: |f| f.bandwidth_hz.is_some(),
        decode: |r, f| {
            f.bandwidth_hz = Some(read_frequency(r)?);
            Ok(())
        },
        encode: |f, w| write_frequency(w, f.bandwidth_hz),
        copy: |src, dst| dst.bandwidth_hz = src.bandwidth_hz,
    },
    FieldSpec {
        name: "if_reference_frequency",
        bit: layout::CNTX_IF_FREQ_BIT,
        words: layout::CNTX_FREQUENCY_WORDS,
        reservable: false,
        present: |f| f.if_reference_frequency_hz.is_some(),
        decode: |r, f| {
            f.if_reference_frequency_hz = Some(read_frequency(r)?);
            Ok(())
        },
        encode: |f, w| write_frequency(w, f.if_reference_frequency_hz),
        copy: |src, dst| dst.if_reference_frequency_hz = src.if_reference_frequency_hz,
    },
    FieldSpec {
        name: "rf_reference_frequency",
        bit: layout::CNTX_RF_FREQ_BIT,
        words: layout::CNTX_FREQUENCY_WORDS,
        reservable: false,
        present: |f| f.rf_reference_frequency_hz.is_some(),
        decode: |r, f| {
            f.rf_reference_frequency_hz = Some(read_frequency(r)?);
            Ok(())
        },
        encode: |f, w| write_frequency(w, f.rf_reference_frequency_hz),
        copy: |src, dst| dst.rf_reference_frequency_hz = src.rf_reference_frequency_hz,
    },
    FieldSpec {
        name: "rf_frequency_offset",
        bit: layout::CNTX_FREQ_OFFSET_BIT,
        words: layout::CNTX_FREQUENCY_WORDS,
        reservable: false,
        present: |f| f.rf_frequency_offset_hz.is_some(),
        decode: |r, f| {
            f.rf_frequency_offset_hz = Some(read_frequency(r)?);
            Ok(())
        },
        encode: |f, w| write_frequency(w, f.rf_frequency_offset_hz),
        copy: |src, dst| dst.rf_frequency_offset_hz = src.rf_frequency_offset_hz,
    },
    FieldSpec {
        name: "if_band_offset",
        bit: layout::CNTX_IF_BAND_OFFSET_BIT,
        words: layout::CNTX_FREQUENCY_WORDS,
        reservable: false,
        present: |f| f.if_band_offset_hz.is_some(),
        decode: |r, f| {
            f.if_band_offset_hz = Some(read_frequency(r)?);
            Ok(())
        },
        encode: |f, w| write_frequency(w, f.if_band_offset_hz),
        copy: |src, dst| dst.if_band_offset_hz = src.if_band_offset_hz,
    },
    FieldSpec {
        name: "reference_level",
        bit: layout::CNTX_REFERENCE_LEVEL_BIT,
        words: layout::CNTX_REFERENCE_LEVEL_WORDS,
        reservable: false,
        present: |f| f.reference_level_dbm.is_some(),
        decode: |r, f| {
            f.reference_level_dbm = Some(read_scaled_i16(r, fixed_point::REFERENCE_LEVEL)?);
            Ok(())
        },
        encode: |f, w| write_scaled_i16(w, f.reference_level_dbm, fixed_point::REFERENCE_LEVEL),
        copy: |src, dst| dst.reference_level_dbm = src.reference_level_dbm,
    },
    FieldSpec {
        name: "gain",
        bit: layout::CNTX_GAIN_BIT,
        words: layout::CNTX_GAIN_WORDS,
        reservable: false,
        present: |f| f.gain_db.is_some(),
        decode: |r, f| {
            f.gain_db = Some(read_scaled_i16(r, fixed_point::GAIN)?);
            Ok(())
        },
        encode: |f, w| write_scaled_i16(w, f.gain_db, fixed_point::GAIN),
        copy: |src, dst| dst.gain_db = src.gain_db,
    },
    FieldSpec {
        name: "over_range_count",
        bit: layout::CNTX_OVER_RANGE_BIT,
        words: layout::CNTX_OVER_RANGE_WORDS,
        reservable: false,
        present: |f| f.over_range_count.is_some(),
        decode: |r, f| {
            f.over_range_count = Some(r.read_u32()?);
            Ok(())
        },
        encode: |f, w| write_u32(w, f.over_range_count),
        copy: |src, dst| dst.over_range_count = src.over_range_count,
    },
    FieldSpec {
        name: "sample_rate",
        bit: layout::CNTX_SAMPLE_RATE_BIT,
        words: layout::CNTX_FREQUENCY_WORDS,
        reservable: false,
        present: |f| f.sample_rate_hz.is_some(),
        decode: |r, f| {
            f.sample_rate_hz = Some(read_frequency(r)?);
            Ok(())
        },
        encode: |f, w| write_frequency(w, f.sample_rate_hz),
        copy: |src, dst| dst.sample_rate_hz = src.sample_rate_hz,
    },
    FieldSpec {
        name: "timestamp_adjustment",
        bit: layout::CNTX_TIMESTAMP_ADJUST_BIT,
        words: layout::CNTX_TIMESTAMP_ADJUST_WORDS,
        reservable: false,
        present: |f| f.timestamp_adjustment_ps.is_some(),
        decode: |r, f| {
            f.timestamp_adjustment_ps = Some(r.read_i64()?);
            Ok(())
        },
        encode: |f, w| {
            if let Some(value) = f.timestamp_adjustment_ps {
                w.push_i64(value);
            }
            Ok(())
        },
        copy: |src, dst| dst.timestamp_adjustment_ps = src.timestamp_adjustment_ps,
    },
    FieldSpec {
        name: "timestamp_calibration_time",
        bit: layout::CNTX_TIMESTAMP_CAL_BIT,
        words: layout::CNTX_TIMESTAMP_CAL_WORDS,
        reservable: false,
        present: |f| f.timestamp_calibration_time.is_some(),
        decode: |r, f| {
            f.timestamp_calibration_time = Some(r.read_u32()?);
            Ok(())
        },
        encode: |f, w| write_u32(w, f.timestamp_calibration_time),
        copy: |src, dst| dst.timestamp_calibration_time = src.timestamp_calibration_time,
    },
    FieldSpec {
        name: "temperature",
        bit: layout::CNTX_TEMPERATURE_BIT,
        words: layout::CNTX_TEMPERATURE_WORDS,
        reservable: false,
        present: |f| f.temperature_c.is_some(),
        decode: |r, f| {
            f.temperature_c = Some(read_scaled_i16(r, fixed_point::TEMPERATURE)?);
            Ok(())
        },
        encode: |f, w| write_scaled_i16(w, f.temperature_c, fixed_point::TEMPERATURE),
        copy: |src, dst| dst.temperature_c = src.temperature_c,
    },
    FieldSpec {
        name: "device_id",
        bit: layout::CNTX_DEVICE_ID_BIT,
        words: layout::CNTX_DEVICE_ID_WORDS,
        reservable: false,
        present: |f| f.device_id.is_some(),
        decode: |r, f| {
            f.device_id = Some(read_device_id(r)?);
            Ok(())
        },
        encode: |f, w| write_device_id(w, f.device_id),
        copy: |src, dst| dst.device_id = src.device_id,
    },
    FieldSpec {
        name: "state_event_indicators",
        bit: layout::CNTX_STATE_EVENT_BIT,
        words: layout::CNTX_STATE_EVENT_WORDS,
        reservable: false,
        present: |f| f.state_event_indicators.is_some(),
        decode: |r, f| {
            f.state_event_indicators = Some(r.read_u32()?);
            Ok(())
        },
        encode: |f, w| write_u32(w, f.state_event_indicators),
        copy: |src, dst| dst.state_event_indicators = src.state_event_indicators,
    },
    FieldSpec {
        name: "payload_format",
        bit: layout::CNTX_PAYLOAD_FORMAT_BIT,
        words: layout::CNTX_PAYLOAD_FORMAT_WORDS,
        reservable: false,
        present: |f| f.payload_format.is_some(),
        decode: |r, f| {
            f.payload_format = Some(r.read_u64()?);
            Ok(())
        },
        encode: |f, w| {
            if let Some(value) = f.payload_format {
                w.push_u64(value);
            }
            Ok(())
        },
        copy: |src, dst| dst.payload_format = src.payload_format,
    },
    FieldSpec {
        name: "formatted_gps",
        bit: layout::CNTX_FORMATTED_GPS_BIT,
        words: layout::CNTX_GEOLOCATION_WORDS,
        reservable: true,
        present: |f| f.formatted_gps.is_some(),
        decode: |r, f| {
            f.formatted_gps = Some(Geolocation::read(r)?);
            Ok(())
        },
        encode: |f, w| write_geolocation(w, f.formatted_gps.as_ref()),
        copy: |src, dst| dst.formatted_gps = src.formatted_gps,
    },
    FieldSpec {
        name: "formatted_ins",
        bit: layout::CNTX_FORMATTED_INS_BIT,
        words: layout::CNTX_GEOLOCATION_WORDS,
        reservable: false,
        present: |f| f.formatted_ins.is_some(),
        decode: |r, f| {
            f.formatted_ins = Some(Geolocation::read(r)?);
            Ok(())
        },
        encode: |f, w| write_geolocation(w, f.formatted_ins.as_ref()),
        copy: |src, dst| dst.formatted_ins = src.formatted_ins,
    },
    FieldSpec {
        name: "ecef_ephemeris",
        bit: layout::CNTX_ECEF_BIT,
        words: layout::CNTX_EPHEMERIS_WORDS,
        reservable: false,
        present: |f| f.ecef_ephemeris.is_some(),
        decode: |r, f| {
            f.ecef_ephemeris = Some(r.read_array()?);
            Ok(())
        },
        encode: |f, w| write_ephemeris(w, f.ecef_ephemeris.as_ref()),
        copy: |src, dst| dst.ecef_ephemeris = src.ecef_ephemeris,
    },
    FieldSpec {
        name: "relative_ephemeris",
        bit: layout::CNTX_RELATIVE_EPHEMERIS_BIT,
        words: layout::CNTX_EPHEMERIS_WORDS,
        reservable: false,
        present: |f| f.relative_ephemeris.is_some(),
        decode: |r, f| {
            f.relative_ephemeris = Some(r.read_array()?);
            Ok(())
        },
        encode: |f, w| write_ephemeris(w, f.relative_ephemeris.as_ref()),
        copy: |src, dst| dst.relative_ephemeris = src.relative_ephemeris,
    },
    FieldSpec {
        name: "ephemeris_reference_id",
        bit: layout::CNTX_EPHEMERIS_REF_BIT,
        words: layout::CNTX_EPHEMERIS_REF_WORDS,
        reservable: false,
        present: |f| f.ephemeris_reference_id.is_some(),
        decode: |r, f| {
            f.ephemeris_reference_id = Some(r.read_u32()?);
            Ok(())
        },
        encode: |f, w| write_u32(w, f.ephemeris_reference_id),
        copy: |src, dst| dst.ephemeris_reference_id = src.ephemeris_reference_id,
    },
    FieldSpec {
        name: "gps_ascii",
        bit: layout::CNTX_GPS_ASCII_BIT,
        words: layout::CNTX_GPS_ASCII_WORDS,
        reservable: false,
        present: |f| f.gps_ascii.is_some(),
        decode: |r, f| {
            f.gps_ascii = Some(r.read_u32()?);
            Ok(())
        },
        encode: |f, w| write_u32(w, f.gps_ascii),
        copy: |src, dst| dst.gps_ascii = src.gps_ascii,
    },
];

/// Decodes one context packet from `words` (wire order).
///
/// Fields are decoded in table order; a field whose indicator bit is clear
/// contributes no words, except the formatted GPS slot under
/// [`GeolocationSlot::AlwaysReserved`]. Indicator bits below bit 9 carry no
/// fields and are ignored. Words left over after the last field are treated
/// as padding.
///
/// # Errors
/// - [`VrtError::Desynchronized`] when `size_in_words` is zero or exceeds `words`.
/// - [`VrtError::InvalidPacketType`] when the header is not a context header.
/// - [`VrtError::MalformedPacket`] when the header size disagrees with `size_in_words`.
/// - [`VrtError::TruncatedBuffer`] when a field would be read past the packet.
///
/// # Examples
/// ```
/// use vrtkit_core::protocols::vrt::{DecodeOptions, decode_context, pack_context_header};
///
/// let host = [
///     pack_context_header(0, 8),
///     7,
///     0,
///     0,
///     0,
///     (1 << 24) | (1 << 23),
///     (-1280i16) as u16 as u32,
///     1280,
/// ];
/// let wire: Vec<u32> = host.iter().map(|w| w.to_be()).collect();
///
/// let packet = decode_context(&wire, 8, &DecodeOptions::default()).unwrap();
/// assert_eq!(packet.fields.reference_level_dbm, Some(-10.0));
/// assert_eq!(packet.fields.gain_db, Some(10.0));
/// ```
pub fn decode_context(
    words: &[u32],
    size_in_words: usize,
    options: &DecodeOptions,
) -> Result<ContextPacket, VrtError> {
    check_declared_size(size_in_words, words.len())?;
    let host = normalize(&words[..size_in_words]);
    let mut reader = WordReader::new(&host);

    let prologue = Prologue::read(&mut reader)?;
    if prologue.header.packet_type != PacketType::Context {
        return Err(VrtError::InvalidPacketType {
            code: prologue.header.packet_type.code(),
            declared: size_in_words,
        });
    }
    if prologue.header.packet_size as usize != size_in_words {
        return Err(VrtError::MalformedPacket {
            declared: size_in_words,
            reason: "header size disagrees with supplied size",
        });
    }

    let indicators = reader.read_u32()?;
    let mut fields = ContextFields::default();
    for spec in FIELD_TABLE.iter() {
        if indicators & spec.bit != 0 {
            (spec.decode)(&mut reader, &mut fields)?;
            trace!(field = spec.name, words = spec.words, "decoded context field");
        } else {
            reader.skip(spec.stride(false, options))?;
        }
    }

    let consumed_words = reader.position();
    debug!(
        stream_id = prologue.stream_id,
        packet_count = prologue.header.packet_count,
        size = size_in_words,
        consumed = consumed_words,
        indicators,
        "decoded context packet"
    );

    Ok(ContextPacket {
        prologue,
        indicators,
        fields,
        consumed_words,
    })
}

/// Encodes a context packet into wire-order words.
///
/// The indicator word is rebuilt from the present fields; `packet.indicators`
/// is not consulted.
///
/// # Errors
/// - [`VrtError::ArithmeticOverflow`] when a value does not fit its fixed-point field.
/// - [`VrtError::ValueOutOfRange`] for an oversized device OUI.
/// - [`VrtError::PacketTooLarge`] when the packet would exceed 65535 words.
pub fn encode_context(packet: &ContextPacket, options: &DecodeOptions) -> Result<Vec<u32>, VrtError> {
    let fields = &packet.fields;
    let mut writer = WordWriter::new();
    packet.prologue.write(&mut writer, PacketType::Context, 0);
    writer.push_u32(fields.indicator_word());

    for spec in FIELD_TABLE.iter() {
        if (spec.present)(fields) {
            (spec.encode)(fields, &mut writer)?;
        } else {
            writer.push_zeros(spec.stride(false, options));
        }
    }

    let size = u16::try_from(writer.len())
        .map_err(|_| VrtError::PacketTooLarge { words: writer.len() })?;
    let header = Header {
        packet_type: PacketType::Context,
        packet_size: size,
        ..packet.prologue.header
    };
    writer.set(layout::HEADER_OFFSET, header.pack());
    Ok(writer.into_wire_words())
}
