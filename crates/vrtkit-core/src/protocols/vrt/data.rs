use num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::byte_order::normalize;
use super::error::VrtError;
use super::layout;
use super::prologue::{PacketType, Prologue};
use super::reader::WordReader;
use super::trailer::Trailer;
use super::writer::WordWriter;

/// Decoded signal data packet.
///
/// `raw_samples` keeps the wire values so the packet re-encodes exactly;
/// `samples` holds the same pairs scaled against `reference_level_dbm`.
/// Deserializing ignores any `samples` in the input and rescales the raw
/// pairs, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDataPacket")]
pub struct DataPacket {
    pub prologue: Prologue,
    pub raw_samples: Vec<Complex<i16>>,
    pub samples: Vec<Complex<f32>>,
    pub trailer: Trailer,
    /// Reference level the samples were scaled against.
    pub reference_level_dbm: f64,
}

#[derive(Deserialize)]
struct RawDataPacket {
    prologue: Prologue,
    raw_samples: Vec<Complex<i16>>,
    trailer: Trailer,
    reference_level_dbm: f64,
}

impl From<RawDataPacket> for DataPacket {
    fn from(raw: RawDataPacket) -> Self {
        DataPacket::from_raw(
            raw.prologue,
            raw.raw_samples,
            raw.trailer,
            raw.reference_level_dbm,
        )
    }
}

impl DataPacket {
    /// Builds a packet from raw I/Q pairs, scaling them for `reference_level_dbm`.
    pub fn from_raw(
        prologue: Prologue,
        raw_samples: Vec<Complex<i16>>,
        trailer: Trailer,
        reference_level_dbm: f64,
    ) -> Self {
        let samples = scale_samples(&raw_samples, reference_level_dbm);
        Self {
            prologue,
            raw_samples,
            samples,
            trailer,
            reference_level_dbm,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.raw_samples.len()
    }

    /// Scaled samples as a flat `I, Q, I, Q, ...` array.
    pub fn interleaved(&self) -> Vec<f32> {
        self.samples.iter().flat_map(|s| [s.re, s.im]).collect()
    }

    /// Largest sample magnitude in scaled units.
    pub fn peak_magnitude(&self) -> f32 {
        self.samples
            .iter()
            .map(|s| s.norm())
            .fold(0.0f32, f32::max)
    }
}

/// Linear amplitude of a full-scale sample at `reference_level_dbm`.
pub fn sample_scale(reference_level_dbm: f64) -> f32 {
    10f64.powf(reference_level_dbm / 10.0).sqrt() as f32
}

pub fn scale_samples(raw: &[Complex<i16>], reference_level_dbm: f64) -> Vec<Complex<f32>> {
    let scale = sample_scale(reference_level_dbm);
    raw.iter()
        .map(|s| {
            Complex::new(
                s.re as f32 / layout::SAMPLE_FULL_SCALE * scale,
                s.im as f32 / layout::SAMPLE_FULL_SCALE * scale,
            )
        })
        .collect()
}

/// Checks a caller-supplied packet size against the words actually present.
pub(crate) fn check_declared_size(size_in_words: usize, available: usize) -> Result<(), VrtError> {
    if size_in_words == 0 || size_in_words > available {
        return Err(VrtError::Desynchronized {
            declared: size_in_words,
            available,
        });
    }
    Ok(())
}

/// Decodes one data packet from `words` (wire order).
///
/// Consumes exactly `size_in_words` words. Samples are scaled with
/// `reference_level_dbm`, normally the last reference level reported by a
/// context packet on the same stream.
///
/// # Errors
/// - [`VrtError::Desynchronized`] when `size_in_words` is zero or exceeds `words`.
/// - [`VrtError::InvalidPacketType`] when the header is not a data header.
/// - [`VrtError::MalformedPacket`] when the size cannot hold prologue and
///   trailer, or disagrees with the header.
/// - [`VrtError::TruncatedBuffer`] when the prologue does not fit.
///
/// # Examples
/// ```
/// use vrtkit_core::protocols::vrt::{Trailer, TrailerFlag, decode_data, pack_data_header};
///
/// let trailer = Trailer::unpack((1 << 30) | (1 << 18));
/// let host = [
///     pack_data_header(0, 7),
///     1,
///     0,
///     0,
///     0,
///     ((-16384i16 as u16 as u32) << 16) | 16384,
///     trailer.pack().unwrap(),
/// ];
/// let wire: Vec<u32> = host.iter().map(|w| w.to_be()).collect();
///
/// let packet = decode_data(&wire, 7, -20.0).unwrap();
/// assert_eq!(packet.trailer.get(TrailerFlag::ValidData), Some(true));
/// assert!((packet.samples[0].re - 0.05).abs() < 1e-6);
/// ```
pub fn decode_data(
    words: &[u32],
    size_in_words: usize,
    reference_level_dbm: f64,
) -> Result<DataPacket, VrtError> {
    check_declared_size(size_in_words, words.len())?;
    let host = normalize(&words[..size_in_words]);
    let mut reader = WordReader::new(&host);

    let prologue = Prologue::read(&mut reader)?;
    if prologue.header.packet_type != PacketType::Data {
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

    let payload_words = size_in_words
        .checked_sub(layout::DATA_OVERHEAD_WORDS)
        .ok_or(VrtError::MalformedPacket {
            declared: size_in_words,
            reason: "size too small for prologue and trailer",
        })?;
    let raw_samples: Vec<Complex<i16>> = reader
        .read_slice(payload_words)?
        .iter()
        .map(|&word| unpack_sample(word))
        .collect();
    let trailer = Trailer::unpack(reader.read_u32()?);

    debug!(
        stream_id = prologue.stream_id,
        packet_count = prologue.header.packet_count,
        size = size_in_words,
        samples = raw_samples.len(),
        "decoded data packet"
    );

    Ok(DataPacket::from_raw(
        prologue,
        raw_samples,
        trailer,
        reference_level_dbm,
    ))
}

/// Encodes a data packet into wire-order words.
///
/// The header size is computed from the sample count; the scaled samples are
/// not consulted.
///
/// # Errors
/// - [`VrtError::PacketTooLarge`] when the packet would exceed 65535 words.
/// - [`VrtError::ValueOutOfRange`] for an unrepresentable trailer count.
pub fn encode_data(packet: &DataPacket) -> Result<Vec<u32>, VrtError> {
    let size = packet.raw_samples.len() + layout::DATA_OVERHEAD_WORDS;
    if size > layout::MAX_PACKET_WORDS {
        return Err(VrtError::PacketTooLarge { words: size });
    }
    let trailer = packet.trailer.pack()?;

    let mut writer = WordWriter::new();
    packet
        .prologue
        .write(&mut writer, PacketType::Data, size as u16);
    for sample in &packet.raw_samples {
        writer.push_u32(pack_sample(*sample));
    }
    writer.push_u32(trailer);
    Ok(writer.into_wire_words())
}

/// I in the low half-word, Q in the high half-word.
fn unpack_sample(word: u32) -> Complex<i16> {
    Complex::new(word as u16 as i16, (word >> 16) as u16 as i16)
}

fn pack_sample(sample: Complex<i16>) -> u32 {
    ((sample.im as u16 as u32) << 16) | sample.re as u16 as u32
}
