use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::error::VrtError;
use super::layout;
use super::reader::WordReader;
use super::writer::WordWriter;

/// Packet kind carried in the top four bits of the header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketType {
    Data,
    Context,
    Invalid(u8),
}

impl PacketType {
    pub fn from_code(code: u8) -> Self {
        match code {
            layout::DATA_TYPE_CODE => PacketType::Data,
            layout::CONTEXT_TYPE_CODE => PacketType::Context,
            other => PacketType::Invalid(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            PacketType::Data => layout::DATA_TYPE_CODE,
            PacketType::Context => layout::CONTEXT_TYPE_CODE,
            PacketType::Invalid(code) => code,
        }
    }
}

/// Single-bit and two-bit flags of the header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderFlags {
    pub class_id: bool,
    /// Trailer present (data packets).
    pub trailer: bool,
    /// Timestamp mode (context packets).
    pub tsm: bool,
    /// Integer timestamp kind; 1 = UTC.
    pub tsi: u8,
    /// Fractional timestamp kind; 2 = real-time picoseconds.
    pub tsf: u8,
}

impl HeaderFlags {
    pub fn for_data() -> Self {
        Self {
            class_id: false,
            trailer: true,
            tsm: false,
            tsi: layout::TSI_UTC,
            tsf: layout::TSF_REAL_TIME,
        }
    }

    pub fn for_context() -> Self {
        Self {
            class_id: false,
            trailer: false,
            tsm: true,
            tsi: layout::TSI_UTC,
            tsf: layout::TSF_REAL_TIME,
        }
    }
}

/// Decoded first word of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub packet_type: PacketType,
    pub flags: HeaderFlags,
    /// Modulo-16 sequence number.
    pub packet_count: u8,
    /// Packet length in words, prologue and trailer included.
    pub packet_size: u16,
}

impl Header {
    pub fn unpack(word: u32) -> Self {
        let code = ((word & layout::HEADER_TYPE_MASK) >> layout::HEADER_TYPE_SHIFT) as u8;
        Self {
            packet_type: PacketType::from_code(code),
            flags: HeaderFlags {
                class_id: word & layout::HEADER_CLASS_ID_BIT != 0,
                trailer: word & layout::HEADER_TRAILER_BIT != 0,
                tsm: word & layout::HEADER_TSM_BIT != 0,
                tsi: ((word >> layout::HEADER_TSI_SHIFT) & layout::HEADER_TIMESTAMP_KIND_MASK)
                    as u8,
                tsf: ((word >> layout::HEADER_TSF_SHIFT) & layout::HEADER_TIMESTAMP_KIND_MASK)
                    as u8,
            },
            packet_count: ((word & layout::HEADER_COUNT_MASK) >> layout::HEADER_COUNT_SHIFT) as u8,
            packet_size: (word & layout::HEADER_SIZE_MASK) as u16,
        }
    }

    /// Packs the header word. The packet count is taken modulo 16.
    pub fn pack(&self) -> u32 {
        let mut word = ((self.packet_type.code() as u32) << layout::HEADER_TYPE_SHIFT)
            & layout::HEADER_TYPE_MASK;
        if self.flags.class_id {
            word |= layout::HEADER_CLASS_ID_BIT;
        }
        if self.flags.trailer {
            word |= layout::HEADER_TRAILER_BIT;
        }
        if self.flags.tsm {
            word |= layout::HEADER_TSM_BIT;
        }
        word |= (self.flags.tsi as u32 & layout::HEADER_TIMESTAMP_KIND_MASK)
            << layout::HEADER_TSI_SHIFT;
        word |= (self.flags.tsf as u32 & layout::HEADER_TIMESTAMP_KIND_MASK)
            << layout::HEADER_TSF_SHIFT;
        word |= ((self.packet_count as u32) << layout::HEADER_COUNT_SHIFT)
            & layout::HEADER_COUNT_MASK;
        word | self.packet_size as u32
    }
}

/// Header word of a data packet with the default flag set.
pub fn pack_data_header(packet_count: u8, packet_size: u16) -> u32 {
    Header {
        packet_type: PacketType::Data,
        flags: HeaderFlags::for_data(),
        packet_count,
        packet_size,
    }
    .pack()
}

/// Header word of a context packet with the default flag set.
pub fn pack_context_header(packet_count: u8, packet_size: u16) -> u32 {
    Header {
        packet_type: PacketType::Context,
        flags: HeaderFlags::for_context(),
        packet_count,
        packet_size,
    }
    .pack()
}

/// Integer seconds plus a picosecond fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: u32,
    pub picoseconds: u64,
}

impl Timestamp {
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.picoseconds as f64 * 1e-12
    }

    /// Render as RFC 3339, treating `seconds` as a UNIX epoch timestamp.
    pub fn to_rfc3339(&self) -> Option<String> {
        let nanos = self.seconds as i128 * 1_000_000_000 + (self.picoseconds / 1_000) as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()
            .and_then(|dt| dt.format(&Rfc3339).ok())
    }
}

/// The five words common to every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prologue {
    pub header: Header,
    pub stream_id: u32,
    pub timestamp: Timestamp,
}

impl Prologue {
    pub fn read(reader: &mut WordReader<'_>) -> Result<Self, VrtError> {
        reader.require_len(layout::PROLOGUE_WORDS)?;
        let header = Header::unpack(reader.read_u32()?);
        let stream_id = reader.read_u32()?;
        let seconds = reader.read_u32()?;
        let upper = reader.read_u32()? as u64;
        let lower = reader.read_u32()? as u64;
        Ok(Self {
            header,
            stream_id,
            timestamp: Timestamp {
                seconds,
                picoseconds: (upper << 32) | lower,
            },
        })
    }

    /// Writes the prologue with `packet_size` and `packet_type` replacing the
    /// values stored in the header.
    pub fn write(&self, writer: &mut WordWriter, packet_type: PacketType, packet_size: u16) {
        let header = Header {
            packet_type,
            packet_size,
            ..self.header
        };
        writer.push_u32(header.pack());
        writer.push_u32(self.stream_id);
        writer.push_u32(self.timestamp.seconds);
        writer.push_u32((self.timestamp.picoseconds >> 32) as u32);
        writer.push_u32(self.timestamp.picoseconds as u32);
    }

    pub fn has_utc_timestamp(&self) -> bool {
        self.header.flags.tsi == layout::TSI_UTC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_header_with_size_eight() {
        let word = pack_context_header(0, 8);
        let header = Header::unpack(word);
        assert_eq!(header.packet_type, PacketType::Context);
        assert_eq!(header.packet_size, 8);
        assert!(header.flags.tsm);
        assert_eq!(header.flags.tsi, layout::TSI_UTC);
        assert_eq!(header.flags.tsf, layout::TSF_REAL_TIME);
    }

    #[test]
    fn data_header_bits_match_wire_layout() {
        let word = pack_data_header(3, 7);
        assert_eq!(word, 0x1000_0000 | 1 << 26 | 1 << 22 | 1 << 21 | 3 << 16 | 7);
        assert_eq!(Header::unpack(word).packet_count, 3);
    }

    #[test]
    fn packet_count_wraps_modulo_sixteen() {
        let header = Header::unpack(pack_data_header(17, 100));
        assert_eq!(header.packet_count, 1);
        assert_eq!(header.packet_size, 100);
    }

    #[test]
    fn header_pack_unpack_is_identity_for_valid_headers() {
        let header = Header {
            packet_type: PacketType::Data,
            flags: HeaderFlags {
                class_id: true,
                trailer: true,
                tsm: false,
                tsi: 3,
                tsf: 1,
            },
            packet_count: 15,
            packet_size: u16::MAX,
        };
        assert_eq!(Header::unpack(header.pack()), header);
    }

    #[test]
    fn unknown_type_code_is_invalid() {
        let header = Header::unpack(0x7000_0010);
        assert_eq!(header.packet_type, PacketType::Invalid(7));
    }

    #[test]
    fn prologue_reads_fractional_time_upper_word_first() {
        let words = [pack_data_header(0, 7), 42, 1_700_000_000, 0x1, 0x2];
        let mut reader = WordReader::new(&words);
        let prologue = Prologue::read(&mut reader).unwrap();
        assert_eq!(prologue.stream_id, 42);
        assert_eq!(prologue.timestamp.seconds, 1_700_000_000);
        assert_eq!(prologue.timestamp.picoseconds, (1u64 << 32) | 2);
        assert_eq!(reader.position(), layout::PROLOGUE_WORDS);
    }

    #[test]
    fn prologue_requires_five_words() {
        let words = [pack_data_header(0, 4), 1, 2, 3];
        let mut reader = WordReader::new(&words);
        assert_eq!(
            Prologue::read(&mut reader).unwrap_err(),
            VrtError::TruncatedBuffer {
                needed: 5,
                declared: 4
            }
        );
    }

    #[test]
    fn timestamp_renders_rfc3339() {
        let ts = Timestamp {
            seconds: 0,
            picoseconds: 500_000_000_000,
        };
        let rendered = ts.to_rfc3339().unwrap();
        assert!(rendered.starts_with("1970-01-01T00:00:00.5"), "{rendered}");
        assert!((ts.as_secs_f64() - 0.5).abs() < 1e-12);
    }
}
