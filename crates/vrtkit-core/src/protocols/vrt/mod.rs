//! VITA-49 style data and context packet codec.
//!
//! Packets are sequences of 32-bit words, big-endian on the wire. Every
//! decoder takes wire-order words plus the caller's declared packet size,
//! normalizes a private copy to host order and walks it with a bounds-checked
//! [`reader::WordReader`]; encoders build host-order words with
//! [`writer::WordWriter`] and hand back wire order. Nothing here performs I/O
//! or keeps state between calls: the reference level that scales data
//! samples is an explicit argument, threaded by the caller from the last
//! context packet it saw.
//!
//! Bit positions and field widths live in `layout`; fixed-point formats live
//! in `fixed_point`. Decoders and encoders only refer to those names.

pub mod byte_order;
pub mod context;
pub mod data;
pub mod error;
pub mod fixed_point;
pub mod geolocation;
pub mod layout;
pub mod nmea;
pub mod options;
pub mod peek;
pub mod prologue;
pub mod reader;
pub mod stream;
pub mod trailer;
pub mod writer;

pub use byte_order::{normalize, normalize_in_place, wire_bytes_from_words, words_from_wire_bytes};
pub use context::{
    ContextFields, ContextPacket, DeviceId, decode_context, encode_context,
    pack_context_indicator_word,
};
pub use data::{DataPacket, decode_data, encode_data, sample_scale};
pub use error::VrtError;
pub use geolocation::Geolocation;
pub use options::{DecodeOptions, GeolocationSlot};
pub use peek::{PacketPeek, peek};
pub use prologue::{
    Header, HeaderFlags, PacketType, Prologue, Timestamp, pack_context_header, pack_data_header,
};
pub use stream::PacketStream;
pub use trailer::{Trailer, TrailerFlag};
