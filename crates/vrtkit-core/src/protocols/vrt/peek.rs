use serde::Serialize;

use super::byte_order::normalize_word;
use super::error::VrtError;
use super::prologue::{Header, PacketType};

/// Classification of a candidate packet from its header word alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PacketPeek {
    pub packet_type: PacketType,
    pub size_in_words: usize,
}

/// Reads the first wire word of `words` and reports the packet kind and its
/// declared size. Nothing past the first word is inspected.
///
/// # Errors
/// Returns [`VrtError::Desynchronized`] when `words` is empty.
///
/// # Examples
/// ```
/// use vrtkit_core::protocols::vrt::{PacketType, pack_context_header, peek};
///
/// let wire = [pack_context_header(0, 8).to_be()];
/// let peeked = peek(&wire).unwrap();
/// assert_eq!(peeked.packet_type, PacketType::Context);
/// assert_eq!(peeked.size_in_words, 8);
/// ```
pub fn peek(words: &[u32]) -> Result<PacketPeek, VrtError> {
    let first = words.first().copied().ok_or(VrtError::Desynchronized {
        declared: 0,
        available: 0,
    })?;
    let header = Header::unpack(normalize_word(first));
    Ok(PacketPeek {
        packet_type: header.packet_type,
        size_in_words: header.packet_size as usize,
    })
}
