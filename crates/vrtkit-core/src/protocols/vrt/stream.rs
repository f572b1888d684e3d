use super::error::VrtError;
use super::peek::peek;
use super::prologue::PacketType;

/// Splits a buffer of back-to-back packets (wire order) using each packet's
/// declared size.
///
/// Yields `(type, words)` for every packet, including packets with an
/// unknown type code, so the caller can decide to skip them. A declared size
/// of zero or one that overruns the buffer yields a single
/// [`VrtError::Desynchronized`] and ends the iteration.
///
/// # Examples
/// ```
/// use vrtkit_core::protocols::vrt::{PacketStream, PacketType, pack_context_header, pack_data_header};
///
/// let mut wire = vec![pack_context_header(0, 6).to_be(), 0, 0, 0, 0, 0];
/// wire.extend([pack_data_header(0, 6).to_be(), 0, 0, 0, 0, 0]);
///
/// let kinds: Vec<PacketType> = PacketStream::new(&wire)
///     .map(|packet| packet.unwrap().0)
///     .collect();
/// assert_eq!(kinds, [PacketType::Context, PacketType::Data]);
/// ```
pub struct PacketStream<'a> {
    words: &'a [u32],
    offset: usize,
    failed: bool,
}

impl<'a> PacketStream<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self {
            words,
            offset: 0,
            failed: false,
        }
    }

    /// Word offset of the next packet.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for PacketStream<'a> {
    type Item = Result<(PacketType, &'a [u32]), VrtError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let rest = self.words.get(self.offset..).filter(|rest| !rest.is_empty())?;
        let peeked = match peek(rest) {
            Ok(peeked) => peeked,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };
        let size = peeked.size_in_words;
        if size == 0 || size > rest.len() {
            self.failed = true;
            return Some(Err(VrtError::Desynchronized {
                declared: size,
                available: rest.len(),
            }));
        }
        self.offset += size;
        Some(Ok((peeked.packet_type, &rest[..size])))
    }
}
