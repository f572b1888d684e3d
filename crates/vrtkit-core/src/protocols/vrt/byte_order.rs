//! Conversion between wire byte order (big-endian) and host order.
//!
//! A "wire word" is a `u32` whose in-memory bytes are exactly the bytes seen
//! on the wire. [`normalize`] turns wire words into host values and back; it
//! is an involution, so the same call serves both directions.

use byteorder::{ByteOrder, NativeEndian};

use super::error::VrtError;

/// Converts every word between wire order and host order.
///
/// # Examples
/// ```
/// use vrtkit_core::protocols::vrt::normalize;
///
/// let wire = [0x1234_5678u32.to_be()];
/// assert_eq!(normalize(&wire), vec![0x1234_5678]);
/// assert_eq!(normalize(&normalize(&wire)), wire.to_vec());
/// ```
pub fn normalize(words: &[u32]) -> Vec<u32> {
    words.iter().map(|&word| normalize_word(word)).collect()
}

/// In-place variant of [`normalize`].
pub fn normalize_in_place(words: &mut [u32]) {
    for word in words.iter_mut() {
        *word = normalize_word(*word);
    }
}

#[inline]
pub fn normalize_word(word: u32) -> u32 {
    u32::from_be(word)
}

/// Reinterprets a byte buffer as wire words without reordering bytes.
///
/// # Errors
/// Returns [`VrtError::UnalignedBytes`] when the length is not a multiple of
/// four.
pub fn words_from_wire_bytes(bytes: &[u8]) -> Result<Vec<u32>, VrtError> {
    if bytes.len() % 4 != 0 {
        return Err(VrtError::UnalignedBytes { len: bytes.len() });
    }
    let mut words = vec![0u32; bytes.len() / 4];
    NativeEndian::read_u32_into(bytes, &mut words);
    Ok(words)
}

/// Flattens wire words back into the byte sequence seen on the wire.
pub fn wire_bytes_from_words(words: &[u32]) -> Vec<u8> {
    let mut bytes = vec![0u8; words.len() * 4];
    NativeEndian::write_u32_into(words, &mut bytes);
    bytes
}
