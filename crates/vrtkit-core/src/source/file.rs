use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use byteorder::{NativeEndian, ReadBytesExt};

use super::{SourceError, WordSource};

const WORD_BYTES: u64 = 4;

/// Capture file of back-to-back packets, stored as big-endian 32-bit words.
///
/// Words are returned with their file bytes unchanged in memory, which is
/// the wire order the codec expects.
pub struct WordFileSource<R = BufReader<File>> {
    reader: R,
    remaining: u64,
    position: u64,
}

impl WordFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Self::from_reader(BufReader::new(file), len)
    }
}

impl<R: Read> WordFileSource<R> {
    /// Wraps `reader`, which must yield exactly `len_bytes` bytes.
    pub fn from_reader(reader: R, len_bytes: u64) -> Result<Self, SourceError> {
        if len_bytes % WORD_BYTES != 0 {
            return Err(SourceError::UnalignedLength { len: len_bytes });
        }
        Ok(Self {
            reader,
            remaining: len_bytes / WORD_BYTES,
            position: 0,
        })
    }
}

impl<R: Read> WordSource for WordFileSource<R> {
    fn read_words(&mut self, count: usize) -> Result<Option<Vec<u32>>, SourceError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        if count as u64 > self.remaining {
            return Err(SourceError::UnexpectedEof {
                wanted: count,
                available: self.remaining as usize,
            });
        }
        let mut words = vec![0u32; count];
        self.reader.read_u32_into::<NativeEndian>(&mut words)?;
        self.remaining -= count as u64;
        self.position += count as u64;
        Ok(Some(words))
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn words_keep_file_byte_order() {
        let bytes = vec![0x10, 0x00, 0x00, 0x07, 0xAA, 0xBB, 0xCC, 0xDD];
        let mut source = WordFileSource::from_reader(Cursor::new(bytes), 8).unwrap();
        let words = source.read_words(2).unwrap().unwrap();
        assert_eq!(u32::from_be(words[0]), 0x1000_0007);
        assert_eq!(words[1].to_ne_bytes(), [0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(source.position(), 2);
        assert!(source.read_words(1).unwrap().is_none());
    }

    #[test]
    fn request_past_end_is_unexpected_eof() {
        let mut source = WordFileSource::from_reader(Cursor::new(vec![0u8; 12]), 12).unwrap();
        source.read_words(1).unwrap();
        assert!(matches!(
            source.read_words(5),
            Err(SourceError::UnexpectedEof {
                wanted: 5,
                available: 2
            })
        ));
    }

    #[test]
    fn unaligned_length_is_rejected() {
        assert!(matches!(
            WordFileSource::from_reader(Cursor::new(vec![0u8; 6]), 6),
            Err(SourceError::UnalignedLength { len: 6 })
        ));
    }
}
