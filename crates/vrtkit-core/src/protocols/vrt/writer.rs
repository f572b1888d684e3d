use super::byte_order::normalize_in_place;

/// Host-order word sink used by the encoders.
///
/// Mirrors [`super::reader::WordReader`]: 16-bit values go in the low half of
/// a word and 64-bit values are written low word first.
#[derive(Debug, Default)]
pub struct WordWriter {
    words: Vec<u32>,
}

impl WordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn push_u32(&mut self, word: u32) {
        self.words.push(word);
    }

    pub fn push_i32(&mut self, value: i32) {
        self.words.push(value as u32);
    }

    pub fn push_low_i16(&mut self, value: i16) {
        self.words.push(value as u16 as u32);
    }

    pub fn push_u64(&mut self, value: u64) {
        self.words.push(value as u32);
        self.words.push((value >> 32) as u32);
    }

    pub fn push_i64(&mut self, value: i64) {
        self.push_u64(value as u64);
    }

    pub fn extend(&mut self, words: &[u32]) {
        self.words.extend_from_slice(words);
    }

    pub fn push_zeros(&mut self, count: usize) {
        self.words.resize(self.words.len() + count, 0);
    }

    /// Overwrite an already written word (used to patch the header size).
    pub fn set(&mut self, index: usize, word: u32) {
        if let Some(slot) = self.words.get_mut(index) {
            *slot = word;
        }
    }

    pub fn into_host_words(self) -> Vec<u32> {
        self.words
    }

    /// Consume the writer and return the words in wire order.
    pub fn into_wire_words(self) -> Vec<u32> {
        let mut words = self.words;
        normalize_in_place(&mut words);
        words
    }
}

#[cfg(test)]
mod tests {
    use super::WordWriter;
    use crate::protocols::vrt::reader::WordReader;

    #[test]
    fn writer_output_reads_back() {
        let mut writer = WordWriter::new();
        writer.push_u32(7);
        writer.push_low_i16(-1280);
        writer.push_i64(-3);
        writer.push_zeros(2);
        let words = writer.into_host_words();
        assert_eq!(words.len(), 6);

        let mut reader = WordReader::new(&words);
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.read_low_i16().unwrap(), -1280);
        assert_eq!(reader.read_i64().unwrap(), -3);
        assert_eq!(reader.read_array::<2>().unwrap(), [0, 0]);
    }

    #[test]
    fn set_patches_existing_words_only() {
        let mut writer = WordWriter::new();
        writer.push_u32(0);
        writer.set(0, 9);
        writer.set(5, 1);
        assert_eq!(writer.into_host_words(), vec![9]);
    }

    #[test]
    fn wire_words_are_big_endian() {
        let mut writer = WordWriter::new();
        writer.push_u32(0x0102_0304);
        let wire = writer.into_wire_words();
        assert_eq!(wire[0].to_ne_bytes(), [1, 2, 3, 4]);
    }
}
