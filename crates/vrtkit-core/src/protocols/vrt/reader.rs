use super::error::VrtError;

/// Bounds-checked cursor over the host-order words of one packet.
///
/// Every read is checked against the packet's declared size; reading past it
/// yields [`VrtError::TruncatedBuffer`] rather than a panic.
pub struct WordReader<'a> {
    words: &'a [u32],
    cursor: usize,
}

impl<'a> WordReader<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self { words, cursor: 0 }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.cursor
    }

    pub fn require_len(&self, needed: usize) -> Result<(), VrtError> {
        if self.words.len() < needed {
            return Err(self.truncated(needed));
        }
        Ok(())
    }

    pub fn read_u32(&mut self) -> Result<u32, VrtError> {
        let word = self
            .words
            .get(self.cursor)
            .copied()
            .ok_or_else(|| self.truncated(self.cursor + 1))?;
        self.cursor += 1;
        Ok(word)
    }

    /// Signed 16-bit value held in the low half of the next word.
    pub fn read_low_i16(&mut self) -> Result<i16, VrtError> {
        Ok(self.read_u32()? as u16 as i16)
    }

    /// 64-bit value spread over two words, low word first.
    pub fn read_u64(&mut self) -> Result<u64, VrtError> {
        let low = self.read_u32()? as u64;
        let high = self.read_u32()? as u64;
        Ok((high << 32) | low)
    }

    pub fn read_i64(&mut self) -> Result<i64, VrtError> {
        Ok(self.read_u64()? as i64)
    }

    /// Borrow the next `count` words and advance past them.
    pub fn read_slice(&mut self, count: usize) -> Result<&'a [u32], VrtError> {
        let end = self
            .cursor
            .checked_add(count)
            .ok_or_else(|| self.truncated(usize::MAX))?;
        let words: &'a [u32] = self.words;
        let slice = words
            .get(self.cursor..end)
            .ok_or_else(|| self.truncated(end))?;
        self.cursor = end;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u32; N], VrtError> {
        let mut out = [0u32; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, count: usize) -> Result<(), VrtError> {
        self.read_slice(count).map(|_| ())
    }

    fn truncated(&self, needed: usize) -> VrtError {
        VrtError::TruncatedBuffer {
            needed,
            declared: self.words.len(),
        }
    }
}
