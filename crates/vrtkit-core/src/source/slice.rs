use super::{SourceError, WordSource};

/// In-memory word source over a wire-order buffer.
pub struct SliceWordSource<'a> {
    words: &'a [u32],
    offset: usize,
}

impl<'a> SliceWordSource<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self { words, offset: 0 }
    }
}

impl WordSource for SliceWordSource<'_> {
    fn read_words(&mut self, count: usize) -> Result<Option<Vec<u32>>, SourceError> {
        let rest = &self.words[self.offset..];
        if rest.is_empty() {
            return Ok(None);
        }
        let chunk = rest.get(..count).ok_or(SourceError::UnexpectedEof {
            wanted: count,
            available: rest.len(),
        })?;
        self.offset += count;
        Ok(Some(chunk.to_vec()))
    }

    fn position(&self) -> u64 {
        self.offset as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_out_exact_chunks_then_none() {
        let words = [1u32, 2, 3];
        let mut source = SliceWordSource::new(&words);
        assert_eq!(source.read_words(2).unwrap(), Some(vec![1, 2]));
        assert!(matches!(
            source.read_words(2),
            Err(SourceError::UnexpectedEof { wanted: 2, available: 1 })
        ));
        assert_eq!(source.read_words(1).unwrap(), Some(vec![3]));
        assert_eq!(source.read_words(1).unwrap(), None);
        assert_eq!(source.position(), 3);
    }
}
