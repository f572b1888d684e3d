//! Word sources feeding the analysis layer.
//!
//! A source hands out exactly the number of wire-order words requested, or
//! `None` once the input is cleanly exhausted. Running out of input in the
//! middle of a request is an error: the caller asked for the rest of a
//! packet whose header it already read.

mod file;
mod slice;

pub use file::WordFileSource;
pub use slice::SliceWordSource;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input ended mid-packet: wanted {wanted} words, {available} left")]
    UnexpectedEof { wanted: usize, available: usize },
    #[error("input is {len} bytes, not a whole number of 32-bit words")]
    UnalignedLength { len: u64 },
}

pub trait WordSource {
    /// Returns the next `count` words in wire order, `None` at end of input.
    fn read_words(&mut self, count: usize) -> Result<Option<Vec<u32>>, SourceError>;

    /// Word offset of the next read.
    fn position(&self) -> u64;
}
