use thiserror::Error;

/// Errors returned by VRT packet decoding and encoding.
///
/// Decode errors that still trust the declared packet size carry it, so a
/// caller draining a stream can skip exactly that many words. A declared size
/// that is zero or larger than the supplied buffer is reported as
/// [`VrtError::Desynchronized`]; the stream cannot be resumed from there.
///
/// # Examples
/// ```
/// use vrtkit_core::VrtError;
///
/// let err = VrtError::TruncatedBuffer { needed: 9, declared: 8 };
/// assert_eq!(err.resync_words(), Some(8));
/// assert!(!err.is_fatal());
///
/// let err = VrtError::Desynchronized { declared: 0, available: 12 };
/// assert_eq!(err.resync_words(), None);
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VrtError {
    #[error("invalid packet type code: {code}")]
    InvalidPacketType { code: u8, declared: usize },
    #[error("truncated packet: need {needed} words, packet declares {declared}")]
    TruncatedBuffer { needed: usize, declared: usize },
    #[error("stream desynchronized: packet declares {declared} words, {available} available")]
    Desynchronized { declared: usize, available: usize },
    #[error("malformed packet ({declared} words): {reason}")]
    MalformedPacket {
        declared: usize,
        reason: &'static str,
    },
    #[error("{field} value {value} overflows its fixed-point encoding")]
    ArithmeticOverflow { field: &'static str, value: f64 },
    #[error("{field} value {value} exceeds maximum {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("packet too large: {words} words")]
    PacketTooLarge { words: usize },
    #[error("byte buffer of {len} bytes is not a whole number of words")]
    UnalignedBytes { len: usize },
    #[error("invalid NMEA sentence: {reason}")]
    InvalidSentence { reason: &'static str },
}

impl VrtError {
    /// Number of words to skip to reach the next packet, when known.
    pub fn resync_words(&self) -> Option<usize> {
        match self {
            VrtError::InvalidPacketType { declared, .. }
            | VrtError::TruncatedBuffer { declared, .. }
            | VrtError::MalformedPacket { declared, .. } => Some(*declared),
            _ => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, VrtError::Desynchronized { .. })
    }
}
