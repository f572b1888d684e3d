//! Protocol decoding modules.
//!
//! The VRT codec follows a layered structure:
//! - `layout`: word offsets, bit positions and widths (source of truth)
//! - `reader` / `writer`: bounds-checked word access in host order
//! - `data` / `context`: packet-level decoding and encoding
//! - `error`: explicit errors that say whether the stream can be resumed
//!
//! Codecs are pure and contain no I/O; sources and the analysis layer handle
//! file access and aggregation.

pub mod vrt;
