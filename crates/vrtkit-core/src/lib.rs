//! vrtkit core library: VITA-49 style packet codec and capture analysis.
//!
//! The crate has three layers:
//! - `protocols::vrt`: a pure, stateless codec for data and context packets
//!   (byte order, fixed-point fields, trailer, context field table).
//! - `source`: word sources that hand out wire-order words, from a capture
//!   file or from memory. All file I/O lives here.
//! - `analysis`: drains a source packet by packet, threads the reference
//!   level from context packets into data packet scaling, and aggregates a
//!   deterministic report.
//!
//! Invariants:
//! - Decoders never read past the declared packet size; a bad size surfaces
//!   as an error that says whether the stream can be resumed.
//! - Report output is deterministic: streams are sorted by identifier and
//!   issues appear in input order.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use vrtkit_core::{DecodeOptions, analyze_capture_file};
//!
//! let report = analyze_capture_file(Path::new("capture.vrt"), &DecodeOptions::default())?;
//! println!("report version: {}", report.report_version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_capture_file, analyze_source};
pub use protocols::vrt::{ContextFields, DecodeOptions, GeolocationSlot, VrtError};
pub use source::{SliceWordSource, SourceError, WordFileSource, WordSource};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated analysis report with deterministic ordering.
///
/// # Examples
/// ```
/// use vrtkit_core::make_stub_report;
///
/// let report = make_stub_report("capture.vrt", 128);
/// assert_eq!(report.report_version, vrtkit_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the last packet, or the epoch when unknown.
    pub generated_at: String,
    /// Input capture metadata.
    pub input: InputInfo,
    /// Packet and sample totals.
    pub summary: CaptureSummary,
    /// Per-stream summaries sorted by stream identifier.
    pub streams: Vec<StreamSummary>,
    /// Skipped packets and the reason the drain stopped early, in input order.
    pub issues: Vec<Issue>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use vrtkit_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "vrtkit".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "vrtkit");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Capture-wide totals. Timestamps come from UTC-coded packet prologues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub packets_total: u64,
    pub data_packets: u64,
    pub context_packets: u64,
    /// Packets with an unrecognized type code.
    pub invalid_packets: u64,
    /// Words consumed from the input, headers included.
    pub words_total: u64,
    /// I/Q pairs decoded from data packets.
    pub samples_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Per-stream metrics.
///
/// # Examples
/// ```
/// use vrtkit_core::StreamSummary;
///
/// let stream = StreamSummary {
///     stream_id: 1,
///     data_packets: 10,
///     context_packets: 1,
///     sequence_gaps: 0,
///     samples: 2560,
///     invalid_data: 0,
///     over_range: 0,
///     sample_loss: 0,
///     reference_unlocked: 0,
///     peak_magnitude: Some(0.25),
///     reference_level_dbm: Some(-20.0),
///     context: None,
/// };
/// assert_eq!(stream.stream_id, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSummary {
    pub stream_id: u32,
    pub data_packets: u64,
    pub context_packets: u64,
    /// Packets missing from the modulo-16 packet count, per packet kind.
    pub sequence_gaps: u64,
    pub samples: u64,
    /// Data packets whose trailer reports invalid data.
    pub invalid_data: u64,
    /// Data packets whose trailer reports an over-range condition.
    pub over_range: u64,
    /// Data packets whose trailer reports sample loss.
    pub sample_loss: u64,
    /// Data packets whose trailer reports the reference as unlocked.
    pub reference_unlocked: u64,
    /// Largest scaled sample magnitude seen on the stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_magnitude: Option<f32>,
    /// Reference level applied to the stream's most recent data packet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_level_dbm: Option<f64>,
    /// Latest value of every context field seen on the stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextFields>,
}

/// Problem found while draining the capture.
///
/// # Examples
/// ```
/// use vrtkit_core::Issue;
///
/// let issue = Issue::warning(12, "invalid packet type code: 7");
/// assert_eq!(issue.severity, "warning");
/// assert_eq!(issue.word_offset, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Offset of the packet's header word from the start of the input.
    pub word_offset: u64,
    /// `error` when the drain stopped here, `warning` when the packet was skipped.
    pub severity: String,
    pub message: String,
}

impl Issue {
    pub fn error(word_offset: u64, message: impl Into<String>) -> Self {
        Self {
            word_offset,
            severity: "error".to_string(),
            message: message.into(),
        }
    }

    pub fn warning(word_offset: u64, message: impl Into<String>) -> Self {
        Self {
            word_offset,
            severity: "warning".to_string(),
            message: message.into(),
        }
    }
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use vrtkit_core::make_stub_report;
///
/// let report = make_stub_report("capture.vrt", 128);
/// assert_eq!(report.input.bytes, 128);
/// assert!(report.streams.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "vrtkit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: CaptureSummary::default(),
        streams: vec![],
        issues: vec![],
    }
}
