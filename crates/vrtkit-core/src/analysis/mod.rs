use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocols::vrt::{
    ContextPacket, DataPacket, DecodeOptions, PacketType, Timestamp, VrtError, decode_context,
    decode_data, peek,
};
use crate::source::{SourceError, WordFileSource, WordSource};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Issue, Report, make_stub_report};

mod streams;

use streams::{StreamStats, build_stream_summaries};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn analyze_capture_file(path: &Path, options: &DecodeOptions) -> Result<Report, AnalysisError> {
    let source = WordFileSource::open(path)?;
    analyze_source(path, source, options)
}

/// Drains `source` packet by packet and aggregates a report.
///
/// Packets that fail to decode but declare a usable size are skipped and
/// recorded as issues. A size of zero, or a packet cut short by the end of
/// input, ends the drain with an issue since no later packet boundary can be
/// trusted. Only I/O failures of the source are returned as errors.
pub fn analyze_source<S: WordSource>(
    path: &Path,
    mut source: S,
    options: &DecodeOptions,
) -> Result<Report, AnalysisError> {
    let mut summary = CaptureSummary::default();
    let mut first_ts = None;
    let mut last_ts = None;
    let mut streams: HashMap<u32, StreamStats> = HashMap::new();
    let mut issues = Vec::new();
    let mut reference_level_dbm = options.initial_reference_level_dbm;

    loop {
        let offset = source.position();
        let words = match read_packet(&mut source)? {
            Drained::End => break,
            Drained::Packet(words) => words,
            Drained::Desynchronized(message) => {
                warn!(offset, "stopping: {message}");
                issues.push(Issue::error(offset, message));
                break;
            }
        };
        summary.packets_total += 1;
        summary.words_total += words.len() as u64;
        let size = words.len();

        let packet_type = match peek(&words) {
            Ok(peeked) => peeked.packet_type,
            Err(err) => {
                issues.push(Issue::error(offset, err.to_string()));
                break;
            }
        };
        let decoded = match packet_type {
            PacketType::Data => {
                decode_data(&words, size, reference_level_dbm).map(Decoded::Data)
            }
            PacketType::Context => decode_context(&words, size, options).map(Decoded::Context),
            PacketType::Invalid(code) => Err(VrtError::InvalidPacketType {
                code,
                declared: size,
            }),
        };

        match decoded {
            Ok(Decoded::Data(packet)) => {
                summary.data_packets += 1;
                summary.samples_total += packet.sample_count() as u64;
                update_ts_bounds(&mut first_ts, &mut last_ts, &packet.prologue);
                streams
                    .entry(packet.prologue.stream_id)
                    .or_default()
                    .add_data(&packet);
            }
            Ok(Decoded::Context(packet)) => {
                summary.context_packets += 1;
                let trailing = packet.trailing_words();
                if trailing > 0 {
                    warn!(offset, size, trailing, "context fields end before the packet");
                    issues.push(Issue::warning(
                        offset,
                        format!(
                            "context packet declares {size} words but its fields use {}; {trailing} trailing words ignored",
                            packet.consumed_words
                        ),
                    ));
                }
                update_ts_bounds(&mut first_ts, &mut last_ts, &packet.prologue);
                if let Some(level) = packet.fields.reference_level_dbm {
                    debug!(
                        stream_id = packet.prologue.stream_id,
                        level, "reference level updated"
                    );
                    reference_level_dbm = level;
                }
                streams
                    .entry(packet.prologue.stream_id)
                    .or_default()
                    .add_context(&packet);
            }
            Err(err) => {
                if matches!(err, VrtError::InvalidPacketType { .. }) {
                    summary.invalid_packets += 1;
                }
                if err.is_fatal() {
                    warn!(offset, "stopping: {err}");
                    issues.push(Issue::error(offset, err.to_string()));
                    break;
                }
                warn!(offset, size, "skipping packet: {err}");
                issues.push(Issue::warning(offset, err.to_string()));
            }
        }
    }

    summary.time_start = first_ts.and_then(|ts: Timestamp| ts.to_rfc3339());
    summary.time_end = last_ts.and_then(|ts: Timestamp| ts.to_rfc3339());

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.generated_at = summary
        .time_end
        .clone()
        .or_else(|| summary.time_start.clone())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.summary = summary;
    report.streams = build_stream_summaries(streams);
    report.issues = issues;
    Ok(report)
}

enum Decoded {
    Data(DataPacket),
    Context(ContextPacket),
}

enum Drained {
    End,
    Packet(Vec<u32>),
    Desynchronized(String),
}

/// Reads the header word, then the rest of the packet it announces.
fn read_packet<S: WordSource>(source: &mut S) -> Result<Drained, SourceError> {
    let Some(mut words) = source.read_words(1)? else {
        return Ok(Drained::End);
    };
    let size = match peek(&words) {
        Ok(peeked) => peeked.size_in_words,
        Err(err) => return Ok(Drained::Desynchronized(err.to_string())),
    };
    if size == 0 {
        return Ok(Drained::Desynchronized(
            "packet declares a size of zero words".to_string(),
        ));
    }
    if size == 1 {
        return Ok(Drained::Packet(words));
    }

    match source.read_words(size - 1) {
        Ok(Some(rest)) => {
            words.extend(rest);
            Ok(Drained::Packet(words))
        }
        Ok(None) => Ok(Drained::Desynchronized(
            VrtError::Desynchronized {
                declared: size,
                available: 1,
            }
            .to_string(),
        )),
        Err(SourceError::UnexpectedEof { available, .. }) => Ok(Drained::Desynchronized(
            VrtError::Desynchronized {
                declared: size,
                available: available + 1,
            }
            .to_string(),
        )),
        Err(err) => Err(err),
    }
}

fn update_ts_bounds(
    first: &mut Option<Timestamp>,
    last: &mut Option<Timestamp>,
    prologue: &crate::protocols::vrt::Prologue,
) {
    if !prologue.has_utc_timestamp() {
        return;
    }
    let ts = prologue.timestamp;
    let key = |ts: &Timestamp| (ts.seconds, ts.picoseconds);
    if first.as_ref().is_none_or(|existing| key(&ts) < key(existing)) {
        *first = Some(ts);
    }
    if last.as_ref().is_none_or(|existing| key(&ts) > key(existing)) {
        *last = Some(ts);
    }
}
