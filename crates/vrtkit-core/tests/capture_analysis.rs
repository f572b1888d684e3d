use std::fs;
use std::path::PathBuf;

use num_complex::Complex;
use tempfile::TempDir;
use vrtkit_core::protocols::vrt::{
    ContextFields, ContextPacket, DataPacket, Geolocation, Header, HeaderFlags, PacketType,
    Prologue, Timestamp, Trailer, encode_context, encode_data, pack_data_header,
    wire_bytes_from_words,
};
use vrtkit_core::{DecodeOptions, analyze_capture_file};

fn prologue(packet_type: PacketType, stream_id: u32, packet_count: u8, seconds: u32) -> Prologue {
    let flags = match packet_type {
        PacketType::Context => HeaderFlags::for_context(),
        _ => HeaderFlags::for_data(),
    };
    Prologue {
        header: Header {
            packet_type,
            flags,
            packet_count,
            packet_size: 0,
        },
        stream_id,
        timestamp: Timestamp {
            seconds,
            picoseconds: 0,
        },
    }
}

fn data(stream_id: u32, count: u8, raw: Vec<Complex<i16>>, trailer: Trailer) -> Vec<u32> {
    let packet = DataPacket::from_raw(
        prologue(PacketType::Data, stream_id, count, 1_700_000_000 + count as u32),
        raw,
        trailer,
        0.0,
    );
    encode_data(&packet).expect("encode data")
}

fn context(stream_id: u32, count: u8, fields: ContextFields, options: &DecodeOptions) -> Vec<u32> {
    let packet = ContextPacket::new(
        prologue(PacketType::Context, stream_id, count, 1_700_000_000),
        fields,
    );
    encode_context(&packet, options).expect("encode context")
}

fn write_capture(dir: &TempDir, packets: &[Vec<u32>]) -> PathBuf {
    let words: Vec<u32> = packets.concat();
    let path = dir.path().join("capture.vrt");
    fs::write(&path, wire_bytes_from_words(&words)).expect("write capture");
    path
}

fn valid_trailer() -> Trailer {
    Trailer::with_all_flags(true, true, true, false, false, 0)
}

#[test]
fn reference_level_from_context_scales_later_data() {
    let dir = TempDir::new().unwrap();
    let options = DecodeOptions::default();
    let path = write_capture(
        &dir,
        &[
            data(1, 0, vec![Complex::new(16384, 0)], valid_trailer()),
            context(
                1,
                0,
                ContextFields {
                    reference_level_dbm: Some(-20.0),
                    ..ContextFields::default()
                },
                &options,
            ),
            data(1, 1, vec![Complex::new(16384, -16384)], valid_trailer()),
        ],
    );

    let report = analyze_capture_file(&path, &options).unwrap();
    assert_eq!(report.summary.packets_total, 3);
    assert_eq!(report.summary.data_packets, 2);
    assert_eq!(report.summary.context_packets, 1);
    assert_eq!(report.summary.samples_total, 2);
    assert_eq!(report.summary.words_total, 7 + 7 + 7);
    assert!(report.issues.is_empty());

    let stream = &report.streams[0];
    assert_eq!(stream.stream_id, 1);
    assert_eq!(stream.reference_level_dbm, Some(-20.0));
    // First packet was scaled at 0 dBm: 0.5 full scale.
    let peak = stream.peak_magnitude.unwrap();
    assert!((peak - 0.5).abs() < 1e-6, "{peak}");
    let context = stream.context.as_ref().unwrap();
    assert_eq!(context.reference_level_dbm, Some(-20.0));
}

#[test]
fn initial_reference_level_applies_before_any_context() {
    let dir = TempDir::new().unwrap();
    let options = DecodeOptions::default().with_reference_level(-20.0);
    let path = write_capture(
        &dir,
        &[data(3, 0, vec![Complex::new(32767, 0)], valid_trailer())],
    );

    let report = analyze_capture_file(&path, &options).unwrap();
    let stream = &report.streams[0];
    assert_eq!(stream.reference_level_dbm, Some(-20.0));
    assert!(stream.peak_magnitude.unwrap() < 0.11);
}

#[test]
fn sequence_gaps_and_trailer_counters_per_stream() {
    let dir = TempDir::new().unwrap();
    let bad = Trailer::with_all_flags(false, false, false, true, true, 0);
    let path = write_capture(
        &dir,
        &[
            data(7, 14, vec![], valid_trailer()),
            data(2, 0, vec![], valid_trailer()),
            data(7, 15, vec![], bad.clone()),
            data(7, 2, vec![], valid_trailer()),
            data(2, 1, vec![], bad),
        ],
    );

    let report = analyze_capture_file(&path, &DecodeOptions::default()).unwrap();
    let ids: Vec<u32> = report.streams.iter().map(|s| s.stream_id).collect();
    assert_eq!(ids, vec![2, 7]);

    let seven = &report.streams[1];
    assert_eq!(seven.data_packets, 3);
    assert_eq!(seven.sequence_gaps, 2);
    assert_eq!(seven.invalid_data, 1);
    assert_eq!(seven.over_range, 1);
    assert_eq!(seven.sample_loss, 1);
    assert_eq!(seven.reference_unlocked, 1);
    assert_eq!(seven.peak_magnitude, None);

    let two = &report.streams[0];
    assert_eq!(two.sequence_gaps, 0);
    assert_eq!(two.invalid_data, 1);
}

#[test]
fn invalid_packet_is_skipped_and_reported() {
    let dir = TempDir::new().unwrap();
    let mut unknown = vec![(0x7000_0000u32 | 6).to_be()];
    unknown.extend([0u32; 5]);
    let path = write_capture(
        &dir,
        &[
            data(1, 0, vec![Complex::new(1, 1)], valid_trailer()),
            unknown,
            data(1, 1, vec![Complex::new(1, 1)], valid_trailer()),
        ],
    );

    let report = analyze_capture_file(&path, &DecodeOptions::default()).unwrap();
    assert_eq!(report.summary.packets_total, 3);
    assert_eq!(report.summary.invalid_packets, 1);
    assert_eq!(report.summary.data_packets, 2);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].word_offset, 7);
    assert_eq!(report.issues[0].severity, "warning");
    assert!(report.issues[0].message.contains("invalid packet type code: 7"));
}

#[test]
fn malformed_data_packet_is_skipped_by_declared_size() {
    let dir = TempDir::new().unwrap();
    // Five words cannot hold a prologue and a trailer.
    let mut short = vec![pack_data_header(0, 5).to_be()];
    short.extend([0u32; 4]);
    let path = write_capture(
        &dir,
        &[short, data(1, 1, vec![Complex::new(2, 2)], valid_trailer())],
    );

    let report = analyze_capture_file(&path, &DecodeOptions::default()).unwrap();
    assert_eq!(report.summary.data_packets, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].word_offset, 0);
}

#[test]
fn truncated_final_packet_stops_with_error_issue() {
    let dir = TempDir::new().unwrap();
    let mut last = data(1, 1, vec![Complex::new(0, 0); 8], valid_trailer());
    last.truncate(6);
    let path = write_capture(
        &dir,
        &[data(1, 0, vec![Complex::new(0, 0)], valid_trailer()), last],
    );

    let report = analyze_capture_file(&path, &DecodeOptions::default()).unwrap();
    assert_eq!(report.summary.packets_total, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].severity, "error");
    assert_eq!(report.issues[0].word_offset, 7);
    assert!(report.issues[0].message.contains("desynchronized"));
}

#[test]
fn reserved_geolocation_capture_needs_matching_options() {
    let dir = TempDir::new().unwrap();
    let reserved = DecodeOptions::default().with_reserved_geolocation();
    let fields = ContextFields {
        reference_level_dbm: Some(-10.0),
        formatted_ins: Some(Geolocation::default()),
        ..ContextFields::default()
    };
    let path = write_capture(&dir, &[context(4, 0, fields.clone(), &reserved)]);

    let report = analyze_capture_file(&path, &reserved).unwrap();
    assert!(report.issues.is_empty());
    assert_eq!(report.streams[0].context.as_ref(), Some(&fields));

    // Gated walking reads the INS block out of the zero-filled GPS slot and
    // leaves the real INS block unaccounted for.
    let gated = analyze_capture_file(&path, &DecodeOptions::default()).unwrap();
    assert_eq!(gated.issues.len(), 1);
    assert_eq!(gated.issues[0].severity, "warning");
    assert_eq!(gated.issues[0].word_offset, 0);
    assert!(gated.issues[0].message.contains("11 trailing words"));
    assert_eq!(gated.summary.context_packets, 1);
    let misread = gated.streams[0].context.as_ref().unwrap();
    assert_eq!(misread.reference_level_dbm, Some(-10.0));
    assert_eq!(misread.formatted_ins.unwrap().latitude_deg, Some(0.0));
    assert_ne!(misread.formatted_ins, fields.formatted_ins);
}

#[test]
fn report_serializes_with_timestamps_and_omits_absent_values() {
    let dir = TempDir::new().unwrap();
    let path = write_capture(&dir, &[data(1, 0, vec![], valid_trailer())]);

    let report = analyze_capture_file(&path, &DecodeOptions::default()).unwrap();
    assert_eq!(report.generated_at, "2023-11-14T22:13:20Z");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["report_version"], 1);
    assert_eq!(json["tool"]["name"], "vrtkit");
    assert_eq!(json["summary"]["time_start"], "2023-11-14T22:13:20Z");
    assert!(json["streams"][0].get("peak_magnitude").is_none());
    assert!(json["streams"][0].get("context").is_none());
}
