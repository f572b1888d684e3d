//! Writes small synthetic capture files built with the public encoders.
//!
//! Usage: `capture_fixtures [OUTPUT_DIR]` (defaults to `tests/fixtures`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use num_complex::Complex;
use vrtkit_core::protocols::vrt::{
    ContextFields, ContextPacket, DataPacket, DecodeOptions, DeviceId, Geolocation, Header,
    HeaderFlags, PacketType, Prologue, Timestamp, Trailer, encode_context, encode_data,
    wire_bytes_from_words,
};

const STREAM_ID: u32 = 0x0000_0001;
const START_SECONDS: u32 = 1_700_000_000;
const SAMPLES_PER_PACKET: usize = 64;
const PICOS_PER_PACKET: u64 = 1_280_000;
const GPS_FIX: &str = "$GPRMC,221320,A,4807.038,N,01131.000,E,000.5,054.7,141123,,*18";

fn main() -> ExitCode {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests").join("fixtures"));
    if let Err(err) = run(&root) {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(root: &Path) -> Result<(), String> {
    fs::create_dir_all(root).map_err(|err| format!("failed to create {}: {}", root.display(), err))?;

    write_capture(root.join("clean.vrt"), &CaptureSpec::new(vec![0, 1, 2, 3]))?;
    write_capture(root.join("gaps.vrt"), &CaptureSpec::new(vec![0, 1, 5, 6, 10]))?;
    write_capture(
        root.join("desync.vrt"),
        &CaptureSpec {
            zero_size_tail: true,
            ..CaptureSpec::new(vec![0, 1])
        },
    )?;
    Ok(())
}

struct CaptureSpec {
    data_counts: Vec<u8>,
    reference_level_dbm: f64,
    zero_size_tail: bool,
}

impl CaptureSpec {
    fn new(data_counts: Vec<u8>) -> Self {
        Self {
            data_counts,
            reference_level_dbm: -20.0,
            zero_size_tail: false,
        }
    }
}

fn write_capture(path: PathBuf, spec: &CaptureSpec) -> Result<(), String> {
    let words = build_capture(spec).map_err(|err| format!("encode failed: {}", err))?;
    fs::write(&path, wire_bytes_from_words(&words))
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn build_capture(spec: &CaptureSpec) -> Result<Vec<u32>, vrtkit_core::VrtError> {
    let mut words = Vec::new();

    let context = ContextPacket::new(
        prologue(PacketType::Context, 0, 0),
        ContextFields {
            reference_level_dbm: Some(spec.reference_level_dbm),
            gain_db: Some(0.0),
            rf_reference_frequency_hz: Some(1.0e9),
            bandwidth_hz: Some(20.0e6),
            sample_rate_hz: Some(50.0e6),
            temperature_c: Some(35.5),
            device_id: Some(DeviceId {
                manufacturer_oui: 0x0000_1F9A,
                device_code: 0x0040,
            }),
            formatted_gps: Some(Geolocation::from_nmea_rmc(GPS_FIX)?),
            ..ContextFields::default()
        },
    );
    words.extend(encode_context(&context, &DecodeOptions::default())?);

    for (index, &count) in spec.data_counts.iter().enumerate() {
        let raw = tone(index);
        let packet = DataPacket::from_raw(
            prologue(PacketType::Data, count, index as u64),
            raw,
            Trailer::with_all_flags(true, true, true, false, false, 1),
            spec.reference_level_dbm,
        );
        words.extend(encode_data(&packet)?);
    }

    if spec.zero_size_tail {
        let header = Header {
            packet_type: PacketType::Data,
            flags: HeaderFlags::for_data(),
            packet_count: 0,
            packet_size: 0,
        };
        words.push(header.pack().to_be());
        words.extend([0u32; 4]);
    }
    Ok(words)
}

fn prologue(packet_type: PacketType, packet_count: u8, index: u64) -> Prologue {
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
        stream_id: STREAM_ID,
        timestamp: Timestamp {
            seconds: START_SECONDS,
            picoseconds: index * PICOS_PER_PACKET,
        },
    }
}

/// Quarter-scale complex tone, phase-continuous across packets.
fn tone(packet_index: usize) -> Vec<Complex<i16>> {
    (0..SAMPLES_PER_PACKET)
        .map(|i| {
            let n = (packet_index * SAMPLES_PER_PACKET + i) as f64;
            let phase = std::f64::consts::TAU * n / 16.0;
            Complex::new(
                (8192.0 * phase.cos()).round() as i16,
                (8192.0 * phase.sin()).round() as i16,
            )
        })
        .collect()
}
