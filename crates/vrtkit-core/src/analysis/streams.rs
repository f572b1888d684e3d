use std::collections::HashMap;

use crate::StreamSummary;
use crate::protocols::vrt::layout::PACKET_COUNT_MODULUS;
use crate::protocols::vrt::{ContextFields, ContextPacket, DataPacket, TrailerFlag};

/// Tracks the modulo-16 packet count of one packet kind on one stream.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SequenceTracker {
    last: Option<u8>,
}

impl SequenceTracker {
    /// Records `count` and returns how many packets went missing since the
    /// previous one. A repeated count reads as fifteen missing packets.
    pub fn observe(&mut self, count: u8) -> u64 {
        let count = count % PACKET_COUNT_MODULUS;
        let missing = match self.last {
            Some(last) => {
                let expected = (last + 1) % PACKET_COUNT_MODULUS;
                ((count + PACKET_COUNT_MODULUS - expected) % PACKET_COUNT_MODULUS) as u64
            }
            None => 0,
        };
        self.last = Some(count);
        missing
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct StreamStats {
    pub data_packets: u64,
    pub context_packets: u64,
    pub sequence_gaps: u64,
    pub samples: u64,
    pub invalid_data: u64,
    pub over_range: u64,
    pub sample_loss: u64,
    pub reference_unlocked: u64,
    pub peak_magnitude: Option<f32>,
    pub reference_level_dbm: Option<f64>,
    pub context: Option<ContextFields>,
    data_sequence: SequenceTracker,
    context_sequence: SequenceTracker,
}

impl StreamStats {
    pub fn add_data(&mut self, packet: &DataPacket) {
        self.data_packets += 1;
        self.sequence_gaps += self
            .data_sequence
            .observe(packet.prologue.header.packet_count);
        self.samples += packet.sample_count() as u64;
        self.reference_level_dbm = Some(packet.reference_level_dbm);

        let trailer = &packet.trailer;
        if trailer.get(TrailerFlag::ValidData) == Some(false) {
            self.invalid_data += 1;
        }
        if trailer.get(TrailerFlag::OverRange) == Some(true) {
            self.over_range += 1;
        }
        if trailer.get(TrailerFlag::SampleLoss) == Some(true) {
            self.sample_loss += 1;
        }
        if trailer.get(TrailerFlag::ReferenceLock) == Some(false) {
            self.reference_unlocked += 1;
        }

        if packet.sample_count() > 0 {
            let peak = packet.peak_magnitude();
            self.peak_magnitude = Some(self.peak_magnitude.map_or(peak, |p| p.max(peak)));
        }
    }

    pub fn add_context(&mut self, packet: &ContextPacket) {
        self.context_packets += 1;
        self.sequence_gaps += self
            .context_sequence
            .observe(packet.prologue.header.packet_count);
        self.context
            .get_or_insert_with(ContextFields::default)
            .merge_from(&packet.fields);
    }
}

pub(crate) fn build_stream_summaries(stats: HashMap<u32, StreamStats>) -> Vec<StreamSummary> {
    let mut streams: Vec<StreamSummary> = stats
        .into_iter()
        .map(|(stream_id, stats)| StreamSummary {
            stream_id,
            data_packets: stats.data_packets,
            context_packets: stats.context_packets,
            sequence_gaps: stats.sequence_gaps,
            samples: stats.samples,
            invalid_data: stats.invalid_data,
            over_range: stats.over_range,
            sample_loss: stats.sample_loss,
            reference_unlocked: stats.reference_unlocked,
            peak_magnitude: stats.peak_magnitude,
            reference_level_dbm: stats.reference_level_dbm,
            context: stats.context,
        })
        .collect();

    streams.sort_by_key(|stream| stream.stream_id);
    streams
}

#[cfg(test)]
mod tests {
    use num_complex::Complex;

    use super::*;
    use crate::protocols::vrt::{Prologue, Trailer, pack_data_header};
    use crate::protocols::vrt::prologue::Header;

    fn data_packet(count: u8, trailer: Trailer, raw: Vec<Complex<i16>>) -> DataPacket {
        let prologue = Prologue {
            header: Header::unpack(pack_data_header(count, 6 + raw.len() as u16)),
            stream_id: 1,
            timestamp: Default::default(),
        };
        DataPacket::from_raw(prologue, raw, trailer, 0.0)
    }

    #[test]
    fn sequence_tracker_counts_missing_packets_modulo_sixteen() {
        let mut tracker = SequenceTracker::default();
        assert_eq!(tracker.observe(14), 0);
        assert_eq!(tracker.observe(15), 0);
        assert_eq!(tracker.observe(0), 0);
        assert_eq!(tracker.observe(3), 2);
        assert_eq!(tracker.observe(1), 13);
    }

    #[test]
    fn trailer_flags_feed_counters() {
        let mut stats = StreamStats::default();
        let bad = Trailer::with_all_flags(false, false, false, true, true, 0);
        let good = Trailer::with_all_flags(true, true, true, false, false, 0);
        stats.add_data(&data_packet(0, bad, vec![Complex::new(16384, 0)]));
        stats.add_data(&data_packet(1, good, vec![Complex::new(0, -32768)]));
        stats.add_data(&data_packet(2, Trailer::default(), vec![]));

        assert_eq!(stats.data_packets, 3);
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.invalid_data, 1);
        assert_eq!(stats.over_range, 1);
        assert_eq!(stats.sample_loss, 1);
        assert_eq!(stats.reference_unlocked, 1);
        assert_eq!(stats.sequence_gaps, 0);
        assert_eq!(stats.peak_magnitude, Some(1.0));
    }

    #[test]
    fn summaries_are_sorted_by_stream_id() {
        let mut stats = HashMap::new();
        stats.insert(9, StreamStats::default());
        stats.insert(2, StreamStats::default());
        stats.insert(5, StreamStats::default());
        let ids: Vec<u32> = build_stream_summaries(stats)
            .iter()
            .map(|s| s.stream_id)
            .collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
