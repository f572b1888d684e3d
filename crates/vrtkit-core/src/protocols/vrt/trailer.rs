//! Data packet trailer: five enable/indicator bit pairs plus an optional
//! associated context packet count.
//!
//! An indicator bit carries meaning only when its enable bit is set, so each
//! flag decodes to "absent" or "present with a value". The record keeps them
//! as a map from flag to value; a missing key means the enable bit was clear.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::VrtError;
use super::layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerFlag {
    CalibratedTime,
    ValidData,
    ReferenceLock,
    OverRange,
    SampleLoss,
}

impl TrailerFlag {
    pub const ALL: [TrailerFlag; 5] = [
        TrailerFlag::CalibratedTime,
        TrailerFlag::ValidData,
        TrailerFlag::ReferenceLock,
        TrailerFlag::OverRange,
        TrailerFlag::SampleLoss,
    ];

    /// (enable bit, indicator bit)
    pub fn bits(self) -> (u32, u32) {
        match self {
            TrailerFlag::CalibratedTime => {
                (layout::TRAILER_TIME_ENABLE, layout::TRAILER_TIME_INDICATOR)
            }
            TrailerFlag::ValidData => (
                layout::TRAILER_VALID_DATA_ENABLE,
                layout::TRAILER_VALID_DATA_INDICATOR,
            ),
            TrailerFlag::ReferenceLock => (
                layout::TRAILER_REF_LOCK_ENABLE,
                layout::TRAILER_REF_LOCK_INDICATOR,
            ),
            TrailerFlag::OverRange => (
                layout::TRAILER_OVER_RANGE_ENABLE,
                layout::TRAILER_OVER_RANGE_INDICATOR,
            ),
            TrailerFlag::SampleLoss => (
                layout::TRAILER_SAMPLE_LOSS_ENABLE,
                layout::TRAILER_SAMPLE_LOSS_INDICATOR,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trailer {
    pub indicators: BTreeMap<TrailerFlag, bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associated_context_count: Option<u8>,
}

impl Trailer {
    /// Trailer with every flag enabled, as a receiver reports it.
    pub fn with_all_flags(
        calibrated_time: bool,
        valid_data: bool,
        reference_lock: bool,
        over_range: bool,
        sample_loss: bool,
        associated_context_count: u8,
    ) -> Self {
        let values = [
            calibrated_time,
            valid_data,
            reference_lock,
            over_range,
            sample_loss,
        ];
        Self {
            indicators: TrailerFlag::ALL.into_iter().zip(values).collect(),
            associated_context_count: Some(associated_context_count),
        }
    }

    /// `None` when the flag's enable bit is clear.
    pub fn get(&self, flag: TrailerFlag) -> Option<bool> {
        self.indicators.get(&flag).copied()
    }

    pub fn set(&mut self, flag: TrailerFlag, value: bool) {
        self.indicators.insert(flag, value);
    }

    pub fn unpack(word: u32) -> Self {
        let indicators = TrailerFlag::ALL
            .into_iter()
            .filter_map(|flag| {
                let (enable, indicator) = flag.bits();
                (word & enable != 0).then_some((flag, word & indicator != 0))
            })
            .collect();
        let associated_context_count = (word & layout::TRAILER_CONTEXT_COUNT_ENABLE != 0)
            .then_some((word & layout::TRAILER_CONTEXT_COUNT_MASK) as u8);
        Self {
            indicators,
            associated_context_count,
        }
    }

    /// # Errors
    /// Returns [`VrtError::ValueOutOfRange`] when the associated context count
    /// does not fit in six bits.
    pub fn pack(&self) -> Result<u32, VrtError> {
        let mut word = 0u32;
        for (&flag, &value) in &self.indicators {
            let (enable, indicator) = flag.bits();
            word |= enable;
            if value {
                word |= indicator;
            }
        }
        if let Some(count) = self.associated_context_count {
            if count as u32 > layout::TRAILER_CONTEXT_COUNT_MASK {
                return Err(VrtError::ValueOutOfRange {
                    field: "associated context count",
                    value: count as u64,
                    max: layout::TRAILER_CONTEXT_COUNT_MASK as u64,
                });
            }
            word |= layout::TRAILER_CONTEXT_COUNT_ENABLE | count as u32;
        }
        Ok(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_valid_data_pair_set() {
        let word = layout::TRAILER_VALID_DATA_ENABLE | layout::TRAILER_VALID_DATA_INDICATOR;
        let trailer = Trailer::unpack(word);
        assert_eq!(trailer.get(TrailerFlag::ValidData), Some(true));
        for flag in TrailerFlag::ALL {
            if flag != TrailerFlag::ValidData {
                assert_eq!(trailer.get(flag), None, "{flag:?}");
            }
        }
        assert_eq!(trailer.associated_context_count, None);
    }

    #[test]
    fn indicator_without_enable_is_ignored() {
        let trailer = Trailer::unpack(layout::TRAILER_OVER_RANGE_INDICATOR);
        assert_eq!(trailer.get(TrailerFlag::OverRange), None);
    }

    #[test]
    fn enabled_but_clear_indicator_is_false() {
        let trailer = Trailer::unpack(layout::TRAILER_SAMPLE_LOSS_ENABLE);
        assert_eq!(trailer.get(TrailerFlag::SampleLoss), Some(false));
    }

    #[test]
    fn context_count_requires_its_enable_bit() {
        assert_eq!(Trailer::unpack(0x25).associated_context_count, None);
        let trailer = Trailer::unpack(layout::TRAILER_CONTEXT_COUNT_ENABLE | 0x25);
        assert_eq!(trailer.associated_context_count, Some(0x25));
    }

    #[test]
    fn all_flags_pack_matches_receiver_layout() {
        let trailer = Trailer::with_all_flags(true, true, false, false, true, 3);
        let word = trailer.pack().unwrap();
        let expected = layout::TRAILER_TIME_ENABLE
            | layout::TRAILER_VALID_DATA_ENABLE
            | layout::TRAILER_REF_LOCK_ENABLE
            | layout::TRAILER_OVER_RANGE_ENABLE
            | layout::TRAILER_SAMPLE_LOSS_ENABLE
            | layout::TRAILER_TIME_INDICATOR
            | layout::TRAILER_VALID_DATA_INDICATOR
            | layout::TRAILER_SAMPLE_LOSS_INDICATOR
            | layout::TRAILER_CONTEXT_COUNT_ENABLE
            | 3;
        assert_eq!(word, expected);
        assert_eq!(Trailer::unpack(word), trailer);
    }

    #[test]
    fn every_flag_subset_round_trips() {
        for mask in 0u32..(1 << 10) {
            let mut trailer = Trailer::default();
            for (i, flag) in TrailerFlag::ALL.into_iter().enumerate() {
                if mask & (1 << (2 * i)) != 0 {
                    trailer.set(flag, mask & (1 << (2 * i + 1)) != 0);
                }
            }
            assert_eq!(Trailer::unpack(trailer.pack().unwrap()), trailer);
        }
    }

    #[test]
    fn oversized_context_count_is_rejected() {
        let trailer = Trailer {
            indicators: BTreeMap::new(),
            associated_context_count: Some(64),
        };
        assert!(matches!(
            trailer.pack(),
            Err(VrtError::ValueOutOfRange { value: 64, .. })
        ));
    }
}
