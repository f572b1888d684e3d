use serde::{Deserialize, Serialize};

/// How the formatted GPS geolocation slot is walked in a context packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationSlot {
    /// The slot occupies words only when its indicator bit is set.
    #[default]
    Gated,
    /// The 11-word slot is always present, zero-filled when the indicator
    /// bit is clear. Matches receivers that emit a fixed-size context body.
    AlwaysReserved,
}

/// Knobs shared by the context codec and the stream analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub geolocation_slot: GeolocationSlot,
    /// Reference level applied to data packets until a context packet
    /// reports one.
    pub initial_reference_level_dbm: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            geolocation_slot: GeolocationSlot::Gated,
            initial_reference_level_dbm: 0.0,
        }
    }
}

impl DecodeOptions {
    pub fn with_reserved_geolocation(mut self) -> Self {
        self.geolocation_slot = GeolocationSlot::AlwaysReserved;
        self
    }

    pub fn with_reference_level(mut self, dbm: f64) -> Self {
        self.initial_reference_level_dbm = dbm;
        self
    }
}
