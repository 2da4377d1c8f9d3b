//! DIP-selectable threshold table.
//!
//! Three switches form a 3-bit index (DIP 1 = most significant bit):
//!
//! | DIP 1 | DIP 2 | DIP 3 | Hysteresis Time | Power Threshold |
//! |-------|-------|-------|-----------------|-----------------|
//! |   0   |   0   |   0   |      120s       |       500W      |
//! |   0   |   0   |   1   |      120s       |      1000W      |
//! |   0   |   1   |   0   |      120s       |      1500W      |
//! |   0   |   1   |   1   |      120s       |      2000W      |
//! |   1   |   0   |   0   |      240s       |       500W      |
//! |   1   |   0   |   1   |      240s       |      1000W      |
//! |   1   |   1   |   0   |      240s       |      1500W      |
//! |   1   |   1   |   1   |      240s       |      2000W      |
//!
//! The table is total: every 3-bit value maps to a row.

use core::fmt;
use core::time::Duration;

use serde::Serialize;

/// Signed power in watts.  Positive = surplus available for charging.
pub type Watts = i32;

/// A 3-bit configuration selector value in `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigIndex(u8);

impl ConfigIndex {
    /// Highest valid index.
    pub const MAX: u8 = 0b111;

    /// Build from a raw value; bits above bit 2 are discarded.
    pub const fn new(raw: u8) -> Self {
        Self(raw & Self::MAX)
    }

    /// Build from the three switch positions, `dip1` being the MSB.
    pub const fn from_switches(dip1: bool, dip2: bool, dip3: bool) -> Self {
        Self(((dip1 as u8) << 2) | ((dip2 as u8) << 1) | (dip3 as u8))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ConfigIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03b}", self.0)
    }
}

/// Switching parameters selected once at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdConfig {
    /// Continuous qualifying time required before the relay switches.
    pub hysteresis_time: Duration,
    /// Surplus at or above which charging qualifies.
    pub power_threshold: Watts,
}

const HYSTERESIS_SECS: [u64; 2] = [120, 240];
const THRESHOLDS_W: [Watts; 4] = [500, 1000, 1500, 2000];

/// Look up the switching parameters for a selector value.
pub const fn resolve(selector: ConfigIndex) -> ThresholdConfig {
    let bits = selector.value();
    ThresholdConfig {
        hysteresis_time: Duration::from_secs(HYSTERESIS_SECS[(bits >> 2) as usize]),
        power_threshold: THRESHOLDS_W[(bits & 0b11) as usize],
    }
}
