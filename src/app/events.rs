//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them; the stock one writes to the serial log.

use crate::control::{ConfigIndex, PowerReading, ThresholdConfig, Timestamp};
use crate::error::FetchError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The control loop is ready; carries the boot-time selection.
    Started {
        selector: ConfigIndex,
        threshold: ThresholdConfig,
    },

    /// A reading was evaluated.
    Reading {
        reading: PowerReading,
        relay_on: bool,
    },

    /// The relay changed state.
    RelaySwitched { on: bool, at: Timestamp },

    /// No reading this tick; nothing was changed.
    MeasurementSkipped(FetchError),
}
