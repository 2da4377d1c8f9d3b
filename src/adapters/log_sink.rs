//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                selector,
                threshold,
            } => {
                info!(
                    "START | dip={} | hysteresis={}s | threshold={}W",
                    selector,
                    threshold.hysteresis_time.as_secs(),
                    threshold.power_threshold,
                );
            }
            AppEvent::Reading { reading, relay_on } => {
                info!(
                    "POWER | solar={}W | charger={}",
                    reading.watts(),
                    if *relay_on { "ON" } else { "OFF" },
                );
            }
            AppEvent::RelaySwitched { on, at } => {
                info!(
                    "RELAY | charger {} at t={}s",
                    if *on { "ON" } else { "OFF" },
                    at.as_millis() / 1000,
                );
            }
            AppEvent::MeasurementSkipped(e) => {
                warn!("SKIP  | no reading this tick ({})", e);
            }
        }
    }
}
