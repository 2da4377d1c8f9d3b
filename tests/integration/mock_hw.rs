//! Mock adapters for integration tests.
//!
//! Records every relay write, rendered view and emitted event so tests can
//! assert on the full history without touching GPIO, I²C or the network.

use std::collections::VecDeque;

use solarcharge::app::events::AppEvent;
use solarcharge::app::ports::{DisplayPort, EventSink, PowerSource, RelayPort};
use solarcharge::control::{DisplayView, PowerReading};
use solarcharge::error::FetchError;

// ── ScriptedMeter ─────────────────────────────────────────────

/// Plays back queued results, then repeats `steady` forever.
pub struct ScriptedMeter {
    script: VecDeque<Result<PowerReading, FetchError>>,
    steady: Result<PowerReading, FetchError>,
    pub fetches: usize,
}

#[allow(dead_code)]
impl ScriptedMeter {
    pub fn steady(watts: i32) -> Self {
        Self {
            script: VecDeque::new(),
            steady: Ok(PowerReading::from_watts(watts)),
            fetches: 0,
        }
    }

    pub fn then_fail(mut self, times: usize, err: FetchError) -> Self {
        self.script.extend(std::iter::repeat_n(Err(err), times));
        self
    }

    pub fn then_read(mut self, watts: i32) -> Self {
        self.script.push_back(Ok(PowerReading::from_watts(watts)));
        self
    }

    pub fn set_steady(&mut self, watts: i32) {
        self.steady = Ok(PowerReading::from_watts(watts));
    }
}

impl PowerSource for ScriptedMeter {
    fn fetch_power(&mut self) -> Result<PowerReading, FetchError> {
        self.fetches += 1;
        self.script.pop_front().unwrap_or(self.steady)
    }
}

// ── MockRelay ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRelay {
    pub writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockRelay {
    pub fn is_on(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }

    /// Number of level changes seen on the output.
    pub fn edges(&self) -> usize {
        self.writes.windows(2).filter(|w| w[0] != w[1]).count()
    }
}

impl RelayPort for MockRelay {
    fn apply_actuator(&mut self, on: bool) {
        self.writes.push(on);
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub views: Vec<DisplayView>,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, view: &DisplayView) {
        self.views.push(*view);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn switches(&self) -> Vec<(bool, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::RelaySwitched { on, at } => Some((*on, at.as_millis() / 1000)),
                _ => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::MeasurementSkipped(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
