//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the controller state and the boot-time thresholds.
//! Each measurement tick it pulls one reading, evaluates it, and forwards
//! the outcome to the relay and the display.  All I/O flows through port
//! traits injected at call sites.
//!
//! ```text
//!  PowerSource ──▶ ┌────────────────────────┐ ──▶ RelayPort
//!                  │      ControlLoop        │ ──▶ DisplayPort
//!                  │  HysteresisController   │ ──▶ EventSink
//!                  └────────────────────────┘
//! ```
//!
//! A failed fetch skips the tick entirely: no state change, no relay write,
//! no display refresh.  The next interval simply tries again.

use core::time::Duration;

use log::debug;

use crate::config::SystemConfig;
use crate::control::{
    ActuatorCommand, ConfigIndex, ControllerState, HysteresisController, ThresholdConfig,
    Timestamp, resolve,
};

use super::events::AppEvent;
use super::ports::{ConfigSelector, DisplayPort, EventSink, PowerSource, RelayPort};

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    controller: HysteresisController,
    state: ControllerState,
    threshold: ThresholdConfig,
    selector: ConfigIndex,
    measurement_interval: Duration,
    last_tick_at: Option<Timestamp>,
    tick_count: u64,
    skipped_count: u64,
}

impl ControlLoop {
    /// Construct the loop.  The relay state starts OFF.
    pub fn new(selector: ConfigIndex, config: &SystemConfig) -> Self {
        Self {
            controller: HysteresisController::new(config.min_run_time()),
            state: ControllerState::new(),
            threshold: resolve(selector),
            selector,
            measurement_interval: config.measurement_interval(),
            last_tick_at: None,
            tick_count: 0,
            skipped_count: 0,
        }
    }

    /// Read the selector once and construct the loop from it.
    pub fn from_selector(selector: &mut impl ConfigSelector, config: &SystemConfig) -> Self {
        Self::new(selector.read_config_selector(), config)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Force the relay to the initial OFF state and announce the configuration.
    pub fn start(&mut self, relay: &mut impl RelayPort, sink: &mut impl EventSink) {
        relay.apply_actuator(self.state.actuator_on());
        sink.emit(&AppEvent::Started {
            selector: self.selector,
            threshold: self.threshold,
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// True before the first tick and once a full interval has passed since
    /// the previous one.
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.last_tick_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.measurement_interval,
        }
    }

    /// Run one measurement cycle: fetch → evaluate → relay → display.
    ///
    /// Returns the command applied to the relay, or `None` if the fetch
    /// failed and the tick was skipped.
    pub fn tick(
        &mut self,
        now: Timestamp,
        meter: &mut impl PowerSource,
        relay: &mut impl RelayPort,
        display: &mut (impl DisplayPort + ?Sized),
        sink: &mut impl EventSink,
    ) -> Option<ActuatorCommand> {
        self.last_tick_at = Some(now);
        self.tick_count += 1;

        let reading = match meter.fetch_power() {
            Ok(r) => r,
            Err(e) => {
                self.skipped_count += 1;
                sink.emit(&AppEvent::MeasurementSkipped(e));
                return None;
            }
        };

        let was_on = self.state.actuator_on();
        let (command, view) = self
            .controller
            .evaluate(reading, now, &mut self.state, &self.threshold);

        relay.apply_actuator(command.relay_on());
        display.render(&view);

        sink.emit(&AppEvent::Reading {
            reading,
            relay_on: command.relay_on(),
        });
        if command.relay_on() != was_on {
            sink.emit(&AppEvent::RelaySwitched {
                on: command.relay_on(),
                at: now,
            });
        }
        debug!(
            "tick #{}: above={:?} below={:?}",
            self.tick_count,
            self.state.above_threshold_since(),
            self.state.below_threshold_since()
        );

        Some(command)
    }

    /// Tick only if a measurement is due.
    pub fn poll(
        &mut self,
        now: Timestamp,
        meter: &mut impl PowerSource,
        relay: &mut impl RelayPort,
        display: &mut (impl DisplayPort + ?Sized),
        sink: &mut impl EventSink,
    ) -> Option<ActuatorCommand> {
        if self.is_due(now) {
            self.tick(now, meter, relay, display, sink)
        } else {
            None
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.actuator_on()
    }

    pub fn threshold(&self) -> ThresholdConfig {
        self.threshold
    }

    pub fn selector(&self) -> ConfigIndex {
        self.selector
    }

    /// Measurement ticks attempted since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Ticks skipped because the reading could not be fetched.
    pub fn skipped_count(&self) -> u64 {
        self.skipped_count
    }
}
