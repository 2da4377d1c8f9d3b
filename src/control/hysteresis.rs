//! Hysteresis decision engine.
//!
//! Turns a stream of power readings into a debounced ON/OFF relay decision.
//!
//! ```text
//!          reading >= threshold for hysteresis_time
//!   OFF ─────────────────────────────────────────────▶ ON
//!    ▲                                                 │
//!    │  reading < threshold for hysteresis_time,       │
//!    └──── counted only once min_run_time has passed ──┘
//! ```
//!
//! Any reading that fails to qualify resets the pending timer: there is no
//! partial credit.  The controller only ever times the direction opposite
//! to the current relay state, so a single pending timestamp is enough and
//! the "above" and "below" timers can never both be running.

use core::ops::Add;
use core::time::Duration;

use super::threshold::{ThresholdConfig, Watts};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Monotonic milliseconds since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub const fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Net power sample.  Positive = surplus (generation minus consumption).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PowerReading(Watts);

impl PowerReading {
    pub const fn from_watts(watts: Watts) -> Self {
        Self(watts)
    }

    pub const fn watts(self) -> Watts {
        self.0
    }
}

/// Relay command produced every evaluation.  Applying it repeatedly is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    SetRelay(bool),
}

impl ActuatorCommand {
    pub const fn relay_on(self) -> bool {
        match self {
            Self::SetRelay(on) => on,
        }
    }
}

/// Second-line content of the status view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDetail {
    /// Relay is ON and an OFF timer is running; time left until switch-off.
    Countdown(Duration),
    /// Static switching parameters.
    Config {
        hysteresis_time: Duration,
        power_threshold: Watts,
    },
}

/// Everything the status display needs for one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayView {
    pub reading: PowerReading,
    pub actuator_on: bool,
    pub detail: DisplayDetail,
}

// ---------------------------------------------------------------------------
// Controller state
// ---------------------------------------------------------------------------

/// Mutable controller state.  Starts OFF with no timer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerState {
    actuator_on: bool,
    last_transition_at: Timestamp,
    /// Start of the current qualifying run.  Counts toward ON while the relay
    /// is off and toward OFF while it is on.
    qualifying_since: Option<Timestamp>,
}

impl ControllerState {
    pub const fn new() -> Self {
        Self {
            actuator_on: false,
            last_transition_at: Timestamp(0),
            qualifying_since: None,
        }
    }

    pub const fn actuator_on(&self) -> bool {
        self.actuator_on
    }

    pub const fn last_transition_at(&self) -> Timestamp {
        self.last_transition_at
    }

    pub const fn above_threshold_since(&self) -> Option<Timestamp> {
        if self.actuator_on { None } else { self.qualifying_since }
    }

    pub const fn below_threshold_since(&self) -> Option<Timestamp> {
        if self.actuator_on { self.qualifying_since } else { None }
    }

    fn switch(&mut self, on: bool, now: Timestamp) {
        self.actuator_on = on;
        self.last_transition_at = now;
        self.qualifying_since = None;
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Pure decision logic; holds only the minimum-run-time parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HysteresisController {
    min_run_time: Duration,
}

impl HysteresisController {
    pub const fn new(min_run_time: Duration) -> Self {
        Self { min_run_time }
    }

    pub const fn min_run_time(&self) -> Duration {
        self.min_run_time
    }

    /// Process one reading.  Always returns the relay command and a fresh view.
    pub fn evaluate(
        &self,
        reading: PowerReading,
        now: Timestamp,
        state: &mut ControllerState,
        config: &ThresholdConfig,
    ) -> (ActuatorCommand, DisplayView) {
        // Ties qualify for ON and never for OFF.
        let surplus = reading.watts() >= config.power_threshold;

        if state.actuator_on {
            self.update_on(surplus, now, state, config);
        } else {
            update_off(surplus, now, state, config);
        }

        let command = ActuatorCommand::SetRelay(state.actuator_on);
        let view = DisplayView {
            reading,
            actuator_on: state.actuator_on,
            detail: display_detail(now, state, config),
        };
        (command, view)
    }

    fn update_on(
        &self,
        surplus: bool,
        now: Timestamp,
        state: &mut ControllerState,
        config: &ThresholdConfig,
    ) {
        if surplus {
            state.qualifying_since = None;
            return;
        }

        // Minimum run time: the OFF timer must not even start yet.
        if now.saturating_duration_since(state.last_transition_at) < self.min_run_time {
            return;
        }

        let since = *state.qualifying_since.get_or_insert(now);
        if now.saturating_duration_since(since) >= config.hysteresis_time {
            state.switch(false, now);
        }
    }
}

fn update_off(surplus: bool, now: Timestamp, state: &mut ControllerState, config: &ThresholdConfig) {
    if !surplus {
        state.qualifying_since = None;
        return;
    }

    let since = *state.qualifying_since.get_or_insert(now);
    if now.saturating_duration_since(since) >= config.hysteresis_time {
        state.switch(true, now);
    }
}

fn display_detail(now: Timestamp, state: &ControllerState, config: &ThresholdConfig) -> DisplayDetail {
    if let Some(since) = state.below_threshold_since() {
        let elapsed = now.saturating_duration_since(since);
        if elapsed < config.hysteresis_time {
            return DisplayDetail::Countdown(config.hysteresis_time - elapsed);
        }
    }
    DisplayDetail::Config {
        hysteresis_time: config.hysteresis_time,
        power_threshold: config.power_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TH_500_120: ThresholdConfig = ThresholdConfig {
        hysteresis_time: Duration::from_secs(120),
        power_threshold: 500,
    };

    fn w(watts: Watts) -> PowerReading {
        PowerReading::from_watts(watts)
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    /// Feed one reading per second over `range`.
    fn feed(
        ctl: &HysteresisController,
        state: &mut ControllerState,
        watts: Watts,
        range: core::ops::RangeInclusive<u64>,
    ) {
        for s in range {
            ctl.evaluate(w(watts), t(s), state, &TH_500_120);
        }
    }

    #[test]
    fn starts_off_without_timers() {
        let s = ControllerState::new();
        assert!(!s.actuator_on());
        assert_eq!(s.above_threshold_since(), None);
        assert_eq!(s.below_threshold_since(), None);
        assert_eq!(s, ControllerState::default());
    }

    #[test]
    fn turns_on_after_continuous_surplus() {
        let ctl = HysteresisController::new(Duration::from_secs(60));
        let mut s = ControllerState::new();

        feed(&ctl, &mut s, 600, 0..=119);
        assert!(!s.actuator_on(), "119 s of surplus is not enough");
        assert_eq!(s.above_threshold_since(), Some(t(0)));

        let (cmd, view) = ctl.evaluate(w(600), t(121), &mut s, &TH_500_120);
        assert_eq!(cmd, ActuatorCommand::SetRelay(true));
        assert!(view.actuator_on);
        assert_eq!(s.last_transition_at(), t(121));
        assert_eq!(s.above_threshold_since(), None, "timer cleared on transition");
        assert_eq!(s.below_threshold_since(), None);
    }

    #[test]
    fn switches_exactly_at_hysteresis_boundary() {
        let ctl = HysteresisController::new(Duration::ZERO);
        let mut s = ControllerState::new();
        ctl.evaluate(w(500), t(10), &mut s, &TH_500_120);
        ctl.evaluate(w(500), t(130), &mut s, &TH_500_120);
        assert!(s.actuator_on());
    }

    #[test]
    fn dip_below_threshold_restarts_window() {
        let ctl = HysteresisController::new(Duration::ZERO);
        let mut s = ControllerState::new();

        feed(&ctl, &mut s, 600, 0..=100);
        ctl.evaluate(w(499), t(101), &mut s, &TH_500_120);
        assert_eq!(s.above_threshold_since(), None);

        feed(&ctl, &mut s, 600, 102..=221);
        assert!(!s.actuator_on(), "window restarted at 102 s");
        ctl.evaluate(w(600), t(222), &mut s, &TH_500_120);
        assert!(s.actuator_on());
    }

    #[test]
    fn oscillating_reading_never_switches() {
        let ctl = HysteresisController::new(Duration::ZERO);
        let mut s = ControllerState::new();
        for i in 0..500u64 {
            let watts = if i % 2 == 0 { 600 } else { 400 };
            let (cmd, _) = ctl.evaluate(w(watts), t(i * 10), &mut s, &TH_500_120);
            assert_eq!(cmd, ActuatorCommand::SetRelay(false));
        }
    }

    #[test]
    fn tie_qualifies_on_but_not_off() {
        let ctl = HysteresisController::new(Duration::ZERO);
        let mut s = ControllerState::new();

        ctl.evaluate(w(500), t(0), &mut s, &TH_500_120);
        assert_eq!(s.above_threshold_since(), Some(t(0)));
        ctl.evaluate(w(500), t(120), &mut s, &TH_500_120);
        assert!(s.actuator_on());

        feed(&ctl, &mut s, 500, 121..=1000);
        assert!(s.actuator_on(), "reading == threshold must never count toward OFF");
        assert_eq!(s.below_threshold_since(), None);
    }

    #[test]
    fn min_run_time_delays_off_timer() {
        let ctl = HysteresisController::new(Duration::from_secs(60));
        let mut s = ControllerState::new();
        ctl.evaluate(w(600), t(0), &mut s, &TH_500_120);
        ctl.evaluate(w(600), t(120), &mut s, &TH_500_120);
        assert!(s.actuator_on());
        // Relay went on at t=120.  Readings drop to 0 W from t=130.
        for secs in (130..180).step_by(10) {
            ctl.evaluate(w(0), t(secs), &mut s, &TH_500_120);
            assert_eq!(s.below_threshold_since(), None, "guard active at {secs}");
        }

        ctl.evaluate(w(0), t(180), &mut s, &TH_500_120);
        assert_eq!(s.below_threshold_since(), Some(t(180)));

        ctl.evaluate(w(0), t(299), &mut s, &TH_500_120);
        assert!(s.actuator_on());
        let (cmd, _) = ctl.evaluate(w(0), t(300), &mut s, &TH_500_120);
        assert_eq!(cmd, ActuatorCommand::SetRelay(false));
        assert_eq!(s.last_transition_at(), t(300));
        assert_eq!(s.above_threshold_since(), None);
    }

    #[test]
    fn surplus_while_on_clears_off_timer() {
        let ctl = HysteresisController::new(Duration::ZERO);
        let mut s = ControllerState::new();
        feed(&ctl, &mut s, 600, 0..=120);
        assert!(s.actuator_on());

        feed(&ctl, &mut s, 100, 121..=200);
        assert_eq!(s.below_threshold_since(), Some(t(121)));
        ctl.evaluate(w(700), t(201), &mut s, &TH_500_120);
        assert_eq!(s.below_threshold_since(), None);

        feed(&ctl, &mut s, 100, 202..=321);
        assert!(s.actuator_on(), "OFF window restarted at 202 s");
        ctl.evaluate(w(100), t(322), &mut s, &TH_500_120);
        assert!(!s.actuator_on());
    }

    #[test]
    fn view_shows_countdown_while_off_timer_runs() {
        let ctl = HysteresisController::new(Duration::ZERO);
        let mut s = ControllerState::new();
        feed(&ctl, &mut s, 600, 0..=120);

        let (_, view) = ctl.evaluate(w(600), t(125), &mut s, &TH_500_120);
        assert_eq!(
            view.detail,
            DisplayDetail::Config {
                hysteresis_time: Duration::from_secs(120),
                power_threshold: 500
            }
        );

        let (_, view) = ctl.evaluate(w(-50), t(130), &mut s, &TH_500_120);
        assert_eq!(view.detail, DisplayDetail::Countdown(Duration::from_secs(120)));
        assert_eq!(view.reading, w(-50));

        let (_, view) = ctl.evaluate(w(-50), t(175), &mut s, &TH_500_120);
        assert_eq!(view.detail, DisplayDetail::Countdown(Duration::from_secs(75)));
        assert!(view.actuator_on);

        let (_, view) = ctl.evaluate(w(-50), t(250), &mut s, &TH_500_120);
        assert!(!view.actuator_on);
        assert!(matches!(view.detail, DisplayDetail::Config { .. }));
    }

    #[test]
    fn view_shows_config_while_off() {
        let ctl = HysteresisController::new(Duration::ZERO);
        let mut s = ControllerState::new();
        let (_, view) = ctl.evaluate(w(900), t(5), &mut s, &TH_500_120);
        assert!(!view.actuator_on);
        assert!(matches!(view.detail, DisplayDetail::Config { power_threshold: 500, .. }));
    }

    #[test]
    fn timestamp_arithmetic_saturates() {
        assert_eq!(t(5).saturating_duration_since(t(10)), Duration::ZERO);
        assert_eq!(t(10).saturating_duration_since(t(4)), Duration::from_secs(6));
        assert_eq!(t(1) + Duration::from_millis(250), Timestamp::from_millis(1250));
    }
}
