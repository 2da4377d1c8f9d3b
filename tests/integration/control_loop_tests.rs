//! Integration tests for the ControlLoop → controller → relay/display pipeline.
//!
//! Time is driven explicitly; each `run` polls the loop every 10 s the way
//! the firmware main loop does.

use solarcharge::app::events::AppEvent;
use solarcharge::app::service::ControlLoop;
use solarcharge::config::SystemConfig;
use solarcharge::control::{ConfigIndex, DisplayDetail, Timestamp};
use solarcharge::error::FetchError;

use crate::mock_hw::{MockDisplay, MockRelay, RecordingSink, ScriptedMeter};

struct Rig {
    control: ControlLoop,
    meter: ScriptedMeter,
    relay: MockRelay,
    display: MockDisplay,
    sink: RecordingSink,
}

impl Rig {
    /// Selector 0: 120 s hysteresis, 500 W threshold.
    fn new(selector: u8, min_run_secs: u32, meter: ScriptedMeter) -> Self {
        let config = SystemConfig {
            min_run_time_secs: min_run_secs,
            ..SystemConfig::default()
        };
        let mut rig = Self {
            control: ControlLoop::new(ConfigIndex::new(selector), &config),
            meter,
            relay: MockRelay::default(),
            display: MockDisplay::default(),
            sink: RecordingSink::default(),
        };
        rig.control.start(&mut rig.relay, &mut rig.sink);
        rig
    }

    fn at(&mut self, secs: u64) {
        self.control.tick(
            Timestamp::from_secs(secs),
            &mut self.meter,
            &mut self.relay,
            &mut self.display,
            &mut self.sink,
        );
    }

    fn run(&mut self, from_secs: u64, to_secs: u64) {
        for secs in (from_secs..=to_secs).step_by(10) {
            self.control.poll(
                Timestamp::from_secs(secs),
                &mut self.meter,
                &mut self.relay,
                &mut self.display,
                &mut self.sink,
            );
        }
    }
}

// ── Turn-on hysteresis ────────────────────────────────────────

#[test]
fn sustained_surplus_turns_charger_on_after_hysteresis() {
    let mut rig = Rig::new(0, 300, ScriptedMeter::steady(600));

    for secs in [0, 60, 119] {
        rig.at(secs);
        assert!(!rig.relay.is_on(), "still OFF at {}s", secs);
    }
    rig.at(121);
    assert!(rig.relay.is_on());
    assert_eq!(rig.sink.switches(), vec![(true, 121)]);
}

#[test]
fn polled_loop_switches_on_the_first_tick_at_hysteresis() {
    let mut rig = Rig::new(0, 300, ScriptedMeter::steady(600));
    rig.run(0, 110);
    assert!(!rig.relay.is_on());
    rig.run(120, 120);
    assert!(rig.relay.is_on());
    assert_eq!(rig.control.tick_count(), 13);
}

#[test]
fn higher_selector_needs_more_power_and_time() {
    // 0b111: 240 s, 2000 W.
    let mut rig = Rig::new(0b111, 300, ScriptedMeter::steady(1999));
    rig.run(0, 600);
    assert!(!rig.relay.is_on());

    rig.meter.set_steady(2000);
    rig.run(610, 840);
    assert!(!rig.relay.is_on());
    rig.run(850, 850);
    assert!(rig.relay.is_on());
}

// ── Turn-off with minimum run time ────────────────────────────

#[test]
fn minimum_run_time_delays_the_off_window() {
    let mut rig = Rig::new(0, 60, ScriptedMeter::steady(600));
    rig.run(0, 120);
    assert!(rig.relay.is_on());
    let t0 = 120;

    rig.meter.set_steady(0);
    rig.run(t0 + 10, t0 + 50);
    assert_eq!(rig.control.state().below_threshold_since(), None);

    rig.run(t0 + 60, t0 + 170);
    assert!(rig.relay.is_on());
    assert_eq!(
        rig.control.state().below_threshold_since(),
        Some(Timestamp::from_secs(t0 + 60))
    );

    rig.run(t0 + 180, t0 + 180);
    assert!(!rig.relay.is_on());
    assert_eq!(rig.sink.switches(), vec![(true, t0), (false, t0 + 180)]);
}

#[test]
fn countdown_is_rendered_while_the_off_window_runs() {
    let mut rig = Rig::new(0, 0, ScriptedMeter::steady(600));
    rig.run(0, 120);
    rig.meter.set_steady(100);
    rig.run(130, 160);

    let last = rig.display.views.last().copied().unwrap();
    assert!(last.actuator_on);
    assert_eq!(last.reading.watts(), 100);
    assert_eq!(last.detail, DisplayDetail::Countdown(core::time::Duration::from_secs(90)));
}

// ── Oscillation ───────────────────────────────────────────────

#[test]
fn oscillating_surplus_never_switches() {
    let mut rig = Rig::new(0, 300, ScriptedMeter::steady(400));
    for step in 0..360u64 {
        rig.meter.set_steady(if step % 2 == 0 { 600 } else { 400 });
        rig.run(step * 10, step * 10);
    }
    assert_eq!(rig.control.tick_count(), 360);
    assert!(rig.relay.writes.iter().all(|on| !on));
    assert!(rig.sink.switches().is_empty());
}

// ── Fetch failures ────────────────────────────────────────────

#[test]
fn failed_fetches_leave_timers_untouched() {
    let meter = ScriptedMeter::steady(600)
        .then_read(600)
        .then_fail(3, FetchError::Transport);
    let mut rig = Rig::new(0, 300, meter);

    rig.run(0, 0);
    let since = rig.control.state().above_threshold_since();
    assert_eq!(since, Some(Timestamp::from_secs(0)));

    rig.run(10, 30);
    assert_eq!(rig.sink.skipped(), 3);
    assert_eq!(rig.control.skipped_count(), 3);
    assert_eq!(rig.control.state().above_threshold_since(), since);
    // Start write + the one successful tick; failures never touch the relay.
    assert_eq!(rig.relay.writes.len(), 2);
    assert_eq!(rig.display.views.len(), 1);

    rig.run(40, 120);
    assert!(rig.relay.is_on());
    assert_eq!(rig.sink.switches(), vec![(true, 120)]);
}

#[test]
fn failures_while_on_do_not_turn_the_charger_off() {
    let mut rig = Rig::new(0, 0, ScriptedMeter::steady(600));
    rig.run(0, 120);
    assert!(rig.relay.is_on());

    rig.meter = ScriptedMeter::steady(600).then_fail(50, FetchError::Status(503));
    rig.run(130, 620);
    assert!(rig.relay.is_on());
    assert_eq!(rig.relay.edges(), 1);
}

#[test]
fn skipped_tick_still_waits_a_full_interval() {
    let meter = ScriptedMeter::steady(600).then_fail(1, FetchError::NotConnected);
    let mut rig = Rig::new(0, 300, meter);

    rig.control.poll(
        Timestamp::from_secs(0),
        &mut rig.meter,
        &mut rig.relay,
        &mut rig.display,
        &mut rig.sink,
    );
    assert!(!rig.control.is_due(Timestamp::from_millis(9_999)));
    assert!(rig.control.is_due(Timestamp::from_secs(10)));
    assert_eq!(rig.meter.fetches, 1);
}

// ── Event stream ──────────────────────────────────────────────

#[test]
fn event_stream_describes_the_run() {
    let mut rig = Rig::new(0b001, 300, ScriptedMeter::steady(1200));
    rig.run(0, 120);

    let events = &rig.sink.events;
    match &events[0] {
        AppEvent::Started {
            selector,
            threshold,
        } => {
            assert_eq!(selector.value(), 1);
            assert_eq!(threshold.power_threshold, 1000);
        }
        other => panic!("expected Started, got {:?}", other),
    }
    let readings = events
        .iter()
        .filter(|e| matches!(e, AppEvent::Reading { .. }))
        .count();
    assert_eq!(readings, 13);
    assert!(matches!(
        events.last(),
        Some(AppEvent::RelaySwitched { on: true, .. })
    ));
}
