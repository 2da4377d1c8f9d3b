//! Integration tests: WiFi link state gating the meter fetch.

use solarcharge::adapters::meter::{ConnectedSource, HttpMeter};
use solarcharge::adapters::wifi::{ConnectivityPort, WifiAdapter};
use solarcharge::app::events::AppEvent;
use solarcharge::app::service::ControlLoop;
use solarcharge::config::SystemConfig;
use solarcharge::control::{ConfigIndex, Timestamp};
use solarcharge::error::FetchError;

use crate::mock_hw::{MockDisplay, MockRelay, RecordingSink};

fn tick(
    control: &mut ControlLoop,
    wifi: &mut WifiAdapter,
    meter: &mut HttpMeter,
    secs: u64,
    relay: &mut MockRelay,
    sink: &mut RecordingSink,
) {
    let now = Timestamp::from_secs(secs);
    let mut source = ConnectedSource::new(&*wifi, meter);
    control.poll(now, &mut source, relay, &mut MockDisplay::default(), sink);
    wifi.poll(now);
}

#[test]
fn lost_link_skips_measurements_until_reconnected() {
    let config = SystemConfig::default();
    let mut control = ControlLoop::new(ConfigIndex::new(0), &config);
    let mut meter = HttpMeter::new(&config);
    let mut wifi = WifiAdapter::new();
    let (mut relay, mut sink) = (MockRelay::default(), RecordingSink::default());

    wifi.set_credentials("HomeWiFi", "mysecret8").unwrap();
    wifi.connect().unwrap();

    tick(&mut control, &mut wifi, &mut meter, 0, &mut relay, &mut sink);
    assert_eq!(sink.skipped(), 0);

    // Link drops; the first retry (2 s backoff) fails, the second (4 s) succeeds.
    wifi.sim_drop_link(1);
    tick(&mut control, &mut wifi, &mut meter, 10, &mut relay, &mut sink);
    tick(&mut control, &mut wifi, &mut meter, 20, &mut relay, &mut sink);
    tick(&mut control, &mut wifi, &mut meter, 30, &mut relay, &mut sink);
    assert_eq!(sink.skipped(), 3);
    assert!(
        sink.events
            .iter()
            .all(|e| !matches!(e, AppEvent::MeasurementSkipped(err) if *err != FetchError::NotConnected))
    );

    assert!(wifi.is_connected());
    tick(&mut control, &mut wifi, &mut meter, 40, &mut relay, &mut sink);
    assert_eq!(sink.skipped(), 3);
    assert_eq!(control.tick_count(), 5);
}
