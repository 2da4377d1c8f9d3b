//! SolarCharge Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HttpMeter        HardwareAdapter     LcdDisplay   LogEventSink│
//! │  (PowerSource)    (Relay+Selector)    (Display)    (EventSink) │
//! │  WifiAdapter      MonotonicClock                               │
//! │  (Connectivity)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  ThresholdTable · HysteresisController                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};

use esp_idf_hal::delay::Ets;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use solarcharge::adapters::hardware::HardwareAdapter;
use solarcharge::adapters::lcd_display::LcdDisplay;
use solarcharge::adapters::log_sink::LogEventSink;
use solarcharge::adapters::meter::{ConnectedSource, HttpMeter};
use solarcharge::adapters::time::MonotonicClock;
use solarcharge::adapters::wifi::{ConnectivityPort, WifiAdapter};
use solarcharge::app::ports::{DisplayPort, NoDisplay};
use solarcharge::app::service::ControlLoop;
use solarcharge::config::SystemConfig;
use solarcharge::drivers::dip_switch::DipSwitch;
use solarcharge::drivers::hw_init;
use solarcharge::drivers::lcd1602::Lcd1602;
use solarcharge::drivers::relay::RelayDriver;
use solarcharge::pins;

/// Main loop granularity.  Measurements are spaced by the configured interval.
const LOOP_SLEEP: Duration = Duration::from_millis(100);

/// Relay OFF and a valid configuration, or nothing runs.
fn boot() -> solarcharge::error::Result<SystemConfig> {
    hw_init::init_peripherals()?;
    let config = SystemConfig::from_build_env()?;
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SolarCharge v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. GPIO (relay forced OFF) and configuration ──────────
    let config = boot().context("bring-up failed")?;
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config: not serialisable ({})", e),
    }

    // ── 3. Control core ───────────────────────────────────────
    let mut hw = HardwareAdapter::new(RelayDriver::new(), DipSwitch::new());
    let mut sink = LogEventSink::new();
    let mut control = ControlLoop::from_selector(&mut hw, &config);
    control.start(&mut hw, &mut sink);

    // ── 4. Peripherals and display ────────────────────────────
    let peripherals = Peripherals::take().context("peripherals already taken")?;

    let mut display: Box<dyn DisplayPort> = if config.display_enabled {
        let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
        info!(
            "LCD: I2C SDA=GPIO{} SCL=GPIO{} addr=0x{:02X}",
            pins::I2C_SDA_GPIO,
            pins::I2C_SCL_GPIO,
            pins::LCD_I2C_ADDR
        );
        match I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio21,
            peripherals.pins.gpio22,
            &i2c_cfg,
        ) {
            Ok(i2c) => match LcdDisplay::new(Lcd1602::new(i2c, Ets, pins::LCD_I2C_ADDR)) {
                Ok(lcd) => Box::new(lcd),
                Err(e) => {
                    warn!("LCD init failed ({}), running without display", e);
                    Box::new(NoDisplay)
                }
            },
            Err(e) => {
                warn!("I2C init failed ({}), running without display", e);
                Box::new(NoDisplay)
            }
        }
    } else {
        info!("Display disabled by configuration");
        Box::new(NoDisplay)
    };

    // ── 5. WiFi ───────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs)?;

    match (option_env!("SOLARCHARGE_WIFI_SSID"), option_env!("SOLARCHARGE_WIFI_PASS")) {
        (Some(ssid), pass) => {
            if let Err(e) = wifi.set_credentials(ssid, pass.unwrap_or("")) {
                error!("WiFi credentials rejected: {}", e);
            } else if let Err(e) = wifi.connect() {
                warn!("WiFi: initial connect failed ({}), will retry", e);
            }
        }
        (None, _) => error!("WiFi: no SSID configured at build time; meter unreachable"),
    }

    let mut meter = HttpMeter::new(&config);
    let clock = MonotonicClock::new();

    // ── 6. Main loop ──────────────────────────────────────────
    info!("Entering control loop (every {}ms)", config.measurement_interval_ms);
    loop {
        let now = clock.now();
        let mut source = ConnectedSource::new(&wifi, &mut meter);
        control.poll(now, &mut source, &mut hw, display.as_mut(), &mut sink);
        wifi.poll(now);
        std::thread::sleep(LOOP_SLEEP);
    }
}
