//! HTTP power-meter adapter.
//!
//! Implements [`PowerSource`] against a HomeWizard-style P1 meter: one
//! `GET` on the configured URL returning a JSON object such as
//!
//! ```json
//! { "active_power_w": -1432.0, "total_power_import_kwh": 1234.5 }
//! ```
//!
//! `active_power_w` is the net import (positive = drawing from the grid), so
//! the reading handed to the controller is its negation: positive = surplus.
//! Fractional watts are truncated toward zero.
//!
//! Failures are logged here and returned as [`FetchError`]; the control loop
//! only skips the tick.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::http::client::EspHttpConnection`.
//! - **all other targets**: a deterministic simulated meter.

use log::warn;
use serde::Deserialize;

use crate::adapters::wifi::ConnectivityPort;
use crate::app::ports::PowerSource;
use crate::config::SystemConfig;
use crate::control::PowerReading;
use crate::error::FetchError;

/// Largest response body accepted from the meter.
pub const MAX_BODY_LEN: usize = 1024;

#[derive(Deserialize)]
struct MeterData {
    active_power_w: f64,
}

/// Decode a meter response body into a surplus reading.
pub fn parse_meter_payload(body: &[u8]) -> Result<PowerReading, FetchError> {
    let data: MeterData = serde_json::from_slice(body).map_err(|_| FetchError::Payload)?;
    let surplus = -data.active_power_w.trunc();
    if !(f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&surplus) {
        return Err(FetchError::Payload);
    }
    Ok(PowerReading::from_watts(surplus as i32))
}

// ───────────────────────────────────────────────────────────────
// HttpMeter
// ───────────────────────────────────────────────────────────────

pub struct HttpMeter {
    url: heapless::String<{ crate::config::METER_URL_CAP }>,
    timeout: core::time::Duration,
    #[cfg(not(target_os = "espidf"))]
    sim_tick: u32,
}

impl HttpMeter {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            url: config.meter_url.clone(),
            timeout: config.http_timeout(),
            #[cfg(not(target_os = "espidf"))]
            sim_tick: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> core::time::Duration {
        self.timeout
    }

    // ── Platform-specific ─────────────────────────────────────

    /// Perform the GET and copy the body into `buf`.  Returns the body length.
    #[cfg(target_os = "espidf")]
    fn platform_get(&mut self, buf: &mut [u8]) -> Result<usize, FetchError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::io::Read;

        let mut conn = EspHttpConnection::new(&Configuration {
            timeout: Some(self.timeout),
            ..Default::default()
        })
        .map_err(|e| {
            warn!("meter: HTTP client init failed: {}", e);
            FetchError::Transport
        })?;

        conn.initiate_request(Method::Get, &self.url, &[("Accept", "application/json")])
            .map_err(|e| {
                warn!("meter: request to {} failed: {}", self.url, e);
                FetchError::Transport
            })?;
        conn.initiate_response().map_err(|e| {
            warn!("meter: no response from {}: {}", self.url, e);
            FetchError::Transport
        })?;

        let status = conn.status();
        if status != 200 {
            return Err(FetchError::Status(status));
        }

        let mut len = 0;
        loop {
            if len == buf.len() {
                // Body is larger than anything the meter legitimately sends.
                let mut probe = [0u8; 1];
                return match conn.read(&mut probe) {
                    Ok(0) => Ok(len),
                    _ => Err(FetchError::Payload),
                };
            }
            match conn.read(&mut buf[len..]) {
                Ok(0) => return Ok(len),
                Ok(n) => len += n,
                Err(e) => {
                    warn!("meter: body read failed: {}", e);
                    return Err(FetchError::Transport);
                }
            }
        }
    }

    /// Simulated meter: surplus ramps up and down through the threshold band.
    #[cfg(not(target_os = "espidf"))]
    fn platform_get(&mut self, buf: &mut [u8]) -> Result<usize, FetchError> {
        use core::fmt::Write;

        self.sim_tick = self.sim_tick.wrapping_add(1);
        let phase = (self.sim_tick % 40) as i32;
        let surplus = if phase < 20 { phase * 150 } else { (40 - phase) * 150 };

        let mut body: heapless::String<MAX_BODY_LEN> = heapless::String::new();
        write!(body, "{{\"active_power_w\":{:.1}}}", -f64::from(surplus))
            .map_err(|_| FetchError::Payload)?;
        let n = body.len().min(buf.len());
        buf[..n].copy_from_slice(&body.as_bytes()[..n]);
        Ok(n)
    }
}

impl PowerSource for HttpMeter {
    fn fetch_power(&mut self) -> Result<PowerReading, FetchError> {
        let mut buf = [0u8; MAX_BODY_LEN];
        let result = self
            .platform_get(&mut buf)
            .and_then(|len| parse_meter_payload(&buf[..len]));
        if let Err(e) = result {
            warn!("meter: skipping measurement: {}", e);
        }
        result
    }
}

// ───────────────────────────────────────────────────────────────
// Connectivity gate
// ───────────────────────────────────────────────────────────────

/// Wraps a [`PowerSource`] so no request is attempted while the link is down.
pub struct ConnectedSource<'a, L: ?Sized, S> {
    link: &'a L,
    source: &'a mut S,
}

impl<'a, L: ConnectivityPort + ?Sized, S: PowerSource> ConnectedSource<'a, L, S> {
    pub fn new(link: &'a L, source: &'a mut S) -> Self {
        Self { link, source }
    }
}

impl<L: ConnectivityPort + ?Sized, S: PowerSource> PowerSource for ConnectedSource<'_, L, S> {
    fn fetch_power(&mut self) -> Result<PowerReading, FetchError> {
        if !self.link.is_connected() {
            warn!("meter: WiFi not connected, skipping measurement");
            return Err(FetchError::NotConnected);
        }
        self.source.fetch_power()
    }
}
