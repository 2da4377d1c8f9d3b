//! System configuration parameters
//!
//! Runtime constants for the controller.  The switching thresholds are not
//! here: they come from the DIP selector at boot (see
//! [`control::threshold`](crate::control::threshold)).  Nothing is persisted;
//! build-time environment variables override the meter URL.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Meter endpoint used when `SOLARCHARGE_METER_URL` is not set at build time.
pub const DEFAULT_METER_URL: &str = "http://p1meter.local/api/v1/data";

/// Longest accepted meter URL.
pub const METER_URL_CAP: usize = 128;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Interval between power measurements (milliseconds)
    pub measurement_interval_ms: u32,
    /// Minimum time the charger stays on once switched on (seconds)
    pub min_run_time_secs: u32,

    // --- Meter ---
    /// HTTP endpoint returning the meter's JSON document
    pub meter_url: heapless::String<METER_URL_CAP>,
    /// Upper bound for one HTTP request (milliseconds)
    pub http_timeout_ms: u32,

    // --- Display ---
    /// Whether a 16x2 LCD is fitted
    pub display_enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut meter_url = heapless::String::new();
        // Fits: DEFAULT_METER_URL is shorter than METER_URL_CAP.
        let _ = meter_url.push_str(DEFAULT_METER_URL);
        Self {
            measurement_interval_ms: 10_000, // 10 s
            min_run_time_secs: 300,          // 5 min
            meter_url,
            http_timeout_ms: 5_000,
            display_enabled: true,
        }
    }
}

/// A config field failed range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

impl SystemConfig {
    /// Defaults with build-time overrides applied.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = option_env!("SOLARCHARGE_METER_URL") {
            config.set_meter_url(url)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn set_meter_url(&mut self, url: &str) -> Result<(), ConfigError> {
        if url.is_empty() {
            return Err(ConfigError::ValidationFailed("meter_url is empty"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationFailed("meter_url must be http(s)"));
        }
        if url.len() > METER_URL_CAP {
            return Err(ConfigError::ValidationFailed("meter_url too long"));
        }
        self.meter_url.clear();
        self.meter_url
            .push_str(url)
            .map_err(|_| ConfigError::ValidationFailed("meter_url too long"))
    }

    /// Reject values the control loop cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.measurement_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("measurement_interval_ms is zero"));
        }
        if self.meter_url.is_empty() {
            return Err(ConfigError::ValidationFailed("meter_url is empty"));
        }
        if self.http_timeout_ms == 0 || self.http_timeout_ms >= self.measurement_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "http_timeout_ms must be non-zero and below the measurement interval",
            ));
        }
        Ok(())
    }

    pub fn measurement_interval(&self) -> Duration {
        Duration::from_millis(self.measurement_interval_ms as u64)
    }

    pub fn min_run_time(&self) -> Duration {
        Duration::from_secs(self.min_run_time_secs as u64)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms as u64)
    }
}
