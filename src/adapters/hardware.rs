//! Hardware adapter: bridges the relay and DIP selector to the port traits.
//!
//! This and the LCD adapter are the only places that touch GPIO.  On
//! non-espidf targets the underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ConfigSelector, RelayPort};
use crate::control::ConfigIndex;
use crate::drivers::dip_switch::DipSwitch;
use crate::drivers::relay::RelayDriver;

/// Concrete adapter that combines the charger GPIO behind port traits.
pub struct HardwareAdapter {
    relay: RelayDriver,
    dip: DipSwitch,
}

impl HardwareAdapter {
    pub fn new(relay: RelayDriver, dip: DipSwitch) -> Self {
        Self { relay, dip }
    }

    pub fn relay(&self) -> &RelayDriver {
        &self.relay
    }
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new(RelayDriver::new(), DipSwitch::new())
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl RelayPort for HardwareAdapter {
    fn apply_actuator(&mut self, on: bool) {
        self.relay.set(on);
    }
}

// ── ConfigSelector implementation ─────────────────────────────

impl ConfigSelector for HardwareAdapter {
    fn read_config_selector(&mut self) -> ConfigIndex {
        self.dip.read()
    }
}
