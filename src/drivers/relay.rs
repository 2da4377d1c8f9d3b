//! Charger relay driver.
//!
//! Single digital output.  The driver starts with the relay OFF, matching the
//! level `hw_init` programs at boot, and remembers the last commanded level.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use log::debug;

use crate::drivers::hw_init;
use crate::pins;

pub struct RelayDriver {
    pin: i32,
    on: bool,
    writes: u32,
}

impl Default for RelayDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayDriver {
    pub fn new() -> Self {
        Self::on_pin(pins::RELAY_GPIO)
    }

    pub fn on_pin(pin: i32) -> Self {
        Self {
            pin,
            on: false,
            writes: 0,
        }
    }

    /// Drive the output.  Re-writing the current level is allowed and harmless.
    pub fn set(&mut self, on: bool) {
        if on != self.on {
            debug!("relay: GPIO{} -> {}", self.pin, if on { "HIGH" } else { "LOW" });
        }
        hw_init::gpio_write(self.pin, on);
        self.on = on;
        self.writes = self.writes.wrapping_add(1);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// GPIO writes issued so far.
    pub fn write_count(&self) -> u32 {
        self.writes
    }
}
