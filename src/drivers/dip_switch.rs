//! 3-position DIP selector.
//!
//! Each switch connects its pin to 3V3; the internal pull-down holds it low
//! when open.  ON therefore reads HIGH.

use log::info;

use crate::control::ConfigIndex;
use crate::drivers::hw_init;
use crate::pins;

pub struct DipSwitch {
    pins: [i32; 3],
}

impl Default for DipSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl DipSwitch {
    pub fn new() -> Self {
        Self {
            pins: [pins::DIP_1_GPIO, pins::DIP_2_GPIO, pins::DIP_3_GPIO],
        }
    }

    /// Sample all three switches, DIP 1 first.
    pub fn read(&self) -> ConfigIndex {
        let [d1, d2, d3] = self.pins.map(hw_init::gpio_read);
        let index = ConfigIndex::from_switches(d1, d2, d3);
        info!("DIP selector: {} (DIP1={} DIP2={} DIP3={})", index, d1 as u8, d2 as u8, d3 as u8);
        index
    }
}
