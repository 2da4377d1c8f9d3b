//! Peripheral drivers and one-shot hardware initialisation.

pub mod dip_switch;
pub mod hw_init;
pub mod lcd1602;
pub mod relay;
