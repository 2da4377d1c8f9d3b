//! GPIO / peripheral pin assignments for the SolarCharge controller board
//! (ESP32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Charger relay
// ---------------------------------------------------------------------------

/// Digital output: HIGH = charger relay energised.  Configured LOW at boot.
pub const RELAY_GPIO: i32 = 19;

// ---------------------------------------------------------------------------
// DIP selector (3 positions, switch to 3V3, internal pull-down)
// ---------------------------------------------------------------------------

/// DIP 1: hysteresis time (120 s / 240 s).  Most significant bit.
pub const DIP_1_GPIO: i32 = 25;
/// DIP 2: power threshold, high bit.
pub const DIP_2_GPIO: i32 = 26;
/// DIP 3: power threshold, low bit.
pub const DIP_3_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// I²C bus (16x2 LCD with PCF8574 backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Standard-mode bus clock.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// 7-bit address of the PCF8574 LCD backpack.
pub const LCD_I2C_ADDR: u8 = 0x27;
pub const LCD_COLS: usize = 16;
pub const LCD_ROWS: usize = 2;
