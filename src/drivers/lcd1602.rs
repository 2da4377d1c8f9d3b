//! HD44780 16x2 character LCD behind a PCF8574 I²C backpack.
//!
//! The backpack maps the expander port as:
//!
//! ```text
//!  P7 P6 P5 P4 | P3 | P2 | P1 | P0
//!  D7 D6 D5 D4 | BL | EN | RW | RS
//! ```
//!
//! The controller runs in 4-bit mode; each byte is sent as two nibbles and
//! each nibble is latched by an EN high→low edge.  Write-only: RW stays low.
//!
//! Generic over `embedded_hal` 1.0 [`I2c`] and [`DelayNs`] so it runs on the
//! ESP-IDF I²C driver on target and on a recording mock in tests.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

const RS: u8 = 0b0000_0001;
const EN: u8 = 0b0000_0100;
const BACKLIGHT: u8 = 0b0000_1000;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_DISPLAY_ON: u8 = 0x0C; // display on, cursor off, blink off
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit, 2 lines, 5x8 font
const CMD_SET_DDRAM: u8 = 0x80;

const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdError<E> {
    /// The I²C transfer failed.
    Bus(E),
    /// Cursor position outside the 16x2 grid.
    OutOfRange,
}

impl<E: fmt::Debug> fmt::Display for LcdError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "I2C bus error: {:?}", e),
            Self::OutOfRange => write!(f, "cursor out of range"),
        }
    }
}

impl<E> From<LcdError<E>> for crate::error::Error {
    fn from(_: LcdError<E>) -> Self {
        Self::Display
    }
}

pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
    backlight: u8,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    pub const COLS: usize = crate::pins::LCD_COLS;
    pub const ROWS: usize = crate::pins::LCD_ROWS;

    /// Wrap the bus.  Call [`init`](Self::init) before writing.
    pub fn new(i2c: I, delay: D, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
            backlight: BACKLIGHT,
        }
    }

    /// Run the HD44780 4-bit initialisation-by-instruction sequence.
    pub fn init(&mut self) -> Result<(), LcdError<I::Error>> {
        // Power-on settle.
        self.delay.delay_ms(50);
        self.expander_write(self.backlight)?;

        // Three times 0x3 forces 8-bit mode from any state, then switch to 4-bit.
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_SET)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE)
    }

    pub fn clear(&mut self) -> Result<(), LcdError<I::Error>> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(2_000);
        Ok(())
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), LcdError<I::Error>> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.expander_write(self.backlight)
    }

    pub fn set_cursor(&mut self, col: usize, row: usize) -> Result<(), LcdError<I::Error>> {
        if col >= Self::COLS || row >= Self::ROWS {
            return Err(LcdError::OutOfRange);
        }
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row] + col as u8))
    }

    /// Write ASCII text at the cursor.  Non-ASCII bytes are shown as `?`.
    pub fn write_str(&mut self, s: &str) -> Result<(), LcdError<I::Error>> {
        for b in s.bytes() {
            let b = if b.is_ascii() && !b.is_ascii_control() { b } else { b'?' };
            self.send(b, RS)?;
        }
        Ok(())
    }

    /// Overwrite a whole row.  `text` must already be padded to the width.
    pub fn write_line(&mut self, row: usize, text: &str) -> Result<(), LcdError<I::Error>> {
        self.set_cursor(0, row)?;
        self.write_str(text)
    }

    /// Give the bus back.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    // ── Internal ──────────────────────────────────────────────

    fn command(&mut self, cmd: u8) -> Result<(), LcdError<I::Error>> {
        self.send(cmd, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), LcdError<I::Error>> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)?;
        // Most instructions complete within 37 µs.
        self.delay.delay_us(50);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), LcdError<I::Error>> {
        let data = (nibble << 4) | mode | self.backlight;
        // EN high then low in one transfer; at 100 kHz each byte takes
        // ~90 µs, well above the 450 ns minimum pulse width.
        self.i2c
            .write(self.addr, &[data | EN, data & !EN])
            .map_err(LcdError::Bus)
    }

    fn expander_write(&mut self, data: u8) -> Result<(), LcdError<I::Error>> {
        self.i2c.write(self.addr, &[data]).map_err(LcdError::Bus)
    }
}
