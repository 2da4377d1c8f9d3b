//! LCD status display adapter.
//!
//! Implements [`DisplayPort`] on the 16x2 character LCD:
//!
//! ```text
//!  ┌────────────────┐
//!  │P:1234W       ON│   reading, relay state
//!  │OFF in 95s      │   countdown while an OFF timer runs
//!  └────────────────┘
//!  ┌────────────────┐
//!  │P:-310W      OFF│
//!  │120s  >=500W    │   otherwise: hysteresis time and threshold
//!  └────────────────┘
//! ```
//!
//! Lines identical to what is already on the panel are not re-sent, which
//! keeps the 10 s refresh from flickering.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::control::{DisplayDetail, DisplayView};
use crate::drivers::lcd1602::{Lcd1602, LcdError};

/// One padded LCD row.
pub type Line = heapless::String<16>;

/// Format both rows for a view.  Each row is exactly 16 characters.
pub fn format_lines(view: &DisplayView) -> [Line; 2] {
    let mut top = Line::new();
    let state = if view.actuator_on { "ON" } else { "OFF" };
    let mut reading: Line = Line::new();
    let _ = write!(reading, "P:{}W", view.reading.watts());
    let gap = 16usize.saturating_sub(reading.len() + state.len()).max(1);
    let _ = write!(top, "{}{:gap$}{}", reading, "", state, gap = gap);

    let mut bottom = Line::new();
    let _ = match view.detail {
        DisplayDetail::Countdown(left) => {
            // Round up so the panel never shows "0s" while still waiting.
            let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
            write!(bottom, "OFF in {}s", secs)
        }
        DisplayDetail::Config {
            hysteresis_time,
            power_threshold,
        } => write!(bottom, "{}s  >={}W", hysteresis_time.as_secs(), power_threshold),
    };

    [pad(top), pad(bottom)]
}

fn pad(mut line: Line) -> Line {
    while line.push(' ').is_ok() {}
    line
}

pub struct LcdDisplay<I, D> {
    lcd: Lcd1602<I, D>,
    shown: [Option<Line>; 2],
}

impl<I: I2c, D: DelayNs> LcdDisplay<I, D> {
    /// Initialise the panel and show a boot banner.
    pub fn new(mut lcd: Lcd1602<I, D>) -> Result<Self, LcdError<I::Error>> {
        lcd.init()?;
        lcd.write_line(0, "SolarCharge     ")?;
        lcd.write_line(1, "waiting for data")?;
        Ok(Self {
            lcd,
            shown: [None, None],
        })
    }

    fn write_row(&mut self, row: usize, text: &Line) -> Result<(), LcdError<I::Error>> {
        if self.shown[row].as_ref() == Some(text) {
            return Ok(());
        }
        // Forget the row first so a failed write is retried next time.
        self.shown[row] = None;
        self.lcd.write_line(row, text)?;
        self.shown[row] = Some(text.clone());
        Ok(())
    }

    pub fn into_inner(self) -> Lcd1602<I, D> {
        self.lcd
    }
}

impl<I: I2c, D: DelayNs> DisplayPort for LcdDisplay<I, D> {
    fn render(&mut self, view: &DisplayView) {
        let lines = format_lines(view);
        for (row, text) in lines.iter().enumerate() {
            if let Err(e) = self.write_row(row, text) {
                warn!("LCD: row {} not updated: {:?}", row, e);
            }
        }
    }
}
