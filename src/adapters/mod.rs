//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | RelayPort          | Relay GPIO               |
//! |                | ConfigSelector     | DIP switch GPIO          |
//! | `lcd_display`  | DisplayPort        | HD44780 over I²C         |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `meter`        | PowerSource        | P1 meter HTTP API        |
//! | `time`         | (clock)            | ESP32 system timer       |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod lcd_display;
pub mod log_sink;
pub mod meter;
pub mod time;
pub mod wifi;
