//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (meter, relay, DIP selector, display, event sinks)
//! implement these traits.  The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.

use crate::control::{ConfigIndex, DisplayView, PowerReading};
use crate::error::FetchError;

// ───────────────────────────────────────────────────────────────
// Power source (driven adapter: meter → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per measurement tick.
pub trait PowerSource {
    /// Current net power, positive = surplus available for charging.
    ///
    /// Implementations log their own failures; the caller only skips the tick.
    fn fetch_power(&mut self) -> Result<PowerReading, FetchError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration selector (driven adapter: DIP switch → domain)
// ───────────────────────────────────────────────────────────────

/// Reads the 3-bit threshold selector.  Called once at boot.
pub trait ConfigSelector {
    fn read_config_selector(&mut self) -> ConfigIndex;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the charger relay.
pub trait RelayPort {
    /// Drive the relay.  Writing the current level again must be harmless.
    fn apply_actuator(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → status display)
// ───────────────────────────────────────────────────────────────

/// Status presentation.  Implementations may skip unchanged content.
pub trait DisplayPort {
    fn render(&mut self, view: &DisplayView);
}

/// Display adapter for builds without a panel fitted.
pub struct NoDisplay;

impl DisplayPort for NoDisplay {
    fn render(&mut self, _view: &DisplayView) {}
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
