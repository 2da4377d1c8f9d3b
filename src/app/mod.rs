//! Application core: control loop orchestration, zero I/O.
//!
//! The [`service::ControlLoop`] sequences one measurement tick: fetch,
//! evaluate, actuate, display.  All interaction with hardware and the
//! network happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
