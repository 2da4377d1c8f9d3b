//! Charging decision logic: threshold selection and the hysteresis engine.
//!
//! Nothing in here touches hardware or logs; it is exercised directly by the
//! host test suite.

pub mod hysteresis;
pub mod threshold;

pub use hysteresis::{
    ActuatorCommand, ControllerState, DisplayDetail, DisplayView, HysteresisController,
    PowerReading, Timestamp,
};
pub use threshold::{ConfigIndex, ThresholdConfig, Watts, resolve};
