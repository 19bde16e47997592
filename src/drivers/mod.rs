//! Actuator and indicator drivers.

pub mod servo;
pub mod status_led;
