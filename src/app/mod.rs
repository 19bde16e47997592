//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the feeding/check-in rules: FSM orchestration and
//! applying server schedules.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
