//! CatFeeder firmware library.
//!
//! Exposes the pure-logic modules for integration testing and fuzzing.
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; everything else builds and tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod buffer;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod rpc;
pub mod schedule;
