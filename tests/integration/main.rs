//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware required; the loopback tests open sockets on 127.0.0.1.

#![cfg(not(target_os = "espidf"))]

mod client_tests;
mod controller_tests;
mod loopback_tests;
