//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the full [`AppService`]
//! against the simulated board in `mock_hw`.  All tests run on the host
//! (x86_64) with no real hardware required.
//!
//! [`AppService`]: carepal::app::service::AppService

mod flow_tests;
mod reminder_tests;
mod session_tests;
