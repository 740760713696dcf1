//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules of the assistant: flow sequencing, tag
//! session handling, reminder rendering and screen composition.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod screens;
pub mod service;
