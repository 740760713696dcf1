//! CarePal firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod registry;
pub mod scheduler;

// Drivers are generic over embedded-hal; adapters carry the cfg-gated
// ESP-IDF pieces inside.
pub mod adapters;
pub mod drivers;
