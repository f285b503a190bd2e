//! ESS battery-bank controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host-side
//! tooling.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod battery;
pub mod config;
pub mod error;
pub mod fault;
pub mod rpc;
pub mod scheduler;

pub mod pins;

// Hardware-facing modules; each carries a host simulation twin.
pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;
