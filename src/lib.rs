//! MHAS firmware library.
//!
//! Motion/tamper alarm node: samples PIR sensors on PCF8574 expanders,
//! stretches motion pulses, and publishes per-channel state to MQTT on
//! change or heartbeat. The pure-logic modules are exposed for host
//! integration testing; all ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod pins;
pub mod sensors;
pub mod time;
pub mod topology;

pub mod adapters;
pub mod drivers;
