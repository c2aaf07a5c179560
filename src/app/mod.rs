//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the driver-cycle orchestration for the alarm:
//! sampling, publish decisions and command handling. All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
