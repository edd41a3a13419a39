//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the controller: message
//! dispatch orchestration, the per-tick logging pass and startup.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod ports;
pub mod service;
