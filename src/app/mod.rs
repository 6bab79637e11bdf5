//! Application core — domain logic behind port traits.
//!
//! This module contains the rules of the AirFan system: per-cycle reading,
//! the control loop orchestration and the status screen.  All interaction
//! with hardware and the network happens through the traits in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod control_loop;
pub mod events;
pub mod ports;
pub mod presenter;
pub mod reading;
