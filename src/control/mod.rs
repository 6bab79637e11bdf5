//! Actuation control laws.

pub mod hysteresis;
