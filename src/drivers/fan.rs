//! Fan relay driver.
//!
//! Generic over an `embedded-hal` [`OutputPin`] so the board build wraps a
//! raw GPIO ([`GpioOutput`](super::hw_init::GpioOutput)) and tests wrap a
//! recording pin.
//!
//! Every `set` writes the pin, even when the level is unchanged, so a relay
//! glitch is corrected on the next cycle.  Only real transitions are logged.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::error::ActuatorError;

pub struct FanDriver<P> {
    pin: P,
    on: bool,
    /// Relay boards exist in both polarities.
    active_high: bool,
}

impl<P: OutputPin> FanDriver<P> {
    /// Active-high relay, assumed off at construction.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            on: false,
            active_high: true,
        }
    }

    pub fn active_low(mut self) -> Self {
        self.active_high = false;
        self
    }

    /// Drive the relay.  Idempotent: repeated calls leave the same level.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on == self.active_high;
        let result = if high { self.pin.set_high() } else { self.pin.set_low() };
        if result.is_err() {
            warn!("Fan relay write failed (requested {})", if on { "ON" } else { "OFF" });
            return Err(ActuatorError::GpioWriteFailed);
        }

        if on != self.on {
            info!("Fan {}", if on { "ON" } else { "OFF" });
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
