//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the fan relay driver, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::fan::FanDriver;
use crate::error::{ActuatorError, SensorFault};
use crate::sensors::SensorHub;
use crate::sensors::climate::ClimateSample;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P> {
    sensor_hub: SensorHub,
    fan: FanDriver<P>,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(sensor_hub: SensorHub, fan: FanDriver<P>) -> Self {
        Self { sensor_hub, fan }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: OutputPin> SensorPort for HardwareAdapter<P> {
    fn read_temperature_humidity(&mut self) -> Result<ClimateSample, SensorFault> {
        self.sensor_hub.read_climate()
    }

    fn read_gas_adc(&mut self) -> Result<u16, SensorFault> {
        self.sensor_hub.read_gas_raw()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: OutputPin> ActuatorPort for HardwareAdapter<P> {
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.fan.set(on)
    }

    fn is_fan_on(&self) -> bool {
        self.fan.is_on()
    }
}
