//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both drivers.  [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter)
//! exposes it to the domain through [`SensorPort`](crate::app::ports::SensorPort).

pub mod climate;
pub mod gas;

use climate::{ClimateSample, Dht11Sensor};
use gas::Mq135Sensor;

use crate::error::SensorFault;

/// Aggregates the sensor drivers.
pub struct SensorHub {
    pub gas: Mq135Sensor,
    pub climate: Dht11Sensor,
}

impl SensorHub {
    /// Pass in pre-built drivers (built in main where pin ownership is
    /// established).
    pub fn new(gas: Mq135Sensor, climate: Dht11Sensor) -> Self {
        Self { gas, climate }
    }

    pub fn read_climate(&mut self) -> Result<ClimateSample, SensorFault> {
        self.climate.read()
    }

    pub fn read_gas_raw(&mut self) -> Result<u16, SensorFault> {
        self.gas.read_raw()
    }
}
