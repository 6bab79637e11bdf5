//! Per-cycle sensor snapshot.

use crate::error::{EstimationError, SensorFault};
use crate::sensors::gas::GasCalibration;

use super::ports::SensorPort;

/// What the sensors returned this cycle, before estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub raw_adc: Option<u16>,
    /// Set when the climate sensor failed and its fields are absent.
    pub climate_fault: Option<SensorFault>,
    /// Set when the gas ADC could not be read and `raw_adc` is absent.
    pub gas_fault: Option<SensorFault>,
}

impl RawSample {
    /// Neither sensor produced anything.
    pub fn is_empty(&self) -> bool {
        self.raw_adc.is_none() && self.temperature.is_none() && self.humidity.is_none()
    }
}

/// Read both sensors once.
///
/// Each sensor is read independently; a fault on one leaves its fields
/// empty and records the fault.  No retries.
pub fn read_once(port: &mut impl SensorPort) -> RawSample {
    let (temperature, humidity, climate_fault) = match port.read_temperature_humidity() {
        Ok(s) => (Some(s.temperature_c), Some(s.humidity_pct), None),
        Err(fault) => (None, None, Some(fault)),
    };
    let (raw_adc, gas_fault) = match port.read_gas_adc() {
        Ok(raw) => (Some(raw), None),
        Err(fault) => (None, Some(fault)),
    };

    RawSample {
        temperature,
        humidity,
        raw_adc,
        climate_fault,
        gas_fault,
    }
}

/// Immutable snapshot for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    /// `None` when the gas ADC could not be read.
    pub raw_adc: Option<u16>,
    /// `None` when there was no gas sample or estimation failed; the reading
    /// is then invalid for prediction and control but still worth reporting.
    pub concentration_ppm: Option<f64>,
}

impl Reading {
    /// Run the estimator over a raw sample.  No gas sample means no
    /// estimate and no estimation error.
    pub fn from_sample(
        sample: &RawSample,
        calibration: &GasCalibration,
    ) -> (Self, Option<EstimationError>) {
        let (ppm, err) = match sample.raw_adc.map(|raw| calibration.estimate(raw)) {
            Some(Ok(ppm)) => (Some(ppm), None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        };
        let reading = Self {
            temperature: sample.temperature,
            humidity: sample.humidity,
            raw_adc: sample.raw_adc,
            concentration_ppm: ppm,
        };
        (reading, err)
    }

    pub fn is_valid(&self) -> bool {
        self.concentration_ppm.is_some()
    }
}
