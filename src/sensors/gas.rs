//! MQ-135 air-quality sensor: ADC driver and concentration estimator.
//!
//! The sensor's resistance `Rs` falls as gas concentration rises.  With the
//! sensor in series with a load resistor `RL`, the ADC sees
//! `Vout = Vref * RL / (Rs + RL)`, so
//!
//! ```text
//! Rs    = (Vref - Vout) / Vout * RL
//! ratio = Rs / R0
//! ppm   = 10 ^ (slope * log10(ratio) + intercept)
//! ```
//!
//! with the datasheet's log-log curve fit (slope -0.42, intercept 1.92).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH6 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::error::{EstimationError, SensorFault};

#[cfg(not(target_os = "espidf"))]
static SIM_GAS_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_GAS_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: u16) {
    SIM_GAS_ADC.store(raw, Ordering::Relaxed);
    SIM_GAS_FAULT.store(false, Ordering::Relaxed);
}

/// Make the next simulated reads fail until [`sim_set_gas_adc`] is called.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_gas_adc() {
    SIM_GAS_FAULT.store(true, Ordering::Relaxed);
}

// ── Estimator ─────────────────────────────────────────────────

pub const DEFAULT_ADC_MAX: u16 = 4095;
pub const CURVE_SLOPE: f64 = -0.42;
pub const CURVE_INTERCEPT: f64 = 1.92;

/// Calibration constants for one sensor/board combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasCalibration {
    pub adc_max: u16,
    pub reference_voltage: f64,
    pub load_resistance: f64,
    pub baseline_resistance: f64,
    pub slope: f64,
    pub intercept: f64,
}

impl Default for GasCalibration {
    fn default() -> Self {
        Self {
            adc_max: DEFAULT_ADC_MAX,
            reference_voltage: 5.0,
            load_resistance: 30_440.0,
            baseline_resistance: 7_293.0,
            slope: CURVE_SLOPE,
            intercept: CURVE_INTERCEPT,
        }
    }
}

impl GasCalibration {
    /// Convert a raw sample into ppm, rounded to two decimals.
    pub fn estimate(&self, raw_adc: u16) -> Result<f64, EstimationError> {
        if raw_adc == 0 {
            return Err(EstimationError::ZeroSample);
        }
        if raw_adc > self.adc_max {
            return Err(EstimationError::OutOfRange(raw_adc));
        }
        if self.adc_max < 2
            || !(self.reference_voltage > 0.0
                && self.load_resistance > 0.0
                && self.baseline_resistance > 0.0)
        {
            return Err(EstimationError::InvalidCalibration);
        }

        // A saturated ADC would give Rs = 0 and an infinite concentration;
        // treat it as one count below full scale.
        let raw = raw_adc.min(self.adc_max - 1);

        let v_out = f64::from(raw) / f64::from(self.adc_max) * self.reference_voltage;
        let rs = (self.reference_voltage - v_out) / v_out * self.load_resistance;
        let ratio = rs / self.baseline_resistance;
        let ppm = 10f64.powf(self.slope * ratio.log10() + self.intercept);

        if !ppm.is_finite() {
            return Err(EstimationError::NonPhysical);
        }
        Ok(round_centi(ppm))
    }
}

/// Estimate with the stock 12-bit range and MQ-135 curve.
pub fn estimate(
    raw_adc: u16,
    reference_voltage: f64,
    load_resistance: f64,
    baseline_resistance: f64,
) -> Result<f64, EstimationError> {
    GasCalibration {
        reference_voltage,
        load_resistance,
        baseline_resistance,
        ..GasCalibration::default()
    }
    .estimate(raw_adc)
}

fn round_centi(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Driver ────────────────────────────────────────────────────

pub struct Mq135Sensor {
    channel: u32,
    total_reads: u32,
}

impl Mq135Sensor {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            total_reads: 0,
        }
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    pub fn read_raw(&mut self) -> Result<u16, SensorFault> {
        self.total_reads = self.total_reads.saturating_add(1);
        self.read_adc().ok_or_else(|| {
            log::debug!("MQ-135: ADC1 channel {} returned no sample", self.channel);
            SensorFault::GasAdcReadFailed
        })
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        crate::drivers::hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        if SIM_GAS_FAULT.load(Ordering::Relaxed) {
            None
        } else {
            Some(SIM_GAS_ADC.load(Ordering::Relaxed))
        }
    }
}
