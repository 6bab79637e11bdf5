//! DHT11 temperature / humidity sensor driver.
//!
//! Single-wire protocol: the host pulls the line low for >=18 ms, releases
//! it, the sensor answers with an 80 us low / 80 us high preamble and then
//! 40 bits.  Each bit is a ~50 us low followed by a high pulse whose width
//! encodes the value (~26 us = 0, ~70 us = 1).  The fifth byte is the
//! 8-bit sum of the first four.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the open-drain GPIO configured by hw_init.
//! On host/test: returns the sample injected via [`sim_set_climate`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::error::SensorFault;

/// Decoded DHT11 sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Decode a raw 5-byte frame, validating its checksum.
///
/// Byte layout: `[hum_int, hum_dec, temp_int, temp_dec, checksum]`.  Bit 7
/// of `temp_dec` marks a negative temperature on newer DHT11 revisions.
pub fn decode_frame(frame: &[u8; 5]) -> Result<ClimateSample, SensorFault> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorFault::ClimateChecksum);
    }

    let humidity_pct = f32::from(frame[0]) + f32::from(frame[1]) / 10.0;
    let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x7f) / 10.0;
    let temperature_c = if frame[3] & 0x80 != 0 { -magnitude } else { magnitude };

    Ok(ClimateSample {
        temperature_c,
        humidity_pct,
    })
}

// ── Simulation injection ──────────────────────────────────────

/// Tenths of a degree / tenths of a percent.
#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_DECI: AtomicI32 = AtomicI32::new(250);
#[cfg(not(target_os = "espidf"))]
static SIM_HUM_DECI: AtomicI32 = AtomicI32::new(500);
#[cfg(not(target_os = "espidf"))]
static SIM_FAULT: AtomicBool = AtomicBool::new(false);

/// Inject the next simulated reading; `None` simulates a timeout.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(sample: Option<(f32, f32)>) {
    match sample {
        Some((t, h)) => {
            SIM_TEMP_DECI.store((t * 10.0).round() as i32, Ordering::Relaxed);
            SIM_HUM_DECI.store((h * 10.0).round() as i32, Ordering::Relaxed);
            SIM_FAULT.store(false, Ordering::Relaxed);
        }
        None => SIM_FAULT.store(true, Ordering::Relaxed),
    }
}

// ── Driver ────────────────────────────────────────────────────

pub struct Dht11Sensor {
    gpio: i32,
    failures: u32,
}

impl Dht11Sensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, failures: 0 }
    }

    /// Consecutive failed reads since the last good one.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    pub fn read(&mut self) -> Result<ClimateSample, SensorFault> {
        let result = self.read_frame().and_then(|frame| decode_frame(&frame));
        match result {
            Ok(_) => self.failures = 0,
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                log::debug!("DHT11 on GPIO{}: {} ({} in a row)", self.gpio, e, self.failures);
            }
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&self) -> Result<[u8; 5], SensorFault> {
        use crate::drivers::hw_init::{delay_us, gpio_read, gpio_write, micros};

        /// Longest legal phase of the protocol, with margin.
        const EDGE_TIMEOUT_US: i64 = 120;
        /// High pulses longer than this are a `1` bit.
        const ONE_THRESHOLD_US: i64 = 40;

        let pin = self.gpio;
        let wait_while = |level: bool| -> Result<i64, SensorFault> {
            let start = micros();
            while gpio_read(pin) == level {
                if micros() - start > EDGE_TIMEOUT_US {
                    return Err(SensorFault::ClimateTimeout);
                }
            }
            Ok(micros() - start)
        };

        // Start signal.
        gpio_write(pin, false);
        delay_us(20_000);
        gpio_write(pin, true);
        delay_us(30);

        // The bit timing is tight; keep other tasks off this core meanwhile.
        let mut frame = [0u8; 5];
        let result = critical(|| {
            wait_while(true)?;
            wait_while(false)?;
            wait_while(true)?;
            for bit in 0..40 {
                wait_while(false)?;
                let high_us = wait_while(true)?;
                if high_us > ONE_THRESHOLD_US {
                    frame[bit / 8] |= 1 << (7 - (bit % 8));
                }
            }
            Ok(())
        });
        gpio_write(pin, true);
        result.map(|()| frame)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&self) -> Result<[u8; 5], SensorFault> {
        if SIM_FAULT.load(Ordering::Relaxed) {
            return Err(SensorFault::ClimateTimeout);
        }
        let t = SIM_TEMP_DECI.load(Ordering::Relaxed);
        let h = SIM_HUM_DECI.load(Ordering::Relaxed).clamp(0, 2559);
        let mut frame = [
            (h / 10) as u8,
            (h % 10) as u8,
            (t.unsigned_abs() / 10).min(255) as u8,
            (t.unsigned_abs() % 10) as u8,
            0,
        ];
        if t < 0 {
            frame[3] |= 0x80;
        }
        frame[4] = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        Ok(frame)
    }
}

/// Run `f` with the scheduler suspended on this core.
#[cfg(target_os = "espidf")]
fn critical<T>(f: impl FnOnce() -> T) -> T {
    // SAFETY: suspend/resume are paired and `f` never blocks on another task.
    unsafe { esp_idf_svc::sys::vTaskSuspendAll() };
    let out = f();
    // SAFETY: paired with the suspend above.
    unsafe { esp_idf_svc::sys::xTaskResumeAll() };
    out
}
