//! Control loop — the hexagonal core.
//!
//! [`ControlLoop`] owns the fan hysteresis state and the clients for the
//! prediction service and telemetry sinks.  All I/O flows through port
//! traits injected at call sites, making the loop testable with mock
//! adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ ActuatorPort
//!                  │        ControlLoop       │
//!     HttpPort ◀──▶│ estimate · predict · fan │ ──▶ DisplayPort
//!                  └──────────────────────────┘ ──▶ EventSink
//! ```
//!
//! One iteration: read → estimate → dispatch telemetry → predict → decide →
//! actuate → present.  Every component failure is recovered inside
//! [`ControlLoop::tick`]; only a failed fan write escapes to the iteration
//! boundary ([`ControlLoop::run_iteration`]), which also catches panics.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use log::{error, info, warn};

use crate::config::{DeviceConfig, SystemConfig};
use crate::control::hysteresis::{FanController, FanState, Transition};
use crate::diagnostics;
use crate::error::{ActuatorError, Error, EstimationError};
use crate::prediction::{Prediction, PredictionClient};
use crate::sensors::gas::GasCalibration;
use crate::telemetry::{SinkResult, TelemetryDispatcher};

use super::events::{AbortReason, AppEvent, CycleSummary};
use super::ports::{ActuatorPort, DisplayPort, EventSink, HttpPort, SensorPort};
use super::presenter::{self, StatusView};
use super::reading::{self, Reading};

/// Everything one iteration produced.  Dropped by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    /// `None` when neither sensor could be read.
    pub reading: Option<Reading>,
    pub estimation_error: Option<EstimationError>,
    pub prediction: Option<Prediction>,
    pub transition: Transition,
    pub fan: FanState,
    pub sink_results: Vec<SinkResult>,
}

impl CycleReport {
    pub fn summary(&self) -> CycleSummary {
        let ok = self.sink_results.iter().filter(|r| r.success()).count();
        CycleSummary {
            cycle: self.cycle,
            concentration_ppm: self.reading.and_then(|r| r.concentration_ppm),
            predicted_ppm: self.prediction.map(|p| p.predicted_ppm),
            fan: self.fan,
            transition: self.transition,
            sinks_ok: ok as u8,
            sinks_failed: (self.sink_results.len() - ok) as u8,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    calibration: GasCalibration,
    predictor: PredictionClient,
    dispatcher: TelemetryDispatcher,
    fan: FanController,
    period: Duration,
    cycle: u64,
}

impl ControlLoop {
    pub fn new(
        config: &SystemConfig,
        predictor: PredictionClient,
        dispatcher: TelemetryDispatcher,
    ) -> Self {
        Self {
            calibration: config.calibration(),
            predictor,
            dispatcher,
            fan: FanController::new(config.fan_high_threshold_ppm, config.fan_cooldown_cycles),
            period: config.loop_period(),
            cycle: 0,
        }
    }

    /// Wire the prediction client and both sinks from device configuration.
    pub fn from_config(system: &SystemConfig, device: &DeviceConfig) -> Self {
        Self::new(
            system,
            device.prediction_client(system),
            TelemetryDispatcher::new(device.telemetry_sinks(system)),
        )
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the fan to its initial (off) state.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        let fan = self.fan.state();
        hw.set_fan(fan.fan_on)?;
        sink.emit(&AppEvent::Started {
            fan,
            sinks: self.dispatcher.sinks().len(),
        });
        info!(
            "ControlLoop started: fan {}, threshold {:.1} ppm, period {}ms, {} sinks",
            fan,
            self.fan.high_threshold_ppm(),
            self.period.as_millis(),
            self.dispatcher.sinks().len()
        );
        Ok(())
    }

    /// Repeat iterations forever, calling `on_iteration` (watchdog feed)
    /// after each and sleeping the period in between.
    pub fn run_forever(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        http: &mut impl HttpPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
        mut on_iteration: impl FnMut(),
    ) -> ! {
        loop {
            let _ = self.run_iteration(hw, http, display, sink);
            on_iteration();
            std::thread::sleep(self.period);
        }
    }

    /// The iteration boundary: runs [`tick`](Self::tick) and absorbs any
    /// error or panic it produced, so the next iteration always runs.
    pub fn run_iteration(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        http: &mut impl HttpPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Option<CycleReport> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.tick(hw, http, display, sink)
        }));
        let cycle = self.cycle;

        let report = match outcome {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                warn!("cycle {}: aborted: {}", cycle, e);
                sink.emit(&AppEvent::CycleAborted {
                    cycle,
                    reason: AbortReason::Error(e),
                });
                None
            }
            Err(payload) => {
                let msg = diagnostics::panic_message(payload.as_ref());
                error!("cycle {}: panicked: {}", cycle, msg);
                let mut truncated: heapless::String<64> = heapless::String::new();
                for ch in msg.chars() {
                    if truncated.push(ch).is_err() {
                        break;
                    }
                }
                sink.emit(&AppEvent::CycleAborted {
                    cycle,
                    reason: AbortReason::Panic(truncated),
                });
                None
            }
        };

        diagnostics::log_heap(cycle);
        report
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle.
    ///
    /// `hw` provides both [`SensorPort`] and [`ActuatorPort`] through a
    /// single mutable borrow.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        http: &mut impl HttpPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<CycleReport, Error> {
        self.cycle += 1;
        let cycle = self.cycle;

        // 1. Sense
        let sample = reading::read_once(hw);
        for fault in [sample.climate_fault, sample.gas_fault].into_iter().flatten() {
            sink.emit(&AppEvent::SensorFault { cycle, fault });
        }
        if sample.is_empty() {
            return self.hold_without_reading(hw, display, sink);
        }

        // 2. Estimate
        let (reading, estimation_error) = Reading::from_sample(&sample, &self.calibration);
        if let Some(error) = estimation_error {
            sink.emit(&AppEvent::EstimationFailed { cycle, error });
        }
        sink.emit(&AppEvent::Sampled { cycle, reading });

        // 3. Telemetry, also for partial or invalid readings (absent fields omitted)
        let sink_results = self.dispatcher.dispatch(http, &reading);
        for result in &sink_results {
            let event = match result.outcome {
                Ok(status) => AppEvent::SinkDelivered {
                    cycle,
                    sink_id: result.sink_id,
                    status,
                },
                Err(error) => AppEvent::SinkFailed {
                    cycle,
                    sink_id: result.sink_id,
                    error,
                },
            };
            sink.emit(&event);
        }

        // 4. Predict (only from a valid reading)
        let prediction = if reading.is_valid() {
            match self.predictor.predict(http, &reading) {
                Ok(prediction) => {
                    sink.emit(&AppEvent::PredictionReady { cycle, prediction });
                    Some(prediction)
                }
                Err(error) => {
                    sink.emit(&AppEvent::PredictionUnavailable { cycle, error });
                    None
                }
            }
        } else {
            sink.emit(&AppEvent::PredictionSkipped { cycle });
            None
        };

        // 5. Decide + actuate
        let (transition, fan, actuation) =
            self.decide_and_apply(prediction.map(|p| p.predicted_ppm), hw, sink);

        // 6. Present
        self.present(
            display,
            &StatusView {
                reading: Some(reading),
                prediction,
                fan,
            },
            sink,
        );

        actuation?;
        let report = CycleReport {
            cycle,
            reading: Some(reading),
            estimation_error,
            prediction,
            transition,
            fan,
            sink_results,
        };
        sink.emit(&AppEvent::CycleCompleted(report.summary()));
        Ok(report)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn fan_state(&self) -> FanState {
        self.fan.state()
    }

    /// Cycles started since construction.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    // ── Internal ──────────────────────────────────────────────

    /// Neither sensor answered: skip telemetry and prediction, hold the
    /// fan, and show the fault on screen.
    fn hold_without_reading(
        &mut self,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<CycleReport, Error> {
        let cycle = self.cycle;

        let (transition, fan, actuation) = self.decide_and_apply(None, hw, sink);
        self.present(
            display,
            &StatusView {
                reading: None,
                prediction: None,
                fan,
            },
            sink,
        );

        actuation?;
        let report = CycleReport {
            cycle,
            reading: None,
            estimation_error: None,
            prediction: None,
            transition,
            fan,
            sink_results: Vec::new(),
        };
        sink.emit(&AppEvent::CycleCompleted(report.summary()));
        Ok(report)
    }

    /// Advance the hysteresis and re-assert the fan level every cycle.
    fn decide_and_apply(
        &mut self,
        predicted_ppm: Option<f64>,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> (Transition, FanState, Result<(), ActuatorError>) {
        let before = self.fan.state();
        let transition = self.fan.decide(predicted_ppm);
        let after = self.fan.state();

        if before.fan_on != after.fan_on {
            sink.emit(&AppEvent::FanSwitched {
                cycle: self.cycle,
                from: before,
                to: after,
                transition,
            });
        }
        (transition, after, hw.set_fan(after.fan_on))
    }

    fn present(&self, display: &mut impl DisplayPort, view: &StatusView, sink: &mut impl EventSink) {
        if let Err(error) = presenter::render(display, view) {
            sink.emit(&AppEvent::DisplayFailed {
                cycle: self.cycle,
                error,
            });
        }
    }
}
