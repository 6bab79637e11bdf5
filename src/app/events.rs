//! Outbound application events.
//!
//! The [`ControlLoop`](super::control_loop::ControlLoop) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Every recovered failure
//! produces one, tagged with its cycle number, so nothing is dropped
//! silently.

use crate::control::hysteresis::{FanState, Transition};
use crate::error::{DisplayError, Error, EstimationError, PredictionError, SensorFault, SinkError};
use crate::prediction::Prediction;

use super::reading::Reading;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop has started; the fan was driven to its initial state.
    Started { fan: FanState, sinks: usize },

    /// A reading was taken (possibly partial or invalid).
    Sampled { cycle: u64, reading: Reading },

    /// A sensor read failed.
    SensorFault { cycle: u64, fault: SensorFault },

    /// The gas sample could not be converted; the reading is invalid.
    EstimationFailed { cycle: u64, error: EstimationError },

    PredictionReady { cycle: u64, prediction: Prediction },

    /// The prediction call failed; the controller holds this cycle.
    PredictionUnavailable { cycle: u64, error: PredictionError },

    /// No prediction was requested because the reading is invalid.
    PredictionSkipped { cycle: u64 },

    SinkDelivered { cycle: u64, sink_id: &'static str, status: u16 },

    SinkFailed { cycle: u64, sink_id: &'static str, error: SinkError },

    /// The fan changed between on and off.
    FanSwitched {
        cycle: u64,
        from: FanState,
        to: FanState,
        transition: Transition,
    },

    DisplayFailed { cycle: u64, error: DisplayError },

    /// One-line digest of a finished cycle.
    CycleCompleted(CycleSummary),

    /// The iteration boundary caught an error or a panic.
    CycleAborted { cycle: u64, reason: AbortReason },
}

/// Digest of one cycle, small enough to log on a single line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub concentration_ppm: Option<f64>,
    pub predicted_ppm: Option<f64>,
    pub fan: FanState,
    pub transition: Transition,
    pub sinks_ok: u8,
    pub sinks_failed: u8,
}

/// Why an iteration did not complete.
#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    Error(Error),
    /// Panic message, truncated.
    Panic(heapless::String<64>),
}
