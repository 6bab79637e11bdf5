//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production, stderr on the host).
//! Recovered failures log at `warn`, aborted cycles at `error`.

use std::fmt;

use log::{error, info, warn};

use crate::app::events::{AbortReason, AppEvent};
use crate::app::ports::EventSink;

/// Formats an optional value, or `--` when absent.
struct Opt<T>(Option<T>, usize);

impl<T: Into<f64> + Copy> fmt::Display for Opt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.*}", self.1, v.into()),
            None => f.write_str("--"),
        }
    }
}

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { fan, sinks } => {
                info!("START | fan={} | sinks={}", fan, sinks);
            }
            AppEvent::Sampled { cycle, reading } => {
                info!(
                    "SENSE | #{} | T={}\u{00b0}C RH={}% | adc={} | ppm={}",
                    cycle,
                    Opt(reading.temperature, 1),
                    Opt(reading.humidity, 1),
                    Opt(reading.raw_adc, 0),
                    Opt(reading.concentration_ppm, 2),
                );
            }
            AppEvent::SensorFault { cycle, fault } => {
                warn!("SENSE | #{} | {}", cycle, fault);
            }
            AppEvent::EstimationFailed { cycle, error } => {
                warn!("SENSE | #{} | {}", cycle, error);
            }
            AppEvent::PredictionReady { cycle, prediction } => {
                info!("PRED  | #{} | predicted={:.2}ppm", cycle, prediction.predicted_ppm);
            }
            AppEvent::PredictionUnavailable { cycle, error } => {
                warn!("PRED  | #{} | unavailable: {}", cycle, error);
            }
            AppEvent::PredictionSkipped { cycle } => {
                info!("PRED  | #{} | skipped, reading invalid", cycle);
            }
            AppEvent::SinkDelivered {
                cycle,
                sink_id,
                status,
            } => {
                info!("SINK  | #{} | {} <- {}", cycle, sink_id, status);
            }
            AppEvent::SinkFailed {
                cycle,
                sink_id,
                error,
            } => {
                warn!("SINK  | #{} | {} failed: {}", cycle, sink_id, error);
            }
            AppEvent::FanSwitched {
                cycle,
                from,
                to,
                transition,
            } => {
                info!(
                    "FAN   | #{} | {} -> {} ({})",
                    cycle,
                    from,
                    to,
                    transition.label()
                );
            }
            AppEvent::DisplayFailed { cycle, error } => {
                warn!("DISPLAY | #{} | {}", cycle, error);
            }
            AppEvent::CycleCompleted(s) => {
                info!(
                    "CYCLE | #{} | ppm={} pred={} | fan={} {} | sinks ok={} failed={}",
                    s.cycle,
                    Opt(s.concentration_ppm, 2),
                    Opt(s.predicted_ppm, 2),
                    s.fan,
                    s.transition.label(),
                    s.sinks_ok,
                    s.sinks_failed,
                );
            }
            AppEvent::CycleAborted { cycle, reason } => match reason {
                AbortReason::Error(e) => error!("ABORT | #{} | {}", cycle, e),
                AbortReason::Panic(msg) => error!("ABORT | #{} | panic: {}", cycle, msg),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_values_render_placeholder() {
        assert_eq!(Opt(Some(45.654_f64), 2).to_string(), "45.65");
        assert_eq!(Opt(Some(26.0_f32), 1).to_string(), "26.0");
        assert_eq!(Opt::<f64>(None, 2).to_string(), "--");
        assert_eq!(Opt(Some(2048_u16), 0).to_string(), "2048");
    }
}
