//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, fan relay, display, HTTP, event sinks) implement
//! these traits.  The [`ControlLoop`](super::control_loop::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware or
//! sockets directly.  All port errors are typed.

use std::time::Duration;

use crate::error::{ActuatorError, DisplayError, SensorFault, TransportError};
use crate::sensors::climate::ClimateSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: blocking reads of the two physical sensors.
pub trait SensorPort {
    /// DHT11 temperature (°C) and relative humidity (%).
    fn read_temperature_humidity(&mut self) -> Result<ClimateSample, SensorFault>;

    /// Raw MQ-135 ADC sample (0..=adc_max).
    fn read_gas_adc(&mut self) -> Result<u16, SensorFault>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the fan relay.
pub trait ActuatorPort {
    /// Switch the fan.  Must be idempotent: calling twice with the same
    /// value is equivalent to calling once.
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Last level successfully applied.
    fn is_fan_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → panel)
// ───────────────────────────────────────────────────────────────

/// Text-only framebuffer: `clear`, draw lines, then `flush` to the panel.
pub trait DisplayPort {
    fn clear(&mut self);

    /// Draw `text` with its top-left corner at pixel (`x`, `y`).
    fn write_line(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError>;

    fn flush(&mut self) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outbound request.  Borrowed so callers can build it without cloning
/// URLs or credentials every cycle.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub body: Option<&'a [u8]>,
    /// Upper bound for the whole exchange.
    pub timeout: Duration,
}

impl<'a> HttpRequest<'a> {
    pub fn get(url: &'a str, timeout: Duration) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: &[],
            body: None,
            timeout,
        }
    }

    pub fn post_json(
        url: &'a str,
        headers: &'a [(&'a str, &'a str)],
        body: &'a [u8],
        timeout: Duration,
    ) -> Self {
        Self {
            method: Method::Post,
            url,
            headers,
            body: Some(body),
            timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking request/response exchange.  Non-2xx statuses are *not* errors at
/// this level; only failures to complete the exchange are.
pub trait HttpPort {
    fn execute(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
