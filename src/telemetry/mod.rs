//! Best-effort fan-out of each reading to independent telemetry sinks.
//!
//! Sinks are attempted sequentially in configuration order.  A failure in
//! one (encoding, transport, non-2xx) is recorded in its [`SinkResult`] and
//! never prevents the next from being attempted.  No retries.

pub mod payload;

use std::time::Duration;

use log::debug;

use crate::app::ports::{HttpPort, HttpRequest};
use crate::app::reading::Reading;
use crate::error::SinkError;

pub use payload::PayloadShape;

/// A static header credential forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub header: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub id: &'static str,
    pub url: String,
    pub credential: Option<Credential>,
    pub shape: PayloadShape,
    pub timeout: Duration,
}

/// Outcome of one sink in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkResult {
    pub sink_id: &'static str,
    /// HTTP status on success.
    pub outcome: Result<u16, SinkError>,
}

impl SinkResult {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct TelemetryDispatcher {
    sinks: Vec<SinkConfig>,
}

impl TelemetryDispatcher {
    pub fn new(sinks: Vec<SinkConfig>) -> Self {
        Self { sinks }
    }

    pub fn sinks(&self) -> &[SinkConfig] {
        &self.sinks
    }

    /// One result per configured sink, in order.  Never fails as a whole.
    pub fn dispatch(&self, http: &mut impl HttpPort, reading: &Reading) -> Vec<SinkResult> {
        self.sinks
            .iter()
            .map(|sink| {
                let outcome = deliver(http, sink, reading);
                debug!("sink {}: {:?}", sink.id, outcome);
                SinkResult {
                    sink_id: sink.id,
                    outcome,
                }
            })
            .collect()
    }
}

fn deliver(
    http: &mut impl HttpPort,
    sink: &SinkConfig,
    reading: &Reading,
) -> Result<u16, SinkError> {
    let body = payload::encode(sink.shape, reading)?;

    let mut headers: Vec<(&str, &str)> = Vec::with_capacity(2);
    if let Some(cred) = &sink.credential {
        headers.push((cred.header.as_str(), cred.value.as_str()));
    }
    headers.push(("Content-Type", "application/json"));

    let request = HttpRequest::post_json(&sink.url, &headers, &body, sink.timeout);
    let response = http.execute(&request)?;
    if response.is_success() {
        Ok(response.status)
    } else {
        Err(SinkError::Status(response.status))
    }
}
