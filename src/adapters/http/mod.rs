//! Blocking HTTP client adapter.
//!
//! Implements [`HttpPort`] for the prediction client and the telemetry
//! dispatcher.  Every request carries its own timeout; a non-2xx status is
//! returned as a normal response so the caller can classify it.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_http_client` through
//!   `EspHttpConnection`, one connection per request.
//! - **all other targets**: a pooled `ureq` agent, used by the host
//!   simulation and the integration tests.

#[cfg(target_os = "espidf")]
mod esp_impl;
#[cfg(not(target_os = "espidf"))]
mod host_impl;

use log::{debug, warn};

use crate::app::ports::{HttpPort, HttpRequest, HttpResponse};
use crate::error::TransportError;

/// Response bodies larger than this are refused.
pub const MAX_BODY_BYTES: usize = 4096;

pub struct HttpAdapter {
    #[cfg(not(target_os = "espidf"))]
    agent: ureq::Agent,
    requests: u32,
    failures: u32,
}

impl HttpAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            agent: host_impl::agent(),
            requests: 0,
            failures: 0,
        }
    }

    /// Requests attempted since boot.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Requests that ended in a transport error.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl Default for HttpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPort for HttpAdapter {
    fn execute(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        self.requests = self.requests.wrapping_add(1);

        #[cfg(target_os = "espidf")]
        let result = esp_impl::execute(request);
        #[cfg(not(target_os = "espidf"))]
        let result = host_impl::execute(&self.agent, request);

        match &result {
            Ok(resp) => debug!(
                "http: {:?} {} -> {} ({}B)",
                request.method,
                request.url,
                resp.status,
                resp.body.len()
            ),
            Err(e) => {
                self.failures = self.failures.wrapping_add(1);
                warn!("http: {:?} {} failed: {}", request.method, request.url, e);
            }
        }
        result
    }
}
