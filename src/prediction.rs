//! Client for the remote concentration forecast service.
//!
//! `GET <url>` answered by `{"predicted_ppm": <number>}`.  Every failure
//! mode maps to a distinct [`PredictionError`]; the caller treats all of
//! them as "no prediction this cycle".

use std::time::Duration;

use serde::Deserialize;

use crate::app::ports::{HttpPort, HttpRequest};
use crate::app::reading::Reading;
use crate::error::PredictionError;

/// A forecast for the next interval.  Negative and zero values are legal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub predicted_ppm: f64,
}

#[derive(Deserialize)]
struct PredictionBody {
    #[serde(default)]
    predicted_ppm: Option<f64>,
}

/// Decode a response body.  `null` and a missing field are the same error.
pub fn decode_prediction(body: &[u8]) -> Result<Prediction, PredictionError> {
    let parsed: PredictionBody =
        serde_json::from_slice(body).map_err(|_| PredictionError::Malformed)?;
    let predicted_ppm = parsed.predicted_ppm.ok_or(PredictionError::MissingField)?;
    if !predicted_ppm.is_finite() {
        return Err(PredictionError::NonFinite);
    }
    Ok(Prediction { predicted_ppm })
}

pub struct PredictionClient {
    url: String,
    timeout: Duration,
    send_features: bool,
}

impl PredictionClient {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            url: url.to_owned(),
            timeout,
            send_features: false,
        }
    }

    /// Append the reading as query parameters on every call.
    pub fn with_features(mut self, enabled: bool) -> Self {
        self.send_features = enabled;
        self
    }

    pub fn predict(
        &self,
        http: &mut impl HttpPort,
        reading: &Reading,
    ) -> Result<Prediction, PredictionError> {
        let url = self.request_url(reading);
        let response = http.execute(&HttpRequest::get(&url, self.timeout))?;
        if !response.is_success() {
            return Err(PredictionError::Status(response.status));
        }
        decode_prediction(&response.body)
    }

    fn request_url(&self, reading: &Reading) -> String {
        if !self.send_features {
            return self.url.clone();
        }

        let mut params: Vec<String> = Vec::with_capacity(4);
        if let Some(adc) = reading.raw_adc {
            params.push(format!("adc={adc}"));
        }
        if let Some(ppm) = reading.concentration_ppm {
            params.push(format!("ppm={ppm:.2}"));
        }
        if let Some(t) = reading.temperature {
            params.push(format!("temperature={t:.1}"));
        }
        if let Some(h) = reading.humidity {
            params.push(format!("humidity={h:.1}"));
        }

        let mut url = self.url.clone();
        if !params.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&params.join("&"));
        }
        url
    }
}
