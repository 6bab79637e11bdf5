//! Sink-specific JSON bodies.
//!
//! Key order is part of each sink's contract and follows field order.
//! Absent values are omitted rather than sent as a placeholder.

use serde::Serialize;

use crate::app::reading::Reading;
use crate::error::SinkError;

/// Which body layout a sink expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{temperature, humidity, ppm, adc_value}`
    Metrics,
    /// `{temperature, humidity, adc_value, ppm}`
    Document,
}

#[derive(Serialize)]
struct MetricsBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    humidity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ppm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adc_value: Option<u16>,
}

#[derive(Serialize)]
struct DocumentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    humidity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adc_value: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ppm: Option<f64>,
}

/// Serialise `reading` in the layout `shape` expects.
pub fn encode(shape: PayloadShape, reading: &Reading) -> Result<Vec<u8>, SinkError> {
    let encoded = match shape {
        PayloadShape::Metrics => serde_json::to_vec(&MetricsBody {
            temperature: reading.temperature,
            humidity: reading.humidity,
            ppm: reading.concentration_ppm,
            adc_value: reading.raw_adc,
        }),
        PayloadShape::Document => serde_json::to_vec(&DocumentBody {
            temperature: reading.temperature,
            humidity: reading.humidity,
            adc_value: reading.raw_adc,
            ppm: reading.concentration_ppm,
        }),
    };
    encoded.map_err(|_| SinkError::Serialize)
}
