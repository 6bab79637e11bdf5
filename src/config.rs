//! System configuration parameters
//!
//! [`SystemConfig`] holds the tunables (calibration, hysteresis, timing) and
//! has working defaults.  [`DeviceConfig`] holds per-device credentials and
//! endpoints; it has no defaults for the required keys and refuses to load
//! without them.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::prediction::PredictionClient;
use crate::sensors::gas::GasCalibration;
use crate::telemetry::{Credential, PayloadShape, SinkConfig};

/// Sink identifier for the industrial metrics API.
pub const METRICS_SINK_ID: &str = "ubidots";
/// Sink identifier for the document store API.
pub const DOCUMENT_SINK_ID: &str = "mongodb";

const DEFAULT_METRICS_BASE_URL: &str = "http://industrial.api.ubidots.com";
const METRICS_AUTH_HEADER: &str = "X-Auth-Token";

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- MQ-135 calibration ---
    /// Full-scale ADC value (12-bit)
    pub adc_max_value: u16,
    /// Sensor supply voltage (V)
    pub reference_voltage: f64,
    /// Load resistor RL (ohm)
    pub load_resistance_ohm: f64,
    /// Baseline resistance R0 in clean air (ohm)
    pub baseline_resistance_ohm: f64,
    /// log-log curve slope
    pub curve_slope: f64,
    /// log-log curve intercept
    pub curve_intercept: f64,

    // --- Fan hysteresis ---
    /// Predicted concentration (ppm) that latches the fan on
    pub fan_high_threshold_ppm: f64,
    /// Cycles the fan keeps running once the prediction drops
    pub fan_cooldown_cycles: u8,

    // --- Timing ---
    /// Sleep between iterations (milliseconds)
    pub loop_period_ms: u32,
    /// Per-request HTTP timeout (milliseconds)
    pub http_timeout_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Prediction ---
    /// Append the latest reading as query parameters on the prediction call
    pub prediction_send_features: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // MQ-135
            adc_max_value: 4095,
            reference_voltage: 5.0,
            load_resistance_ohm: 30_440.0,
            baseline_resistance_ohm: 7_293.0,
            curve_slope: -0.42,
            curve_intercept: 1.92,

            // Fan
            fan_high_threshold_ppm: 22.0,
            fan_cooldown_cycles: 3,

            // Timing
            loop_period_ms: 2_000,
            http_timeout_ms: 5_000,
            watchdog_timeout_ms: 30_000,

            // Prediction
            prediction_send_features: false,
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON override; absent fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("config JSON is malformed"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the loop misbehave.
    pub fn validate(&self) -> Result<(), Error> {
        if self.adc_max_value < 2 {
            return Err(Error::Config("adc_max_value must be at least 2"));
        }
        if !(self.reference_voltage > 0.0
            && self.load_resistance_ohm > 0.0
            && self.baseline_resistance_ohm > 0.0)
        {
            return Err(Error::Config("calibration voltages and resistances must be positive"));
        }
        if !(self.curve_slope.is_finite() && self.curve_intercept.is_finite()) {
            return Err(Error::Config("curve constants must be finite"));
        }
        if !self.fan_high_threshold_ppm.is_finite() {
            return Err(Error::Config("fan_high_threshold_ppm must be finite"));
        }
        if self.loop_period_ms == 0 || self.http_timeout_ms == 0 {
            return Err(Error::Config("loop period and HTTP timeout must be non-zero"));
        }
        // Worst case per iteration: one prediction call plus two sink posts.
        let worst_cycle_ms = u64::from(self.http_timeout_ms) * 3 + u64::from(self.loop_period_ms);
        if u64::from(self.watchdog_timeout_ms) <= worst_cycle_ms {
            return Err(Error::Config("watchdog timeout shorter than worst-case cycle"));
        }
        Ok(())
    }

    pub fn calibration(&self) -> GasCalibration {
        GasCalibration {
            adc_max: self.adc_max_value,
            reference_voltage: self.reference_voltage,
            load_resistance: self.load_resistance_ohm,
            baseline_resistance: self.baseline_resistance_ohm,
            slope: self.curve_slope,
            intercept: self.curve_intercept,
        }
    }

    pub fn loop_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.loop_period_ms))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.http_timeout_ms))
    }
}

// ---------------------------------------------------------------------------
// Device credentials & endpoints
// ---------------------------------------------------------------------------

/// Per-device credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub device_id: String,
    pub token: String,
    pub metrics_base_url: String,
    pub document_store_url: String,
    pub prediction_url: String,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

impl DeviceConfig {
    /// Build from any key/value source.  Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(Error::MissingConfig(key));

        let config = Self {
            device_id: required("DEVICE_ID")?,
            token: required("TOKEN")?,
            document_store_url: required("MONGO_API")?,
            prediction_url: required("PREDICTION_URL")?,
            metrics_base_url: get("UBIDOTS_URL")
                .unwrap_or_else(|| DEFAULT_METRICS_BASE_URL.to_owned()),
            wifi_ssid: get("WIFI_SSID"),
            wifi_password: get("WIFI_PASS"),
        };

        for url in [
            &config.metrics_base_url,
            &config.document_store_url,
            &config.prediction_url,
        ] {
            if !is_http_url(url) {
                return Err(Error::Config("endpoint URLs must start with http:// or https://"));
            }
        }
        Ok(config)
    }

    /// Layered load: process environment, then `./.env`, then values baked in
    /// at build time.
    pub fn load() -> Result<Self, Error> {
        let dotenv = std::fs::read_to_string(".env")
            .map(|contents| parse_env_file(&contents))
            .unwrap_or_default();
        if !dotenv.is_empty() {
            log::info!("config: read {} entries from .env", dotenv.len());
        }

        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
                .or_else(|| compiled_env(key))
        })
    }

    /// Full URL of this device on the metrics API.
    pub fn metrics_url(&self) -> String {
        format!(
            "{}/api/v1.6/devices/{}",
            self.metrics_base_url.trim_end_matches('/'),
            self.device_id
        )
    }

    pub fn prediction_client(&self, system: &SystemConfig) -> PredictionClient {
        PredictionClient::new(&self.prediction_url, system.http_timeout())
            .with_features(system.prediction_send_features)
    }

    /// Both sinks, in dispatch order.
    pub fn telemetry_sinks(&self, system: &SystemConfig) -> Vec<SinkConfig> {
        vec![
            SinkConfig {
                id: METRICS_SINK_ID,
                url: self.metrics_url(),
                credential: Some(Credential {
                    header: METRICS_AUTH_HEADER.to_owned(),
                    value: self.token.clone(),
                }),
                shape: PayloadShape::Metrics,
                timeout: system.http_timeout(),
            },
            SinkConfig {
                id: DOCUMENT_SINK_ID,
                url: self.document_store_url.clone(),
                credential: None,
                shape: PayloadShape::Document,
                timeout: system.http_timeout(),
            },
        ]
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Parse `KEY=VALUE` lines.  Blank lines and `#` comments are skipped,
/// an `export ` prefix is tolerated and surrounding quotes are stripped.
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((key.trim().to_owned(), value.to_owned()))
        })
        .collect()
}

/// Values captured from the build environment (the only source on device).
pub fn compiled_env(key: &str) -> Option<String> {
    let value = match key {
        "DEVICE_ID" => option_env!("DEVICE_ID"),
        "TOKEN" => option_env!("TOKEN"),
        "MONGO_API" => option_env!("MONGO_API"),
        "PREDICTION_URL" => option_env!("PREDICTION_URL"),
        "UBIDOTS_URL" => option_env!("UBIDOTS_URL"),
        "WIFI_SSID" => option_env!("WIFI_SSID"),
        "WIFI_PASS" => option_env!("WIFI_PASS"),
        _ => None,
    };
    value.map(str::to_owned)
}
