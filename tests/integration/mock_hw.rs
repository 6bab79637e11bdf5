//! Mock adapters for integration tests.
//!
//! Sensor readings and HTTP replies are scripted per call; every actuator
//! command, request and event is recorded so tests can assert on the full
//! history without touching GPIO or the network.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use airfan::app::control_loop::ControlLoop;
use airfan::app::events::AppEvent;
use airfan::app::ports::{
    ActuatorPort, DisplayPort, EventSink, HttpPort, HttpRequest, HttpResponse, Method, SensorPort,
};
use airfan::config::{DeviceConfig, SystemConfig};
use airfan::error::{ActuatorError, DisplayError, SensorFault, TransportError};
use airfan::sensors::climate::ClimateSample;

pub const METRICS_URL: &str = "http://metrics.test/api/v1.6/devices/esp32-lab";
pub const DOCUMENT_URL: &str = "http://docs.test/insert";
pub const PREDICTION_URL: &str = "http://predict.test/predict";

// ── Script ────────────────────────────────────────────────────

/// Replies handed out in order; the last one repeats forever.
#[derive(Debug, Clone)]
pub struct Script<T>(VecDeque<T>);

impl<T: Clone> Script<T> {
    pub fn repeat(value: T) -> Self {
        Self(VecDeque::from([value]))
    }

    pub fn sequence(values: impl IntoIterator<Item = T>) -> Self {
        Self(values.into_iter().collect())
    }

    fn next(&mut self) -> Option<T> {
        if self.0.len() > 1 {
            self.0.pop_front()
        } else {
            self.0.front().cloned()
        }
    }
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub climate: Script<Result<ClimateSample, SensorFault>>,
    pub gas: Script<Result<u16, SensorFault>>,
    /// Every `set_fan` call, in order.
    pub fan_calls: Vec<bool>,
    pub fail_fan: bool,
    fan_on: bool,
}

#[allow(dead_code)]
impl MockHardware {
    /// 26.0 °C, 71 %RH, raw ADC 2048.
    pub fn new() -> Self {
        Self {
            climate: Script::repeat(Ok(ClimateSample {
                temperature_c: 26.0,
                humidity_pct: 71.0,
            })),
            gas: Script::repeat(Ok(2048)),
            fan_calls: Vec::new(),
            fail_fan: false,
            fan_on: false,
        }
    }

    pub fn with_gas(mut self, gas: Script<Result<u16, SensorFault>>) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_climate(mut self, climate: Script<Result<ClimateSample, SensorFault>>) -> Self {
        self.climate = climate;
        self
    }
}

impl SensorPort for MockHardware {
    fn read_temperature_humidity(&mut self) -> Result<ClimateSample, SensorFault> {
        self.climate.next().unwrap_or(Err(SensorFault::ClimateTimeout))
    }

    fn read_gas_adc(&mut self) -> Result<u16, SensorFault> {
        self.gas.next().unwrap_or(Err(SensorFault::GasAdcReadFailed))
    }
}

impl ActuatorPort for MockHardware {
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.fan_calls.push(on);
        if self.fail_fan {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.fan_on = on;
        Ok(())
    }

    fn is_fan_on(&self) -> bool {
        self.fan_on
    }
}

// ── MockHttp ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

pub type Reply = Result<HttpResponse, TransportError>;

pub fn ok(status: u16, body: &str) -> Reply {
    Ok(HttpResponse {
        status,
        body: body.as_bytes().to_vec(),
    })
}

pub fn predicts(ppm: f64) -> Reply {
    ok(200, &format!(r#"{{"predicted_ppm": {ppm}}}"#))
}

/// Routes by exact URL.  Unknown URLs fail to connect.
pub struct MockHttp {
    routes: HashMap<String, Script<Reply>>,
    panic_on: Option<String>,
    pub requests: Vec<RecordedRequest>,
}

#[allow(dead_code)]
impl MockHttp {
    /// Both sinks accept, the predictor answers 10 ppm.
    pub fn new() -> Self {
        let mut http = Self {
            routes: HashMap::new(),
            panic_on: None,
            requests: Vec::new(),
        };
        http.route(METRICS_URL, Script::repeat(ok(200, "{}")));
        http.route(DOCUMENT_URL, Script::repeat(ok(201, "{}")));
        http.route(PREDICTION_URL, Script::repeat(predicts(10.0)));
        http
    }

    pub fn route(&mut self, url: &str, script: Script<Reply>) -> &mut Self {
        self.routes.insert(url.to_owned(), script);
        self
    }

    pub fn panic_on(&mut self, url: &str) -> &mut Self {
        self.panic_on = Some(url.to_owned());
        self
    }

    pub fn requests_to(&self, url: &str) -> Vec<&RecordedRequest> {
        self.requests.iter().filter(|r| r.url == url).collect()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.requests.iter().map(|r| r.url.as_str()).collect()
    }
}

impl HttpPort for MockHttp {
    fn execute(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        self.requests.push(RecordedRequest {
            method: request.method,
            url: request.url.to_owned(),
            headers: request
                .headers
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            body: request
                .body
                .map(|b| String::from_utf8_lossy(b).into_owned()),
            timeout: request.timeout,
        });
        if self.panic_on.as_deref() == Some(request.url) {
            panic!("mock transport exploded");
        }
        self.routes
            .get_mut(request.url)
            .and_then(Script::next)
            .unwrap_or(Err(TransportError::Connect))
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pending: Vec<String>,
    /// Rows of every flushed frame.
    pub frames: Vec<Vec<String>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn last_frame(&self) -> Option<&[String]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl DisplayPort for MockDisplay {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn write_line(&mut self, text: &str, _x: i32, _y: i32) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Bus);
        }
        self.pending.push(text.to_owned());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub fn device_config() -> DeviceConfig {
    let values: HashMap<&str, &str> = HashMap::from([
        ("DEVICE_ID", "esp32-lab"),
        ("TOKEN", "BBUS-test-token"),
        ("UBIDOTS_URL", "http://metrics.test"),
        ("MONGO_API", DOCUMENT_URL),
        ("PREDICTION_URL", PREDICTION_URL),
    ]);
    DeviceConfig::from_lookup(|key| values.get(key).map(|v| (*v).to_owned()))
        .expect("fixture config is complete")
}

pub fn control_loop() -> ControlLoop {
    ControlLoop::from_config(&SystemConfig::default(), &device_config())
}

/// Fresh loop plus mocks, already started.
pub fn harness() -> (ControlLoop, MockHardware, MockHttp, MockDisplay, RecordingSink) {
    let mut control = control_loop();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    control.start(&mut hw, &mut sink).expect("start drives the fan");
    (control, hw, MockHttp::new(), MockDisplay::default(), sink)
}
