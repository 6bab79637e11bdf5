//! Unified error types for the AirFan firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! iteration boundary of the control loop uniform.  All variants are `Copy`
//! so they can be carried inside [`AppEvent`](crate::app::events::AppEvent)s
//! and cycle reports without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorFault),
    /// The raw gas sample could not be converted into a concentration.
    Estimation(EstimationError),
    /// The prediction service gave no usable answer.
    Prediction(PredictionError),
    /// A telemetry sink rejected or lost a payload.
    Sink(SinkError),
    /// An outbound HTTP exchange failed below the application layer.
    Transport(TransportError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// The status display could not be updated.
    Display(DisplayError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
    /// A required configuration key is absent or empty.
    MissingConfig(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Estimation(e) => write!(f, "estimation: {e}"),
            Self::Prediction(e) => write!(f, "prediction: {e}"),
            Self::Sink(e) => write!(f, "sink: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::MissingConfig(key) => write!(f, "config: required key {key} is not set"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// DHT11 did not answer or a bit edge never arrived.
    ClimateTimeout,
    /// DHT11 frame arrived but its checksum byte did not match.
    ClimateChecksum,
    /// The MQ-135 ADC channel could not be sampled.
    GasAdcReadFailed,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClimateTimeout => write!(f, "DHT11 timeout"),
            Self::ClimateChecksum => write!(f, "DHT11 checksum mismatch"),
            Self::GasAdcReadFailed => write!(f, "MQ-135 ADC read failed"),
        }
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Concentration estimation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimationError {
    /// A zero sample means the sensor output is floating or disconnected.
    ZeroSample,
    /// Sample exceeds the ADC's full-scale value.
    OutOfRange(u16),
    /// A calibration constant is zero or negative.
    InvalidCalibration,
    /// The curve produced NaN or infinity.
    NonPhysical,
}

impl fmt::Display for EstimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSample => write!(f, "raw ADC sample is zero"),
            Self::OutOfRange(raw) => write!(f, "raw ADC sample {raw} above full scale"),
            Self::InvalidCalibration => write!(f, "calibration constants must be positive"),
            Self::NonPhysical => write!(f, "concentration is not a finite number"),
        }
    }
}

impl From<EstimationError> for Error {
    fn from(e: EstimationError) -> Self {
        Self::Estimation(e)
    }
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The exchange did not complete within its timeout.
    Timeout,
    /// DNS resolution or TCP connect failed.
    Connect,
    /// The connection broke while sending or receiving.
    Io,
    /// The URL could not be parsed.
    InvalidUrl,
    /// The response body exceeded the receive buffer.
    BodyTooLarge,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Connect => write!(f, "connection failed"),
            Self::Io => write!(f, "I/O error"),
            Self::InvalidUrl => write!(f, "invalid URL"),
            Self::BodyTooLarge => write!(f, "response body too large"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Prediction service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionError {
    Transport(TransportError),
    /// Service answered with a non-2xx status.
    Status(u16),
    /// Body is not valid JSON or not an object.
    Malformed,
    /// `predicted_ppm` is absent or `null`.
    MissingField,
    /// `predicted_ppm` is not a finite number.
    NonFinite,
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport {e}"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Malformed => write!(f, "malformed response body"),
            Self::MissingField => write!(f, "predicted_ppm missing"),
            Self::NonFinite => write!(f, "predicted_ppm not finite"),
        }
    }
}

impl From<TransportError> for PredictionError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<PredictionError> for Error {
    fn from(e: PredictionError) -> Self {
        Self::Prediction(e)
    }
}

// ---------------------------------------------------------------------------
// Telemetry sinks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The reading could not be encoded into the sink's payload shape.
    Serialize,
    Transport(TransportError),
    /// Sink answered with a non-2xx status.
    Status(u16),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize => write!(f, "payload serialisation failed"),
            Self::Transport(e) => write!(f, "transport {e}"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
        }
    }
}

impl From<TransportError> for SinkError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// I2C transaction with the panel failed.
    Bus,
    /// Text would start outside the panel.
    OutOfBounds,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "display bus error"),
            Self::OutOfBounds => write!(f, "text position outside panel"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

/// Convenience alias used throughout the firmware.
pub type Result<T> = core::result::Result<T, Error>;
