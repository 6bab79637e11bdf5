//! AirFan Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single sense → report → predict → actuate
//! → display loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   HttpAdapter   OledDisplay   LogEventSink    │
//! │  (Sensor+Actuator) (HttpPort)    (DisplayPort) (EventSink)     │
//! │  WifiLink                                                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Estimator · Telemetry · Prediction · Hysteresis       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use airfan::adapters::display::{OledDisplay, TextFrame};
use airfan::adapters::hardware::HardwareAdapter;
use airfan::adapters::http::HttpAdapter;
use airfan::adapters::log_sink::LogEventSink;
use airfan::adapters::wifi::{WifiCredentials, WifiLink};
use airfan::app::control_loop::ControlLoop;
use airfan::app::ports::DisplayPort;
use airfan::config::{DeviceConfig, SystemConfig};
use airfan::drivers::fan::FanDriver;
use airfan::drivers::hw_init::{self, GpioOutput};
use airfan::drivers::watchdog::Watchdog;
use airfan::error::DisplayError;
use airfan::sensors::SensorHub;
use airfan::sensors::climate::Dht11Sensor;
use airfan::sensors::gas::Mq135Sensor;
use airfan::{diagnostics, pins};

// ── Screen ────────────────────────────────────────────────────
//
// A missing or dead panel must not stop air control: fall back to the
// in-memory frame, which still logs every rendered screen at debug.

enum Screen<'d> {
    Oled(OledDisplay<I2cDriver<'d>>),
    Headless(TextFrame),
}

impl DisplayPort for Screen<'_> {
    fn clear(&mut self) {
        match self {
            Self::Oled(d) => d.clear(),
            Self::Headless(d) => d.clear(),
        }
    }

    fn write_line(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
        match self {
            Self::Oled(d) => d.write_line(text, x, y),
            Self::Headless(d) => d.write_line(text, x, y),
        }
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        match self {
            Self::Oled(d) => d.flush(),
            Self::Headless(d) => d.flush(),
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AirFan v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();

    // ── 2. Configuration (fail fast) ──────────────────────────
    let system = SystemConfig::default();
    system.validate().context("system configuration")?;
    let device = DeviceConfig::load().context("device configuration")?;
    info!(
        "Config: device '{}', prediction at {}",
        device.device_id, device.prediction_url
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().context("HAL init")?;
    let watchdog = Watchdog::new(system.watchdog_timeout_ms);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 4. Network ────────────────────────────────────────────
    let credentials =
        WifiCredentials::from_config(device.wifi_ssid.as_deref(), device.wifi_password.as_deref())
            .context("WiFi credentials")?;
    let mut wifi =
        WifiLink::connect(peripherals.modem, sysloop, nvs, credentials).context("WiFi")?;

    // ── 5. Display ────────────────────────────────────────────
    let i2c_config = I2cConfig::new().baudrate(pins::OLED_I2C_FREQ_HZ.Hz());
    let mut screen = match I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio23,
        peripherals.pins.gpio22,
        &i2c_config,
    )
    .map_err(|e| warn!("I2C init failed: {e}"))
    .and_then(|i2c| OledDisplay::new(i2c).map_err(|e| warn!("OLED init failed: {e}")))
    {
        Ok(oled) => Screen::Oled(oled),
        Err(()) => {
            warn!("Continuing without a display");
            Screen::Headless(TextFrame::new())
        }
    };

    // ── 6. Hardware + services ────────────────────────────────
    let sensors = SensorHub::new(
        Mq135Sensor::new(pins::MQ135_ADC1_CHANNEL),
        Dht11Sensor::new(pins::DHT11_GPIO),
    );
    let fan = FanDriver::new(GpioOutput::new(pins::FAN_RELAY_GPIO));
    let mut hw = HardwareAdapter::new(sensors, fan);
    let mut http = HttpAdapter::new();
    let mut sink = LogEventSink::new();

    let mut control = ControlLoop::from_config(&system, &device);
    control
        .start(&mut hw, &mut sink)
        .context("driving fan to initial state")?;

    // ── 7. Main loop ──────────────────────────────────────────
    control.run_forever(&mut hw, &mut http, &mut screen, &mut sink, || {
        watchdog.feed();
        wifi.ensure_connected();
    })
}
