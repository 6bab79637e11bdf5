//! GPIO / peripheral pin assignments for the AirFan board (ESP32-WROOM).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT11 single-wire data line (open-drain, external 10k pull-up).
pub const DHT11_GPIO: i32 = 33;

/// MQ-135 analog output.  GPIO34 is ADC1 channel 6 on the ESP32.
pub const MQ135_ADC_GPIO: i32 = 34;
/// ADC1 channel index for [`MQ135_ADC_GPIO`].
pub const MQ135_ADC1_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Fan relay input.  HIGH = fan running.
pub const FAN_RELAY_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// OLED (SSD1306 over I2C0)
// ---------------------------------------------------------------------------

pub const OLED_SDA_GPIO: i32 = 23;
pub const OLED_SCL_GPIO: i32 = 22;
pub const OLED_I2C_FREQ_HZ: u32 = 400_000;
pub const OLED_WIDTH: u32 = 128;
pub const OLED_HEIGHT: u32 = 64;
