//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                      |
//! |-------------|--------------|----------------------------------|
//! | `display`   | DisplayPort  | SSD1306 OLED (I2C) / text frame  |
//! | `hardware`  | SensorPort   | ESP32 ADC, DHT11 GPIO            |
//! |             | ActuatorPort | Fan relay GPIO                   |
//! | `http`      | HttpPort     | esp_http_client / ureq           |
//! | `log_sink`  | EventSink    | Serial log output                |
//! | `wifi`      | —            | ESP-IDF WiFi STA                 |

pub mod display;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod wifi;
