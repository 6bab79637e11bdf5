//! WiFi station-mode adapter.
//!
//! Brings the station link up once at boot and re-checks it before every
//! cycle.  The control loop never waits on the network; a dropped link just
//! shows up as transport errors until [`WifiLink::ensure_connected`]
//! restores it.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: the host network is assumed up; the link only
//!   records the credentials it was given.
//!
//! ## Reconnection policy
//!
//! After a failed attempt the link waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before trying again.

use core::fmt;
use std::time::{Duration, Instant};

#[cfg(target_os = "espidf")]
use log::warn;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl std::error::Error for WifiError {}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

/// Validated station credentials.  An empty password means an open network.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, WifiError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        Ok(Self {
            ssid: ssid.try_into().map_err(|_| WifiError::InvalidSsid)?,
            password: password.try_into().map_err(|_| WifiError::InvalidPassword)?,
        })
    }

    /// Build from optional configuration values; a missing SSID is
    /// [`WifiError::NoCredentials`].
    pub fn from_config(ssid: Option<&str>, password: Option<&str>) -> Result<Self, WifiError> {
        let ssid = ssid.ok_or(WifiError::NoCredentials)?;
        Self::new(ssid, password.unwrap_or(""))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────
// Backoff
// ───────────────────────────────────────────────────────────────

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// Exponential reconnect backoff.
#[derive(Debug)]
pub struct Backoff {
    delay: Duration,
    next_attempt: Option<Instant>,
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_secs(INITIAL_BACKOFF_SECS),
            next_attempt: None,
        }
    }

    /// Whether an attempt may be made at `now`.
    pub fn ready(&self, now: Instant) -> bool {
        self.next_attempt.is_none_or(|at| now >= at)
    }

    /// Record a failed attempt made at `now`; returns the wait before the
    /// next one.
    pub fn failed(&mut self, now: Instant) -> Duration {
        let wait = self.delay;
        self.next_attempt = Some(now + wait);
        self.delay = (self.delay * 2).min(Duration::from_secs(MAX_BACKOFF_SECS));
        wait
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Station link
// ───────────────────────────────────────────────────────────────

pub struct WifiLink {
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    credentials: WifiCredentials,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    backoff: Backoff,
}

impl WifiLink {
    pub fn credentials(&self) -> &WifiCredentials {
        &self.credentials
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn connect(credentials: WifiCredentials) -> Result<Self, WifiError> {
        info!("WiFi(sim): using host network (ssid '{}')", credentials.ssid());
        Ok(Self {
            credentials,
            backoff: Backoff::new(),
        })
    }

    /// Host networking is managed by the OS.
    #[cfg(not(target_os = "espidf"))]
    pub fn ensure_connected(&mut self) -> bool {
        true
    }

    /// Configure the station, start it and block until the netif has an
    /// address.
    #[cfg(target_os = "espidf")]
    pub fn connect(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
        credentials: WifiCredentials,
    ) -> Result<Self, WifiError> {
        use esp_idf_svc::wifi::{
            AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
        };

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(|e| {
            warn!("WiFi: driver init failed: {e}");
            WifiError::ConnectionFailed
        })?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop).map_err(|e| {
            warn!("WiFi: event loop wrap failed: {e}");
            WifiError::ConnectionFailed
        })?;

        let auth_method = if credentials.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| WifiError::InvalidSsid)?,
            password: credentials
                .password
                .as_str()
                .try_into()
                .map_err(|_| WifiError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        wifi.set_configuration(&config).map_err(|e| {
            warn!("WiFi: set_configuration failed: {e}");
            WifiError::ConnectionFailed
        })?;
        wifi.start().map_err(|e| {
            warn!("WiFi: start failed: {e}");
            WifiError::ConnectionFailed
        })?;

        let mut link = Self {
            wifi,
            credentials,
            backoff: Backoff::new(),
        };
        link.associate()?;
        Ok(link)
    }

    #[cfg(target_os = "espidf")]
    fn associate(&mut self) -> Result<(), WifiError> {
        info!("WiFi: connecting to '{}'", self.credentials.ssid());
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {e}");
            WifiError::ConnectionFailed
        })?;
        self.wifi.wait_netif_up().map_err(|e| {
            warn!("WiFi: netif did not come up: {e}");
            WifiError::ConnectionFailed
        })?;
        if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: connected, ip={}", ip.ip);
        }
        Ok(())
    }

    /// Re-associate if the link dropped and the backoff allows it.
    #[cfg(target_os = "espidf")]
    pub fn ensure_connected(&mut self) -> bool {
        if self.wifi.is_connected().unwrap_or(false) {
            self.backoff.reset();
            return true;
        }
        let now = Instant::now();
        if !self.backoff.ready(now) {
            return false;
        }
        match self.associate() {
            Ok(()) => {
                self.backoff.reset();
                true
            }
            Err(_) => {
                let wait = self.backoff.failed(now);
                warn!("WiFi: retry in {}s", wait.as_secs());
                false
            }
        }
    }
}
