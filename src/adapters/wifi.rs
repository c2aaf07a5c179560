//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` over the
//!   modem driver handed in by `main` through [`WifiAdapter::attach`].
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! Connection is blocking: bring-up does not proceed to MQTT until the
//! station has an IP. Each failed attempt waits [`RETRY_DELAY_MS`].

use core::fmt;
use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use crate::error::CommsError;

pub const RETRY_DELAY_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting { attempt: u32 },
    Connected,
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), CredentialsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialsError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CredentialsError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CredentialsError::InvalidPassword);
    }
    Ok(())
}

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    wifi: Option<BlockingWifi<EspWifi<'static>>>,
    /// Simulation: the first `sim_failures` attempts fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
}

impl WifiAdapter {
    pub fn new(ssid: &str, password: &str) -> Result<Self, CredentialsError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|()| CredentialsError::InvalidSsid)?;
        let mut p = heapless::String::new();
        p.push_str(password).map_err(|()| CredentialsError::InvalidPassword)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: s,
            password: p,
            #[cfg(target_os = "espidf")]
            wifi: None,
            #[cfg(not(target_os = "espidf"))]
            sim_failures: 0,
        })
    }

    #[cfg(target_os = "espidf")]
    pub fn attach(&mut self, wifi: BlockingWifi<EspWifi<'static>>) {
        self.wifi = Some(wifi);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, attempts: u32) {
        self.sim_failures = attempts;
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// No passphrase configured.
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    /// Try up to `max_attempts` times (0 = forever).
    pub fn connect_blocking(&mut self, max_attempts: u32) -> Result<(), CommsError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.state = WifiState::Connecting { attempt };
            match self.platform_connect() {
                Ok(()) => {
                    self.state = WifiState::Connected;
                    info!("WiFi: connected after {} attempt(s)", attempt);
                    return Ok(());
                }
                Err(e) => {
                    warn!("WiFi: attempt {} failed: {}", attempt, e);
                    if max_attempts != 0 && attempt >= max_attempts {
                        self.state = WifiState::Disconnected;
                        return Err(CommsError::WifiConnectFailed);
                    }
                    delay_ms(RETRY_DELAY_MS);
                }
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let cfg = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            password: self.password.as_str().try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            auth_method: if self.is_open() { AuthMethod::None } else { AuthMethod::WPA2Personal },
            ..Default::default()
        });
        let wifi = self.wifi.as_mut().ok_or(CommsError::WifiDisconnected)?;
        wifi.set_configuration(&cfg).map_err(|_| CommsError::WifiConnectFailed)?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|_| CommsError::WifiConnectFailed)?;
        }
        wifi.connect().map_err(|_| CommsError::WifiConnectFailed)?;
        wifi.wait_netif_up().map_err(|_| CommsError::WifiConnectFailed)?;
        if let Ok(ip) = wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: IP address {}", ip.ip);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            return Err(CommsError::WifiConnectFailed);
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
fn delay_ms(ms: u32) {
    esp_idf_hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
fn delay_ms(_ms: u32) {}
