//! System configuration parameters
//!
//! All tunable parameters for the cat feeder.
//! Values can be overridden with a JSON blob baked in at build time.

use core::time::Duration;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MAX_HOST_LEN: usize = 64;
pub const MAX_PATH_LEN: usize = 96;
pub const MAX_SSID_LEN: usize = 32;
pub const MAX_PASSWORD_LEN: usize = 64;

/// Servo drive profile.  Duty cycles are out of 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoProfile {
    /// PWM carrier frequency (Hz).  400 Hz gives a 2500 µs period,
    /// above the servo's 2100 µs maximum pulse.
    pub pwm_frequency_hz: u32,
    pub extend_duty: u8,
    pub jiggle_extend_duty: u8,
    pub retract_duty: u8,
    /// Settle time for a full extend or retract (milliseconds)
    pub move_delay_ms: u32,
    /// Dwell for each jiggle half-stroke (milliseconds)
    pub jiggle_delay_ms: u32,
    /// Partial strokes before each full stroke, to loosen the hopper
    pub jiggles_per_scoop: u8,
}

impl Default for ServoProfile {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: 400,
            extend_duty: 115,
            jiggle_extend_duty: 190,
            retract_duty: 211,
            move_delay_ms: 1500,
            jiggle_delay_ms: 100,
            jiggles_per_scoop: 3,
        }
    }
}

/// Core feeder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    // --- Backend ---
    /// Host header and TCP connect target
    pub backend_host: String<MAX_HOST_LEN>,
    pub backend_port: u16,
    /// Request path, must start with '/'
    pub backend_path: String<MAX_PATH_LEN>,

    // --- Schedule ---
    /// Floor applied to every server-supplied scoop count
    pub min_scoops_per_feeding: u32,
    /// Fixed delay before retrying a failed check-in (milliseconds)
    pub checkin_retry_backoff_ms: u32,
    /// Socket read/write timeout; `None` blocks indefinitely
    pub io_timeout_ms: Option<u32>,

    // --- Hardware ---
    pub servo: ServoProfile,

    // --- Network ---
    pub wifi_ssid: String<MAX_SSID_LEN>,
    pub wifi_password: String<MAX_PASSWORD_LEN>,
}

fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            // Backend
            backend_host: bounded("catfeeder.local"),
            backend_port: 80,
            backend_path: bounded("/photon"),

            // Schedule
            min_scoops_per_feeding: 1,
            checkin_retry_backoff_ms: 30_000, // well above a typical round trip
            io_timeout_ms: Some(30_000),

            servo: ServoProfile::default(),

            wifi_ssid: String::new(),
            wifi_password: String::new(),
        }
    }
}

impl FeederConfig {
    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values rather than clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_host.is_empty() {
            return Err(ConfigError::ValidationFailed("backend_host is empty"));
        }
        if self.backend_port == 0 {
            return Err(ConfigError::ValidationFailed("backend_port must be non-zero"));
        }
        if !self.backend_path.starts_with('/') {
            return Err(ConfigError::ValidationFailed("backend_path must start with '/'"));
        }
        if self.min_scoops_per_feeding == 0 {
            return Err(ConfigError::ValidationFailed("min_scoops_per_feeding must be >= 1"));
        }
        if self.checkin_retry_backoff_ms == 0 {
            return Err(ConfigError::ValidationFailed("checkin_retry_backoff_ms must be non-zero"));
        }
        if self.io_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed("io_timeout_ms must be non-zero or null"));
        }
        if self.servo.move_delay_ms == 0 || self.servo.jiggle_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("servo settle delays must be non-zero"));
        }
        if self.servo.pwm_frequency_hz == 0 {
            return Err(ConfigError::ValidationFailed("servo pwm_frequency_hz must be non-zero"));
        }
        Ok(())
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(u64::from(self.checkin_retry_backoff_ms))
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}
