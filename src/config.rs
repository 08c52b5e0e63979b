// Defaults, parameter ranges, pulse constants and the optional config file
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::motor::PinId;

// Servo pulse convention (microseconds)
pub const PULSE_NEUTRAL: f64 = 1500.0; // stop
pub const PULSE_MIN: f64 = 600.0;
pub const PULSE_MAX: f64 = 2400.0;

// Pulse offset per unit of speed scale at 100% power
pub const PULSE_GAIN: f64 = 9.0;

// Default wheel channels
pub const DEFAULT_LEFT_PIN: PinId = PinId::P1;
pub const DEFAULT_RIGHT_PIN: PinId = PinId::P2;

// Per-wheel speed scale, 0 (min) to 100 (max)
pub const DEFAULT_WHEEL_SPEED: i32 = 20;
pub const WHEEL_SPEED_MAX: i32 = 100;

// Power used by the standard drive and continuous primitives
pub const STANDARD_POWER: f64 = 100.0;

// Custom power adjustment, 0 (min) to 200 (max)
pub const DEFAULT_CUSTOM_POWER: f64 = 80.0;
pub const CUSTOM_POWER_MAX: f64 = 200.0;

// Default drive/turn duration
pub const DEFAULT_DURATION_MS: i64 = 1000;

/// Milliseconds to a pause length. Negative values pause for zero time.
pub fn duration_from_ms(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

// Serial bridge
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Car settings loaded from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    pub left_pin: PinId,
    pub right_pin: PinId,
    pub left_speed: i32,
    pub right_speed: i32,
    /// Serial port of the pin bridge; `None` runs in simulation
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            left_pin: DEFAULT_LEFT_PIN,
            right_pin: DEFAULT_RIGHT_PIN,
            left_speed: DEFAULT_WHEEL_SPEED,
            right_speed: DEFAULT_WHEEL_SPEED,
            port: None,
            baud_rate: DEFAULT_BAUDRATE,
        }
    }
}

impl CarConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
