// Message types for the command stream

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{DEFAULT_DURATION_MS, STANDARD_POWER};
use crate::motor::PinId;

/// Direction of travel for continuous and timed drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CarDirection {
    Forward,
    Backward,
    TurnRight,
    TurnLeft,
}

impl CarDirection {
    /// Map a host enum value (0 forward, 1 back, 2 turn right, 3 turn left).
    ///
    /// Anything else is unrecognised and yields `None`, which callers treat as stop.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CarDirection::Forward),
            1 => Some(CarDirection::Backward),
            2 => Some(CarDirection::TurnRight),
            3 => Some(CarDirection::TurnLeft),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            CarDirection::Forward => 0,
            CarDirection::Backward => 1,
            CarDirection::TurnRight => 2,
            CarDirection::TurnLeft => 3,
        }
    }
}

/// One command for the car, as read from the JSON-lines stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriveCommand {
    Forward {
        #[serde(default = "standard_power")]
        power: f64,
    },
    Backward {
        #[serde(default = "standard_power")]
        power: f64,
    },
    TurnLeft {
        #[serde(default = "standard_power")]
        power: f64,
    },
    TurnRight {
        #[serde(default = "standard_power")]
        power: f64,
    },
    Stop,
    /// Run until the next command; a missing or unknown direction stops
    Continuous {
        #[serde(default, deserialize_with = "lenient_direction")]
        direction: Option<CarDirection>,
    },
    /// Run for `duration_ms`, then stop
    Drive {
        direction: CarDirection,
        #[serde(default = "default_duration_ms")]
        duration_ms: i64,
        #[serde(default = "standard_power")]
        power: f64,
    },
    SetWheelPins {
        left: PinId,
        right: PinId,
    },
    SetWheelSpeed {
        left: i32,
        right: i32,
    },
}

fn standard_power() -> f64 {
    STANDARD_POWER
}

fn default_duration_ms() -> i64 {
    DEFAULT_DURATION_MS
}

/// Accepts a direction name, a host enum code, or null; unknown values become `None`
fn lenient_direction<'de, D>(deserializer: D) -> Result<Option<CarDirection>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Code(i64),
        Name(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Code(code)) => CarDirection::from_code(code),
        Some(Raw::Name(name)) => {
            serde_json::from_value(serde_json::Value::String(name)).ok()
        }
        None => None,
    })
}
