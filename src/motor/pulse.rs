// Servo pulse mapping for the two-wheel car
// Converts a power percentage and per-wheel speed scale into servo pulse widths.

use crate::config::{PULSE_GAIN, PULSE_MAX, PULSE_MIN, PULSE_NEUTRAL};
use crate::messages::CarDirection;

/// Rotation sign of one wheel's pulse term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// Pulse widths for both wheels, in whole microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelPulses {
    pub left: i32,
    pub right: i32,
}

impl WheelPulses {
    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// Both wheels at neutral
    pub fn neutral() -> Self {
        let n = PULSE_NEUTRAL as i32;
        Self::new(n, n)
    }
}

/// (left, right) signs for a direction.
///
/// The wheels face opposite ways, so straight motion needs opposite signs.
pub fn signs(direction: CarDirection) -> (Sign, Sign) {
    match direction {
        CarDirection::Forward => (Sign::Positive, Sign::Negative),
        CarDirection::Backward => (Sign::Negative, Sign::Positive),
        CarDirection::TurnLeft => (Sign::Negative, Sign::Negative),
        CarDirection::TurnRight => (Sign::Positive, Sign::Positive),
    }
}

/// Pulse width for one wheel.
///
/// Saturation is one-sided: a positive term is capped at `PULSE_MAX` only and a
/// negative term is floored at `PULSE_MIN` only. Power itself is never clamped,
/// so a negative power moves the pulse past neutral on the unclamped side.
pub fn pulse(speed_scale: i32, sign: Sign, power_percent: f64) -> f64 {
    let raw = sign.factor() * PULSE_GAIN * speed_scale as f64 * (power_percent / 100.0) + PULSE_NEUTRAL;
    match sign {
        Sign::Positive => raw.min(PULSE_MAX),
        Sign::Negative => raw.max(PULSE_MIN),
    }
}

/// Whole microseconds for the pin driver, dropping the fraction toward zero
fn to_micros(pulse: f64) -> i32 {
    // `as` saturates for values outside the i32 range
    pulse.trunc() as i32
}

/// Compute both wheel pulses for a direction and power
pub fn wheel_pulses(
    direction: CarDirection,
    left_speed: i32,
    right_speed: i32,
    power_percent: f64,
) -> WheelPulses {
    let (left_sign, right_sign) = signs(direction);
    WheelPulses {
        left: to_micros(pulse(left_speed, left_sign, power_percent)),
        right: to_micros(pulse(right_speed, right_sign, power_percent)),
    }
}
