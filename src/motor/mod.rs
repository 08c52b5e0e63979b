// Motor control module for the two-wheel servo car
//
// Provides:
// - Servo pulse mapping (power + speed scale -> pulse width)
// - Pin-output backends (simulation and serial bridge)
// - High-level motion controller

pub mod bridge;
mod controller;
pub mod pins;
pub mod pulse;
pub mod timing;

pub use bridge::{BridgeError, SerialBridge};
pub use controller::{MotionConfig, MotionController};
pub use pins::{LogPins, PinId, PinOutput, PinWrite, RecordingPins};
pub use pulse::{wheel_pulses, Sign, WheelPulses};
pub use timing::{Delay, TokioDelay};
