// Motion controller for the two-wheel servo car
//
// Owns the wheel configuration, a pin-output backend and a delay primitive,
// and turns motion requests into servo pulses on the two wheel pins.

use std::time::Duration;

use tracing::{debug, info};

use super::pins::{PinId, PinOutput};
use super::pulse::{wheel_pulses, WheelPulses};
use super::timing::{Delay, TokioDelay};
use crate::config::{
    CarConfig, DEFAULT_LEFT_PIN, DEFAULT_RIGHT_PIN, DEFAULT_WHEEL_SPEED, STANDARD_POWER,
};
use crate::messages::CarDirection;

/// Wheel pins and per-wheel speed scales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionConfig {
    pub left_pin: PinId,
    pub right_pin: PinId,
    pub left_speed: i32,
    pub right_speed: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            left_pin: DEFAULT_LEFT_PIN,
            right_pin: DEFAULT_RIGHT_PIN,
            left_speed: DEFAULT_WHEEL_SPEED,
            right_speed: DEFAULT_WHEEL_SPEED,
        }
    }
}

impl From<&CarConfig> for MotionConfig {
    fn from(cfg: &CarConfig) -> Self {
        Self {
            left_pin: cfg.left_pin,
            right_pin: cfg.right_pin,
            left_speed: cfg.left_speed,
            right_speed: cfg.right_speed,
        }
    }
}

/// Drives the car through a [`PinOutput`] backend
pub struct MotionController<P, D = TokioDelay> {
    pins: P,
    delay: D,
    config: MotionConfig,
}

impl<P: PinOutput> MotionController<P> {
    /// Create a controller with default pins and speeds
    pub fn new(pins: P) -> Self {
        Self::with_config(pins, MotionConfig::default())
    }

    pub fn with_config(pins: P, config: MotionConfig) -> Self {
        Self::with_delay(pins, TokioDelay, config)
    }
}

impl<P: PinOutput, D: Delay> MotionController<P, D> {
    /// Create with a custom delay primitive
    pub fn with_delay(pins: P, delay: D, config: MotionConfig) -> Self {
        Self {
            pins,
            delay,
            config,
        }
    }

    pub fn config(&self) -> MotionConfig {
        self.config
    }

    /// Consume the controller and hand back the pin backend
    pub fn release(self) -> P {
        self.pins
    }

    /// Assign the wheel pins. Applies to every later motion call.
    pub fn set_wheel_pins(&mut self, left: PinId, right: PinId) {
        info!("Wheel pins set: left={}, right={}", left, right);
        self.config.left_pin = left;
        self.config.right_pin = right;
    }

    /// Set the per-wheel speed scales (0 to 100). Values are not range checked.
    pub fn set_wheel_speed(&mut self, left: i32, right: i32) {
        info!("Wheel speed set: left={}, right={}", left, right);
        self.config.left_speed = left;
        self.config.right_speed = right;
    }

    /// Pulses the controller would write for a direction and power
    pub fn pulses_for(&self, direction: CarDirection, power_percent: f64) -> WheelPulses {
        wheel_pulses(
            direction,
            self.config.left_speed,
            self.config.right_speed,
            power_percent,
        )
    }

    fn actuate(&mut self, direction: CarDirection, power_percent: f64) {
        let pulses = self.pulses_for(direction, power_percent);
        debug!(
            "{:?} at {}%: left={}us, right={}us",
            direction, power_percent, pulses.left, pulses.right
        );
        self.pins.set_pulse(self.config.left_pin, pulses.left);
        self.pins.set_pulse(self.config.right_pin, pulses.right);
    }

    /// Drive forwards until told otherwise
    pub fn forward(&mut self, power_percent: f64) {
        self.actuate(CarDirection::Forward, power_percent);
    }

    /// Drive backwards until told otherwise
    pub fn backward(&mut self, power_percent: f64) {
        self.actuate(CarDirection::Backward, power_percent);
    }

    /// Spin left in place until told otherwise
    pub fn turn_left(&mut self, power_percent: f64) {
        self.actuate(CarDirection::TurnLeft, power_percent);
    }

    /// Spin right in place until told otherwise
    pub fn turn_right(&mut self, power_percent: f64) {
        self.actuate(CarDirection::TurnRight, power_percent);
    }

    /// Run one of the directional primitives
    pub fn run(&mut self, direction: CarDirection, power_percent: f64) {
        self.actuate(direction, power_percent);
    }

    /// De-energize both wheels.
    ///
    /// Writes digital 0 rather than the neutral pulse, so the servos are released.
    pub fn stop(&mut self) {
        debug!("Stopping wheels");
        self.pins.write_digital(self.config.left_pin, 0);
        self.pins.write_digital(self.config.right_pin, 0);
    }

    /// Run continuously at standard power; `None` stops the car
    pub fn continuous_run(&mut self, direction: Option<CarDirection>) {
        match direction {
            Some(direction) => self.actuate(direction, STANDARD_POWER),
            None => self.stop(),
        }
    }

    /// Run in `direction` for `duration`, then stop.
    ///
    /// Stop is always issued, also when the returned future is dropped mid-pause.
    pub async fn drive_for(&mut self, direction: CarDirection, duration: Duration, power_percent: f64) {
        info!(
            "Driving {:?} for {}ms at {}%",
            direction,
            duration.as_millis(),
            power_percent
        );
        self.actuate(direction, power_percent);

        let guard = StopOnDrop(self);
        guard.0.delay.pause(duration).await;
        drop(guard);
    }

    pub async fn drive_forward(&mut self, duration: Duration) {
        self.drive_for(CarDirection::Forward, duration, STANDARD_POWER).await
    }

    pub async fn drive_backward(&mut self, duration: Duration) {
        self.drive_for(CarDirection::Backward, duration, STANDARD_POWER).await
    }

    pub async fn turn_right_for(&mut self, duration: Duration) {
        self.drive_for(CarDirection::TurnRight, duration, STANDARD_POWER).await
    }

    pub async fn turn_left_for(&mut self, duration: Duration) {
        self.drive_for(CarDirection::TurnLeft, duration, STANDARD_POWER).await
    }

    /// Forwards for `duration` at a power adjustment from 0 to 200
    pub async fn custom_forward(&mut self, duration: Duration, power_adjustment: f64) {
        self.drive_for(CarDirection::Forward, duration, power_adjustment).await
    }

    pub async fn custom_backward(&mut self, duration: Duration, power_adjustment: f64) {
        self.drive_for(CarDirection::Backward, duration, power_adjustment).await
    }

    pub async fn custom_right(&mut self, duration: Duration, power_adjustment: f64) {
        self.drive_for(CarDirection::TurnRight, duration, power_adjustment).await
    }

    pub async fn custom_left(&mut self, duration: Duration, power_adjustment: f64) {
        self.drive_for(CarDirection::TurnLeft, duration, power_adjustment).await
    }
}

/// Stops the car when dropped
struct StopOnDrop<'a, P: PinOutput, D: Delay>(&'a mut MotionController<P, D>);

impl<P: PinOutput, D: Delay> Drop for StopOnDrop<'_, P, D> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::pins::{PinWrite, RecordingPins};

    fn pulse(pin: PinId, micros: i32) -> PinWrite {
        PinWrite::Pulse { pin, micros }
    }

    fn off(pin: PinId) -> PinWrite {
        PinWrite::Digital { pin, level: 0 }
    }

    #[test]
    fn test_defaults() {
        let car = MotionController::new(RecordingPins::new());
        let cfg = car.config();
        assert_eq!(cfg.left_pin, PinId::P1);
        assert_eq!(cfg.right_pin, PinId::P2);
        assert_eq!(cfg.left_speed, 20);
        assert_eq!(cfg.right_speed, 20);
    }

    #[test]
    fn test_directional_primitives() {
        let mut car = MotionController::new(RecordingPins::new());
        car.forward(100.0);
        car.backward(100.0);
        car.turn_left(100.0);
        car.turn_right(100.0);
        let (l, r) = (PinId::P1, PinId::P2);
        assert_eq!(
            car.release().writes(),
            vec![
                pulse(l, 1680),
                pulse(r, 1320),
                pulse(l, 1320),
                pulse(r, 1680),
                pulse(l, 1320),
                pulse(r, 1320),
                pulse(l, 1680),
                pulse(r, 1680),
            ]
        );
    }

    #[test]
    fn test_stop_writes_digital_off() {
        let mut car = MotionController::new(RecordingPins::new());
        car.stop();
        car.forward(50.0);
        car.stop();
        let writes = car.release().writes();
        assert_eq!(&writes[..2], &[off(PinId::P1), off(PinId::P2)]);
        assert_eq!(&writes[4..], &[off(PinId::P1), off(PinId::P2)]);
    }

    #[test]
    fn test_continuous_run_dispatch() {
        let mut car = MotionController::new(RecordingPins::new());
        car.continuous_run(Some(CarDirection::TurnRight));
        car.continuous_run(CarDirection::from_code(9));
        assert_eq!(
            car.release().writes(),
            vec![
                pulse(PinId::P1, 1680),
                pulse(PinId::P2, 1680),
                off(PinId::P1),
                off(PinId::P2),
            ]
        );
    }

    #[test]
    fn test_pin_change_applies_to_later_calls_only() {
        let mut car = MotionController::new(RecordingPins::new());
        car.forward(100.0);
        car.set_wheel_pins(PinId(13), PinId(14));
        car.forward(100.0);
        car.stop();
        assert_eq!(
            car.release().writes(),
            vec![
                pulse(PinId::P1, 1680),
                pulse(PinId::P2, 1320),
                pulse(PinId(13), 1680),
                pulse(PinId(14), 1320),
                off(PinId(13)),
                off(PinId(14)),
            ]
        );
    }

    #[test]
    fn test_speed_scale_change() {
        let mut car = MotionController::new(RecordingPins::new());
        car.set_wheel_speed(50, 0);
        assert_eq!(car.pulses_for(CarDirection::Forward, 100.0), WheelPulses::new(1950, 1500));

        // Out of range scale is accepted and saturates
        car.set_wheel_speed(150, 150);
        assert_eq!(car.pulses_for(CarDirection::Backward, 100.0), WheelPulses::new(600, 2400));
    }

    #[test]
    fn test_with_config_from_file_settings() {
        let file = CarConfig {
            left_pin: PinId(0),
            right_pin: PinId(8),
            left_speed: 10,
            right_speed: 30,
            ..CarConfig::default()
        };
        let mut car = MotionController::with_config(RecordingPins::new(), MotionConfig::from(&file));
        car.turn_right(100.0);
        assert_eq!(
            car.release().writes(),
            vec![pulse(PinId(0), 1590), pulse(PinId(8), 1770)]
        );
    }
}
