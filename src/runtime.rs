// Command runtime: executes a JSON-lines stream of drive commands in order
//
// Each command runs to completion before the next line is read, so a timed
// drive always finishes (and stops) before anything else touches the wheels.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::config::duration_from_ms;
use crate::messages::DriveCommand;
use crate::motor::{Delay, MotionController, PinOutput, TokioDelay};

/// Counts of what happened during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub skipped: usize,
}

pub struct Runtime<P, D = TokioDelay> {
    car: MotionController<P, D>,
    summary: RunSummary,
}

impl<P: PinOutput, D: Delay> Runtime<P, D> {
    pub fn new(car: MotionController<P, D>) -> Self {
        Self {
            car,
            summary: RunSummary::default(),
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn controller(&self) -> &MotionController<P, D> {
        &self.car
    }

    pub fn into_controller(self) -> MotionController<P, D> {
        self.car
    }

    /// Execute one command
    pub async fn on_command(&mut self, cmd: DriveCommand) {
        info!("Executing command: {:?}", &cmd);
        match cmd {
            DriveCommand::Forward { power } => self.car.forward(power),
            DriveCommand::Backward { power } => self.car.backward(power),
            DriveCommand::TurnLeft { power } => self.car.turn_left(power),
            DriveCommand::TurnRight { power } => self.car.turn_right(power),
            DriveCommand::Stop => self.car.stop(),
            DriveCommand::Continuous { direction } => self.car.continuous_run(direction),
            DriveCommand::Drive {
                direction,
                duration_ms,
                power,
            } => {
                self.car
                    .drive_for(direction, duration_from_ms(duration_ms), power)
                    .await
            }
            DriveCommand::SetWheelPins { left, right } => self.car.set_wheel_pins(left, right),
            DriveCommand::SetWheelSpeed { left, right } => self.car.set_wheel_speed(left, right),
        }
        self.summary.executed += 1;
    }

    /// Parse and execute one line. Blank lines and `#` comments are ignored.
    pub async fn on_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        match serde_json::from_str::<DriveCommand>(line) {
            Ok(cmd) => self.on_command(cmd).await,
            Err(e) => {
                warn!("Failed to parse command {:?}: {}", line, e);
                self.summary.skipped += 1;
            }
        }
    }

    /// Run every line of `input`, then stop the car
    pub async fn run<R>(&mut self, input: R) -> std::io::Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            self.on_line(&line).await;
        }

        info!(
            "Command stream ended: {} executed, {} skipped",
            self.summary.executed, self.summary.skipped
        );
        self.car.stop();
        Ok(self.summary)
    }
}
