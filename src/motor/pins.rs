// Pin-output capability used by the motion controller
//
// A pin write is fire-and-forget: backends never report failure to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifier of an analog-capable output channel on the host board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub u8);

impl PinId {
    pub const P0: PinId = PinId(0);
    pub const P1: PinId = PinId(1);
    pub const P2: PinId = PinId(2);
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Servo and digital output on two or more channels
pub trait PinOutput {
    /// Command the servo on `pin` to a pulse width in microseconds
    fn set_pulse(&mut self, pin: PinId, micros: i32);

    /// Drive `pin` to a binary level (0 = off)
    fn write_digital(&mut self, pin: PinId, level: u8);
}

impl<T: PinOutput + ?Sized> PinOutput for &mut T {
    fn set_pulse(&mut self, pin: PinId, micros: i32) {
        (**self).set_pulse(pin, micros)
    }

    fn write_digital(&mut self, pin: PinId, level: u8) {
        (**self).write_digital(pin, level)
    }
}

impl<T: PinOutput + ?Sized> PinOutput for Box<T> {
    fn set_pulse(&mut self, pin: PinId, micros: i32) {
        (**self).set_pulse(pin, micros)
    }

    fn write_digital(&mut self, pin: PinId, level: u8) {
        (**self).write_digital(pin, level)
    }
}

/// Simulation backend that only logs writes
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPins;

impl PinOutput for LogPins {
    fn set_pulse(&mut self, pin: PinId, micros: i32) {
        debug!("[sim] {} pulse {}us", pin, micros);
    }

    fn write_digital(&mut self, pin: PinId, level: u8) {
        debug!("[sim] {} digital {}", pin, level);
    }
}

/// A single recorded pin write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinWrite {
    Pulse { pin: PinId, micros: i32 },
    Digital { pin: PinId, level: u8 },
}

/// In-memory backend: records every write instead of driving hardware.
///
/// Keeps the full history, so it suits tests and short runs only.
#[derive(Debug, Default)]
pub struct RecordingPins {
    writes: Vec<(tokio::time::Instant, PinWrite)>,
}

impl RecordingPins {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes in order
    pub fn writes(&self) -> Vec<PinWrite> {
        self.writes.iter().map(|&(_, w)| w).collect()
    }

    /// All writes with the (tokio) instant they were issued
    pub fn timed_writes(&self) -> &[(tokio::time::Instant, PinWrite)] {
        &self.writes
    }

    /// Last write issued to `pin`
    pub fn last_write(&self, pin: PinId) -> Option<PinWrite> {
        self.writes.iter().rev().map(|&(_, w)| w).find(|w| match *w {
            PinWrite::Pulse { pin: p, .. } | PinWrite::Digital { pin: p, .. } => p == pin,
        })
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }

    fn record(&mut self, write: PinWrite) {
        self.writes.push((tokio::time::Instant::now(), write));
    }
}

impl PinOutput for RecordingPins {
    fn set_pulse(&mut self, pin: PinId, micros: i32) {
        debug!("[sim] {} pulse {}us", pin, micros);
        self.record(PinWrite::Pulse { pin, micros });
    }

    fn write_digital(&mut self, pin: PinId, level: u8) {
        debug!("[sim] {} digital {}", pin, level);
        self.record(PinWrite::Digital { pin, level });
    }
}
