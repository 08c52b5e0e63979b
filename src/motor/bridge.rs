// Serial pin bridge
//
// Forwards pin writes to a microcontroller that owns the servo outputs.
// Frame format: [0xFF, 0xFF, Pin, Length, Instruction, Params..., Checksum]
// Frames are fire-and-forget; the bridge sends no response.

use serialport::{self, SerialPort};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::pins::{PinId, PinOutput};
use crate::config::{DEFAULT_BAUDRATE, DEFAULT_TIMEOUT_MS};

/// Frame header bytes
const HEADER: [u8; 2] = [0xFF, 0xFF];

/// Instruction set
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    ServoPulse = 0x10,
    DigitalWrite = 0x11,
}

/// Error types for the serial bridge
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Pin backend talking to a serial bridge
pub struct SerialBridge {
    port: Box<dyn SerialPort>,
}

impl SerialBridge {
    /// Open a connection to the bridge
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        info!("Opening pin bridge on {} at {} baud", port_name, baudrate);
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }

    /// Checksum over everything after the header
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| b as u16).sum();
        (!sum & 0xFF) as u8
    }

    /// One frame addressed to an output pin on the bridge board.
    ///
    /// The address byte is the pin number. Length counts the instruction,
    /// params and checksum bytes.
    fn build_frame(pin: PinId, instruction: Instruction, params: &[u8]) -> Vec<u8> {
        let length = (params.len() + 2) as u8; // params + instruction + checksum
        let mut frame = Vec::with_capacity(6 + params.len());

        frame.extend_from_slice(&HEADER);
        frame.push(pin.0);
        frame.push(length);
        frame.push(instruction as u8);
        frame.extend_from_slice(params);

        let checksum = Self::checksum(&frame[2..]);
        frame.push(checksum);

        frame
    }

    fn pulse_frame(pin: PinId, micros: i32) -> Vec<u8> {
        let raw = encode_sign_magnitude(saturate_i16(micros));
        Self::build_frame(pin, Instruction::ServoPulse, &raw.to_le_bytes())
    }

    fn digital_frame(pin: PinId, level: u8) -> Vec<u8> {
        Self::build_frame(pin, Instruction::DigitalWrite, &[level])
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()?;
        Ok(())
    }

    fn send_or_warn(&mut self, pin: PinId, frame: &[u8]) {
        if let Err(e) = self.send_frame(frame) {
            warn!("Pin bridge write to {} failed: {}", pin, e);
        }
    }
}

impl PinOutput for SerialBridge {
    fn set_pulse(&mut self, pin: PinId, micros: i32) {
        debug!("Bridge {} pulse {}us", pin, micros);
        let frame = Self::pulse_frame(pin, micros);
        self.send_or_warn(pin, &frame);
    }

    fn write_digital(&mut self, pin: PinId, level: u8) {
        debug!("Bridge {} digital {}", pin, level);
        let frame = Self::digital_frame(pin, level);
        self.send_or_warn(pin, &frame);
    }
}

fn saturate_i16(value: i32) -> i16 {
    value.clamp(-0x7FFF, 0x7FFF) as i16
}

/// Encode a signed value to sign-magnitude format
/// Bit 15 = sign (1 = negative), Bits 0-14 = magnitude
fn encode_sign_magnitude(value: i16) -> u16 {
    if value >= 0 {
        value as u16
    } else {
        0x8000 | value.unsigned_abs()
    }
}
