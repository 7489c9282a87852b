//! Typed robot commands with range validation.
//!
//! Callers hand in plain integers; each constructor checks them against the
//! inclusive range the firmware accepts and rejects anything outside it.
//! Values are never clamped.
//!
//! # Payload layouts
//! | Command  | Payload bytes                                         |
//! |----------|-------------------------------------------------------|
//! | LED      | `r, g, b`                                             |
//! | Motors   | `left_dir, left_speed, right_dir, right_speed`        |
//! | Buzzer   | `duration_ms` u16 BE, `frequency_hz` u16 BE           |
//! | others   | none                                                  |

use crate::frame::{CommandFrame, FrameError};
use crate::opcode::Opcode;
use crate::sensor::SensorKind;

/// A public operation received a value outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ValidationError {
    pub fn out_of_range(field: &'static str, value: i64, min: i64, max: i64) -> Self {
        ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

fn byte_arg(field: &'static str, value: i32) -> Result<u8, ValidationError> {
    u8::try_from(value).ok().ok_or_else(|| {
        ValidationError::out_of_range(field, value.into(), 0, u8::MAX.into())
    })
}

fn word_arg(field: &'static str, value: i32) -> Result<u16, ValidationError> {
    u16::try_from(value).ok().ok_or_else(|| {
        ValidationError::out_of_range(field, value.into(), 0, u16::MAX.into())
    })
}

/// Beak LED colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LedColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl LedColor {
    pub const OFF: Self = Self::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Validate each channel against `0..=255`.
    pub fn try_new(red: i32, green: i32, blue: i32) -> Result<Self, ValidationError> {
        Ok(Self {
            red: byte_arg("red", red)?,
            green: byte_arg("green", green)?,
            blue: byte_arg("blue", blue)?,
        })
    }

    pub fn encode(&self) -> Result<CommandFrame, FrameError> {
        CommandFrame::new(Opcode::SetLed, &[self.red, self.green, self.blue])
    }
}

/// Wheel rotation direction as the firmware encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MotorDirection {
    #[default]
    Forward = 0,
    Backward = 1,
}

impl MotorDirection {
    pub const fn byte(self) -> u8 {
        self as u8
    }

    fn parse(field: &'static str, value: i32) -> Result<Self, ValidationError> {
        match value {
            0 => Ok(MotorDirection::Forward),
            1 => Ok(MotorDirection::Backward),
            other => Err(ValidationError::out_of_range(field, other.into(), 0, 1)),
        }
    }
}

impl TryFrom<i32> for MotorDirection {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::parse("direction", value)
    }
}

/// Speed and direction for both wheels. Speed 0 stops a wheel, 255 is fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MotorCommand {
    pub left_direction: MotorDirection,
    pub left_speed: u8,
    pub right_direction: MotorDirection,
    pub right_speed: u8,
}

impl MotorCommand {
    pub const STOPPED: Self = Self {
        left_direction: MotorDirection::Forward,
        left_speed: 0,
        right_direction: MotorDirection::Forward,
        right_speed: 0,
    };

    /// Directions must be 0 (forward) or 1 (backward); speeds `0..=255`.
    pub fn try_new(
        left_direction: i32,
        left_speed: i32,
        right_direction: i32,
        right_speed: i32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            left_direction: MotorDirection::parse("left_direction", left_direction)?,
            left_speed: byte_arg("left_speed", left_speed)?,
            right_direction: MotorDirection::parse("right_direction", right_direction)?,
            right_speed: byte_arg("right_speed", right_speed)?,
        })
    }

    pub fn encode(&self) -> Result<CommandFrame, FrameError> {
        CommandFrame::new(
            Opcode::SetMotors,
            &[
                self.left_direction.byte(),
                self.left_speed,
                self.right_direction.byte(),
                self.right_speed,
            ],
        )
    }
}

/// Buzzer tone. Both fields travel big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BuzzerCommand {
    pub duration_ms: u16,
    pub frequency_hz: u16,
}

impl BuzzerCommand {
    pub const fn new(duration_ms: u16, frequency_hz: u16) -> Self {
        Self {
            duration_ms,
            frequency_hz,
        }
    }

    /// Both values must fit in 16 bits unsigned.
    pub fn try_new(duration_ms: i32, frequency_hz: i32) -> Result<Self, ValidationError> {
        Ok(Self {
            duration_ms: word_arg("duration_ms", duration_ms)?,
            frequency_hz: word_arg("frequency_hz", frequency_hz)?,
        })
    }

    pub fn encode(&self) -> Result<CommandFrame, FrameError> {
        let [duration_hi, duration_lo] = self.duration_ms.to_be_bytes();
        let [frequency_hi, frequency_lo] = self.frequency_hz.to_be_bytes();
        CommandFrame::new(
            Opcode::SetBuzzer,
            &[duration_hi, duration_lo, frequency_hi, frequency_lo],
        )
    }
}

/// Every command the host can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SetLed(LedColor),
    Drive(MotorCommand),
    Buzz(BuzzerCommand),
    /// Return to the ambient colour-cycling mode.
    Idle,
    /// Halt motors and turn off the LED.
    Stop,
    ConnectivityProbe,
    Read(SensorKind),
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SetLed(_) => Opcode::SetLed,
            Command::Drive(_) => Opcode::SetMotors,
            Command::Buzz(_) => Opcode::SetBuzzer,
            Command::Idle => Opcode::ResetToIdle,
            Command::Stop => Opcode::Stop,
            Command::ConnectivityProbe => Opcode::ConnectivityProbe,
            Command::Read(kind) => kind.request_opcode(),
        }
    }

    pub fn encode(&self) -> Result<CommandFrame, FrameError> {
        match self {
            Command::SetLed(color) => color.encode(),
            Command::Drive(motors) => motors.encode(),
            Command::Buzz(buzzer) => buzzer.encode(),
            Command::Idle | Command::Stop | Command::ConnectivityProbe | Command::Read(_) => {
                Ok(CommandFrame::bare(self.opcode()))
            }
        }
    }
}
