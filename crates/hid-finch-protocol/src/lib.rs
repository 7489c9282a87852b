//! Finch robot HID protocol: device ids, command frames, and sensor decoding.
//!
//! This crate is intentionally I/O-free and allocation-free on hot paths.
//! It provides pure functions and types that can be tested without hardware
//! or OS-level HID plumbing.
//!
//! Every command sent to the robot is a 9-byte output report whose first byte
//! is an ASCII opcode. Sensor requests are answered by a 9-byte input report.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod command;
pub mod frame;
pub mod ids;
pub mod opcode;
pub mod sensor;

pub use command::{
    BuzzerCommand, Command, LedColor, MotorCommand, MotorDirection, ValidationError,
};
pub use frame::{CommandFrame, FRAME_LEN, FrameError, MAX_PAYLOAD_LEN};
pub use ids::{DeviceIdentity, IdParseError, PRODUCT_ID, VENDOR_ID, is_finch, parse_id};
pub use opcode::Opcode;
pub use sensor::{
    INPUT_REPORT_LEN, ParseError, RawPayload, SensorKind, SensorReading, decode,
    decode_temperature, parse_temperature,
};
