//! USB HID transport for the Finch driver
//!
//! This crate owns everything that touches the operating system's HID stack:
//! device enumeration, opening a device, writing output reports, and
//! delivering input reports as they arrive. Protocol logic lives elsewhere and
//! talks to the transport only through the [`HidPort`] and [`HidDevice`]
//! traits, so it can be exercised against [`hid_traits::mock`] without
//! hardware.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod hid_traits;
pub mod hidapi_backend;

pub use device_info::*;
pub use hid_traits::*;
pub use hidapi_backend::{HidApiDevice, HidApiPort};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to initialize HID backend: {0}")]
    InitError(String),

    #[error("Failed to enumerate devices: {0}")]
    EnumerationError(String),

    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Short write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    #[error("Input reports already subscribed")]
    AlreadySubscribed,

    #[error("Device disconnected")]
    Disconnected,
}

pub type HidResult<T> = Result<T, HidError>;
