//! Error type shared by the locator and the adapter.

use finch_hid_common::HidError;
use finch_hid_protocol::{FrameError, Opcode, ParseError, ValidationError};

use crate::config::ConfigError;

/// Everything that can go wrong while talking to a Finch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FinchError {
    /// No attached HID device carries the configured vendor/product pair.
    #[error("Finch not found: no HID device with vendor={vendor_id:#06x}, product={product_id:#06x}")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// A matching device was found but could not be opened.
    #[error("Failed to connect to Finch: {0}")]
    Connection(HidError),

    /// The transport could not list attached devices.
    #[error("Failed to enumerate HID devices: {0}")]
    Enumeration(HidError),

    /// A caller-supplied value was out of range. Nothing was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The transport rejected the frame or accepted only part of it.
    #[error("Failed to write to Finch: {0}")]
    TransportWrite(HidError),

    /// A frame payload exceeded 8 bytes.
    #[error("Invalid command frame: {0}")]
    InvalidFrame(#[from] FrameError),

    #[error("No response to {opcode} within {timeout_ms}ms")]
    ResponseTimeout { opcode: Opcode, timeout_ms: u64 },

    /// The input report stream ended while a response was awaited.
    #[error("Input report stream closed")]
    InputClosed,

    #[error("Failed to decode input report: {0}")]
    Decode(#[from] ParseError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl FinchError {
    /// Whether repeating the same call could succeed without outside
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FinchError::InvalidArgument(_)
                | FinchError::ResponseTimeout { .. }
                | FinchError::TransportWrite(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FinchError>;
