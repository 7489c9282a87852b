//! Finch USB vendor and product ID constants.
//!
//! | Field | Hex      | Decimal | Notes                                  |
//! |-------|----------|---------|----------------------------------------|
//! | VID   | `0x2354` | 9044    | BirdBrain Technologies                 |
//! | PID   | `0x1111` | 4369    | Finch (original USB-tethered revision) |
//!
//! Older tooling lists the pair in decimal. Both spellings name the same
//! device, so [`parse_id`] accepts either form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Finch USB Vendor ID.
pub const VENDOR_ID: u16 = 0x2354;

/// Finch USB Product ID.
pub const PRODUCT_ID: u16 = 0x1111;

/// A USB vendor/product identifier pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    /// The compiled-in identity of the Finch robot.
    pub const FINCH: Self = Self::new(VENDOR_ID, PRODUCT_ID);

    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// Returns `true` if the VID/PID pair is exactly this identity.
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::FINCH
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Returns `true` if the VID/PID pair identifies a Finch.
pub fn is_finch(vendor_id: u16, product_id: u16) -> bool {
    DeviceIdentity::FINCH.matches(vendor_id, product_id)
}

/// Error returned by [`parse_id`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid USB id '{raw}': expected hex (0x2354) or decimal (9044) in 0..=65535")]
pub struct IdParseError {
    pub raw: String,
}

/// Parse a VID/PID string in hex (`0x2354`) or decimal (`9044`) form.
///
/// A `0x`/`0X` prefix selects hex; anything else is read as decimal, so the
/// two historical spellings of the Finch ids resolve to the same value.
pub fn parse_id(raw: &str) -> Result<u16, IdParseError> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(digits) => u16::from_str_radix(digits, 16).ok(),
        None => trimmed.parse::<u16>().ok(),
    };
    parsed.ok_or_else(|| IdParseError {
        raw: raw.to_string(),
    })
}
