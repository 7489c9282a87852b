//! Host-side driver for the Finch educational robot.
//!
//! The robot enumerates as a USB HID device (vendor `0x2354`, product
//! `0x1111`) and speaks a fixed 9-byte command protocol. [`Finch`] locates the
//! robot at construction and exposes one method per capability:
//!
//! ```no_run
//! # async fn demo() -> finch::Result<()> {
//! let mut finch = finch::Finch::connect().await?;
//! finch.set_led(255, 0, 0)?;
//! finch.drive(0, 128, 0, 128)?;
//! let celsius = finch.read_temperature().await?;
//! println!("{celsius:.1} °C");
//! finch.stop()?;
//! finch.close()
//! # }
//! ```
//!
//! Tests and alternative transports go through [`Finch::connect_with`], which
//! accepts any [`hid::HidPort`].

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod locator;

pub use adapter::Finch;
pub use config::{ConfigError, FinchConfig};
pub use error::{FinchError, Result};
pub use locator::{ConnectedDevice, find_all, locate};

pub use finch_hid_common as hid;
pub use finch_hid_protocol as protocol;
pub use finch_hid_protocol::{
    Command, DeviceIdentity, MotorDirection, RawPayload, SensorKind, SensorReading,
};
