//! Driver configuration.
//!
//! Defaults match a stock Finch. Environment variables override individual
//! fields:
//!
//! | Variable                | Meaning                                  |
//! |-------------------------|------------------------------------------|
//! | `FINCH_VENDOR_ID`       | USB vendor id, hex (`0x2354`) or decimal |
//! | `FINCH_PRODUCT_ID`      | USB product id, hex or decimal           |
//! | `FINCH_READ_TIMEOUT_MS` | sensor response timeout, milliseconds    |

use std::time::Duration;

use finch_hid_protocol::{DeviceIdentity, IdParseError, parse_id};
use serde::{Deserialize, Serialize};

pub const VENDOR_ID_ENV: &str = "FINCH_VENDOR_ID";
pub const PRODUCT_ID_ENV: &str = "FINCH_PRODUCT_ID";
pub const READ_TIMEOUT_ENV: &str = "FINCH_READ_TIMEOUT_MS";

pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    InvalidId {
        var: &'static str,
        #[source]
        source: IdParseError,
    },

    #[error("{var}: invalid timeout '{raw}', expected a whole number of milliseconds")]
    InvalidTimeout { var: &'static str, raw: String },

    #[error("read timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinchConfig {
    /// Vendor/product pair the locator looks for.
    pub identity: DeviceIdentity,
    /// How long a sensor read waits for its input report.
    pub read_timeout_ms: u64,
}

impl Default for FinchConfig {
    fn default() -> Self {
        Self {
            identity: DeviceIdentity::FINCH,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl FinchConfig {
    /// Defaults overridden by the `FINCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`FinchConfig::from_env`], reading variables through `lookup`.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(VENDOR_ID_ENV) {
            config.identity.vendor_id = parse_id(&raw).map_err(|source| ConfigError::InvalidId {
                var: VENDOR_ID_ENV,
                source,
            })?;
        }
        if let Some(raw) = get(PRODUCT_ID_ENV) {
            config.identity.product_id =
                parse_id(&raw).map_err(|source| ConfigError::InvalidId {
                    var: PRODUCT_ID_ENV,
                    source,
                })?;
        }
        if let Some(raw) = get(READ_TIMEOUT_ENV) {
            config.read_timeout_ms =
                raw.trim()
                    .parse()
                    .ok()
                    .ok_or_else(|| ConfigError::InvalidTimeout {
                        var: READ_TIMEOUT_ENV,
                        raw: raw.clone(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_identity(mut self, identity: DeviceIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_read_timeout_ms(mut self, read_timeout_ms: u64) -> Self {
        self.read_timeout_ms = read_timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
