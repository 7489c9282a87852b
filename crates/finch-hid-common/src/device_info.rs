//! Device information types for HID devices

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub path: String,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            serial_number: None,
            manufacturer: None,
            product_name: None,
            path: path.into(),
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}

impl From<&hidapi::DeviceInfo> for HidDeviceInfo {
    fn from(info: &hidapi::DeviceInfo) -> Self {
        let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            serial_number: non_empty(info.serial_number()),
            manufacturer: non_empty(info.manufacturer_string()),
            product_name: non_empty(info.product_string()),
            path: info.path().to_string_lossy().into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_creation() {
        let info = HidDeviceInfo::new(0x2354, 0x1111, "/dev/hidraw0");
        assert_eq!(info.vendor_id, 0x2354);
        assert_eq!(info.product_id, 0x1111);
        assert!(info.matches(0x2354, 0x1111));
        assert!(!info.matches(0x2354, 0x9999));
    }

    #[test]
    fn test_device_info_display_name() {
        let info = HidDeviceInfo::new(0x2354, 0x1111, "/dev/hidraw0")
            .with_product_name("Finch");
        assert_eq!(info.display_name(), "Finch");

        let info = HidDeviceInfo::new(0x2354, 0x1111, "/dev/hidraw0")
            .with_manufacturer("BirdBrain Technologies");
        assert_eq!(info.display_name(), "BirdBrain Technologies");

        let info = HidDeviceInfo::new(0x2354, 0x1111, "/dev/hidraw0");
        assert_eq!(info.display_name(), "2354:1111");
    }

    #[test]
    fn test_device_info_serializes() -> Result<(), serde_json::Error> {
        let info = HidDeviceInfo::new(0x2354, 0x1111, "/dev/hidraw3").with_serial("F-01");
        let json = serde_json::to_string(&info)?;
        let back: HidDeviceInfo = serde_json::from_str(&json)?;
        assert_eq!(back, info);
        assert!(json.contains("\"vendor_id\":9044"));
        Ok(())
    }
}
