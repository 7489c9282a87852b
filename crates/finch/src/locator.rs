//! Finding and opening the robot.

use finch_hid_common::{
    HidDevice, HidDeviceInfo, HidPort, HidResult, InputReceiver, InputReport,
};
use finch_hid_protocol::DeviceIdentity;
use tracing::{debug, info, warn};

use crate::error::{FinchError, Result};

/// An open Finch together with its input report stream.
///
/// The device is closed exactly once: by [`ConnectedDevice::close`] or, if
/// that was never called, when the value is dropped.
pub struct ConnectedDevice {
    device: Box<dyn HidDevice>,
    input: InputReceiver,
    closed: bool,
}

impl ConnectedDevice {
    pub fn info(&self) -> &HidDeviceInfo {
        self.device.device_info()
    }

    pub fn is_connected(&self) -> bool {
        !self.closed && self.device.is_connected()
    }

    pub fn write(&mut self, data: &[u8]) -> HidResult<usize> {
        self.device.write_report(data)
    }

    /// Discard every input report already queued. Returns how many were
    /// dropped.
    pub fn drain_input(&mut self) -> usize {
        let mut dropped = 0usize;
        while let Ok(report) = self.input.try_recv() {
            debug!(len = report.len(), "dropping queued input report {:02X?}", report);
            dropped = dropped.saturating_add(1);
        }
        dropped
    }

    /// Wait for the next input report. `None` once the stream has ended.
    pub async fn next_input(&mut self) -> Option<InputReport> {
        self.input.recv().await
    }

    pub fn close(&mut self) -> HidResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.input.close();
        info!(path = %self.info().path, "closing Finch");
        self.device.close()
    }
}

impl Drop for ConnectedDevice {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close Finch on drop");
        }
    }
}

impl std::fmt::Debug for ConnectedDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedDevice")
            .field("info", self.info())
            .field("closed", &self.closed)
            .finish()
    }
}

/// All attached devices carrying `identity`, in enumeration order.
pub async fn find_all(port: &dyn HidPort, identity: DeviceIdentity) -> Result<Vec<HidDeviceInfo>> {
    let devices = port.list_devices().await.map_err(FinchError::Enumeration)?;
    Ok(devices
        .into_iter()
        .filter(|d| identity.matches(d.vendor_id, d.product_id))
        .collect())
}

/// Open the first attached device carrying `identity` and subscribe to its
/// input reports.
///
/// Nothing is opened when no device matches. When several match, the first
/// one enumerated is used.
pub async fn locate(port: &dyn HidPort, identity: DeviceIdentity) -> Result<ConnectedDevice> {
    let matches = find_all(port, identity).await?;
    let Some(info) = matches.first() else {
        return Err(FinchError::DeviceNotFound {
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
        });
    };
    if matches.len() > 1 {
        warn!(
            count = matches.len(),
            path = %info.path,
            "several devices match {identity}, using the first"
        );
    }

    let mut device = port.open_device(info).await.map_err(FinchError::Connection)?;
    let input = match device.subscribe_input() {
        Ok(input) => input,
        Err(e) => {
            if let Err(close_err) = device.close() {
                warn!(error = %close_err, "failed to close device after subscribe error");
            }
            return Err(FinchError::Connection(e));
        }
    };

    info!(
        path = %info.path,
        name = %info.display_name(),
        "connected to Finch {identity}"
    );
    Ok(ConnectedDevice {
        device,
        input,
        closed: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use finch_hid_common::HidError;
    use finch_hid_common::mock::{MockHidDevice, MockHidPort};

    #[tokio::test]
    async fn locate_picks_first_match() -> Result<()> {
        let first = MockHidDevice::new(0x2354, 0x1111, "/dev/hidraw1");
        let port = MockHidPort::new()
            .with_device(MockHidDevice::new(0x046D, 0xC24F, "/dev/hidraw0"))
            .with_device(first.clone())
            .with_device(MockHidDevice::new(0x2354, 0x1111, "/dev/hidraw2"));

        let device = locate(&port, DeviceIdentity::FINCH).await?;
        assert_eq!(device.info().path, "/dev/hidraw1");
        assert_eq!(port.open_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn locate_without_match_opens_nothing() {
        let port =
            MockHidPort::new().with_device(MockHidDevice::new(0x046D, 0xC24F, "/dev/hidraw0"));

        let result = locate(&port, DeviceIdentity::FINCH).await;
        assert!(matches!(
            result,
            Err(FinchError::DeviceNotFound {
                vendor_id: 0x2354,
                product_id: 0x1111
            })
        ));
        assert_eq!(port.open_count(), 0);
    }

    #[tokio::test]
    async fn subscribe_failure_closes_device() {
        let device = MockHidDevice::new(0x2354, 0x1111, "/dev/hidraw0");
        let port = MockHidPort::new().with_device(device.clone());

        let mut held = device.clone();
        let _rx = held.subscribe_input();

        let result = locate(&port, DeviceIdentity::FINCH).await;
        assert!(matches!(
            result,
            Err(FinchError::Connection(HidError::AlreadySubscribed))
        ));
        assert_eq!(device.close_count(), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_drop_does_not_reclose() -> Result<()> {
        let mock = MockHidDevice::new(0x2354, 0x1111, "/dev/hidraw0");
        let port = MockHidPort::new().with_device(mock.clone());

        let mut device = locate(&port, DeviceIdentity::FINCH).await?;
        device.close().map_err(FinchError::Connection)?;
        device.close().map_err(FinchError::Connection)?;
        assert!(!device.is_connected());
        drop(device);

        assert_eq!(mock.close_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn drain_discards_queued_reports() -> Result<()> {
        let mock = MockHidDevice::new(0x2354, 0x1111, "/dev/hidraw0");
        mock.push_input(vec![1]);
        mock.push_input(vec![2]);
        let port = MockHidPort::new().with_device(mock.clone());

        let mut device = locate(&port, DeviceIdentity::FINCH).await?;
        assert_eq!(device.drain_input(), 2);
        assert_eq!(device.drain_input(), 0);

        mock.push_input(vec![3]);
        assert_eq!(device.next_input().await, Some(vec![3]));
        Ok(())
    }
}
