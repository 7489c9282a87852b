//! HID device traits

use crate::{HidDeviceInfo, HidResult};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Raw bytes of one HID input report.
pub type InputReport = Vec<u8>;

/// Receiving end of a device's input-report notifications.
pub type InputReceiver = mpsc::UnboundedReceiver<InputReport>;

/// An open HID device.
///
/// Implementations must be `Send` so the owning adapter can move between
/// tasks, but are not required to be `Sync`: a device has a single writer.
pub trait HidDevice: Send {
    /// Write one output report. Returns the number of bytes the backend
    /// accepted.
    fn write_report(&mut self, data: &[u8]) -> HidResult<usize>;

    /// Start delivering input reports. May be called once per device.
    fn subscribe_input(&mut self) -> HidResult<InputReceiver>;

    fn device_info(&self) -> &HidDeviceInfo;

    fn is_connected(&self) -> bool;

    /// Release the device. Further writes fail with
    /// [`HidError::Disconnected`](crate::HidError::Disconnected).
    fn close(&mut self) -> HidResult<()>;
}

#[async_trait]
pub trait HidPort: Send + Sync {
    async fn list_devices(&self) -> HidResult<Vec<HidDeviceInfo>>;

    async fn open_device(&self, info: &HidDeviceInfo) -> HidResult<Box<dyn HidDevice>>;
}

pub mod mock {
    use super::*;
    use crate::HidError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockState {
        connected: bool,
        write_history: Vec<Vec<u8>>,
        pending_input: VecDeque<InputReport>,
        input_tx: Option<mpsc::UnboundedSender<InputReport>>,
        auto_replies: Vec<(u8, InputReport)>,
        write_error: Option<HidError>,
        accept_len: Option<usize>,
        close_count: usize,
    }

    impl MockState {
        fn deliver(&mut self, report: InputReport) {
            match &self.input_tx {
                Some(tx) => {
                    if let Err(unsent) = tx.send(report) {
                        self.pending_input.push_back(unsent.0);
                    }
                }
                None => self.pending_input.push_back(report),
            }
        }
    }

    /// In-memory device that records writes and replays scripted input.
    ///
    /// Clones share state, so a test can keep one handle for inspection while
    /// the code under test owns another.
    #[derive(Clone)]
    pub struct MockHidDevice {
        info: HidDeviceInfo,
        state: Arc<Mutex<MockState>>,
    }

    impl MockHidDevice {
        pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
            Self {
                info: HidDeviceInfo::new(vendor_id, product_id, path),
                state: Arc::new(Mutex::new(MockState {
                    connected: true,
                    ..MockState::default()
                })),
            }
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Push an input report as if the device had just sent it. Reports
        /// pushed before anyone subscribes are delivered on subscription.
        pub fn push_input(&self, data: impl Into<InputReport>) {
            self.lock().deliver(data.into());
        }

        /// Answer every write whose first byte is `trigger` with `reply`.
        pub fn auto_reply(&self, trigger: u8, reply: impl Into<InputReport>) {
            self.lock().auto_replies.push((trigger, reply.into()));
        }

        /// Make every following write fail with `error`.
        pub fn fail_writes(&self, error: HidError) {
            self.lock().write_error = Some(error);
        }

        /// Make every following write accept only `len` bytes.
        pub fn accept_only(&self, len: usize) {
            self.lock().accept_len = Some(len);
        }

        pub fn get_write_history(&self) -> Vec<Vec<u8>> {
            self.lock().write_history.clone()
        }

        pub fn close_count(&self) -> usize {
            self.lock().close_count
        }

        /// Simulate an unplug: writes fail and the input stream ends.
        pub fn disconnect(&self) {
            let mut state = self.lock();
            state.connected = false;
            state.input_tx = None;
        }

        pub fn reconnect(&self) {
            self.lock().connected = true;
        }
    }

    impl HidDevice for MockHidDevice {
        fn write_report(&mut self, data: &[u8]) -> HidResult<usize> {
            let mut state = self.lock();
            if !state.connected {
                return Err(HidError::Disconnected);
            }
            if let Some(error) = state.write_error.clone() {
                return Err(error);
            }

            state.write_history.push(data.to_vec());
            let replies: Vec<InputReport> = state
                .auto_replies
                .iter()
                .filter(|(trigger, _)| data.first() == Some(trigger))
                .map(|(_, reply)| reply.clone())
                .collect();
            for reply in replies {
                state.deliver(reply);
            }

            Ok(state
                .accept_len
                .map_or(data.len(), |len| len.min(data.len())))
        }

        fn subscribe_input(&mut self) -> HidResult<InputReceiver> {
            let mut state = self.lock();
            if state.input_tx.is_some() {
                return Err(HidError::AlreadySubscribed);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            for report in state.pending_input.drain(..) {
                if tx.send(report).is_err() {
                    break;
                }
            }
            state.input_tx = Some(tx);
            Ok(rx)
        }

        fn device_info(&self) -> &HidDeviceInfo {
            &self.info
        }

        fn is_connected(&self) -> bool {
            self.lock().connected
        }

        fn close(&mut self) -> HidResult<()> {
            let mut state = self.lock();
            state.close_count += 1;
            state.connected = false;
            state.input_tx = None;
            Ok(())
        }
    }

    pub struct MockHidPort {
        devices: Vec<MockHidDevice>,
        open_error: Option<HidError>,
        list_error: Option<HidError>,
        open_count: Mutex<usize>,
    }

    impl MockHidPort {
        pub fn new() -> Self {
            Self {
                devices: Vec::new(),
                open_error: None,
                list_error: None,
                open_count: Mutex::new(0),
            }
        }

        pub fn add_device(&mut self, device: MockHidDevice) {
            self.devices.push(device);
        }

        pub fn with_device(mut self, device: MockHidDevice) -> Self {
            self.add_device(device);
            self
        }

        /// Make every `open_device` call fail with `error`.
        pub fn fail_open(&mut self, error: HidError) {
            self.open_error = Some(error);
        }

        /// Make `list_devices` fail with `error`.
        pub fn fail_list(&mut self, error: HidError) {
            self.list_error = Some(error);
        }

        pub fn device_count(&self) -> usize {
            self.devices.len()
        }

        /// Number of successful and failed open attempts so far.
        pub fn open_count(&self) -> usize {
            *self.open_count.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    #[async_trait]
    impl HidPort for MockHidPort {
        async fn list_devices(&self) -> HidResult<Vec<HidDeviceInfo>> {
            if let Some(error) = &self.list_error {
                return Err(error.clone());
            }
            Ok(self
                .devices
                .iter()
                .map(|d| d.device_info().clone())
                .collect())
        }

        async fn open_device(&self, info: &HidDeviceInfo) -> HidResult<Box<dyn HidDevice>> {
            {
                let mut count = self.open_count.lock().unwrap_or_else(|e| e.into_inner());
                *count += 1;
            }
            if let Some(error) = &self.open_error {
                return Err(error.clone());
            }
            self.devices
                .iter()
                .find(|device| device.info.path == info.path)
                .map(|device| Box::new(device.clone()) as Box<dyn HidDevice>)
                .ok_or_else(|| HidError::DeviceNotFound(info.path.clone()))
        }
    }

    impl Default for MockHidPort {
        fn default() -> Self {
            Self::new()
        }
    }
}
