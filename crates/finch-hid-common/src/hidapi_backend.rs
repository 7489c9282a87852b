//! hidapi-backed transport.
//!
//! Subscribing to a device's input spawns one reader thread that polls
//! `read_timeout` in short slices and forwards each input report into the
//! subscriber's channel. The `hidapi::HidDevice` handle is shared by the
//! reader and the writer behind a mutex, so a write waits at most one read
//! slice before it reaches the device.

use std::ffi::CString;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use async_trait::async_trait;
use hidapi::HidApi;
use parking_lot::{Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{HidDevice, HidDeviceInfo, HidError, HidPort, HidResult, InputReceiver, InputReport};

/// Longest a single `read_timeout` call may hold the device, in milliseconds.
pub const READ_SLICE_MS: i32 = 10;

/// Size of the reader's receive buffer.
pub const MAX_INPUT_REPORT_LEN: usize = 64;

type SharedHandle = Arc<Mutex<Option<hidapi::HidDevice>>>;

/// Enumerates and opens devices through the platform hidapi library.
pub struct HidApiPort {
    api: Mutex<HidApi>,
}

impl HidApiPort {
    pub fn new() -> HidResult<Self> {
        let api = HidApi::new().map_err(|e| HidError::InitError(e.to_string()))?;
        Ok(Self {
            api: Mutex::new(api),
        })
    }
}

#[async_trait]
impl HidPort for HidApiPort {
    async fn list_devices(&self) -> HidResult<Vec<HidDeviceInfo>> {
        let mut api = self.api.lock();
        api.refresh_devices()
            .map_err(|e| HidError::EnumerationError(e.to_string()))?;
        let devices: Vec<HidDeviceInfo> = api.device_list().map(HidDeviceInfo::from).collect();
        debug!(count = devices.len(), "enumerated HID devices");
        Ok(devices)
    }

    async fn open_device(&self, info: &HidDeviceInfo) -> HidResult<Box<dyn HidDevice>> {
        let path = CString::new(info.path.as_str())
            .map_err(|e| HidError::OpenError(format!("{}: {e}", info.path)))?;
        let handle = self
            .api
            .lock()
            .open_path(&path)
            .map_err(|e| HidError::OpenError(format!("{}: {e}", info.path)))?;

        info!(
            path = %info.path,
            vendor_id = format_args!("0x{:04X}", info.vendor_id),
            product_id = format_args!("0x{:04X}", info.product_id),
            "opened HID device"
        );
        Ok(Box::new(HidApiDevice::new(info.clone(), handle)))
    }
}

struct ReaderThread {
    stop: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

/// An open hidapi device.
///
/// Dropping it stops the reader thread and closes the OS handle.
pub struct HidApiDevice {
    info: HidDeviceInfo,
    handle: SharedHandle,
    connected: Arc<AtomicBool>,
    reader: Option<ReaderThread>,
}

impl HidApiDevice {
    fn new(info: HidDeviceInfo, handle: hidapi::HidDevice) -> Self {
        Self {
            info,
            handle: Arc::new(Mutex::new(Some(handle))),
            connected: Arc::new(AtomicBool::new(true)),
            reader: None,
        }
    }

    fn stop_reader(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.stop.store(true, Ordering::Release);
            if reader.join.join().is_err() {
                warn!(path = %self.info.path, "HID reader thread panicked");
            }
        }
    }
}

fn read_loop(
    path: String,
    handle: SharedHandle,
    connected: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<InputReport>,
) {
    let mut buf = [0u8; MAX_INPUT_REPORT_LEN];
    while !stop.load(Ordering::Acquire) {
        let result = {
            let guard = handle.lock();
            let Some(device) = guard.as_ref() else {
                break;
            };
            let result = device.read_timeout(&mut buf, READ_SLICE_MS);
            MutexGuard::unlock_fair(guard);
            result
        };

        match result {
            Ok(0) => {}
            Ok(n) => {
                let report: InputReport = buf.get(..n).unwrap_or(&buf).to_vec();
                debug!(path = %path, len = n, "input report");
                if tx.send(report).is_err() {
                    debug!(path = %path, "input receiver dropped, stopping reader");
                    break;
                }
            }
            Err(e) => {
                warn!(path = %path, error = %e, "HID read failed, marking device disconnected");
                connected.store(false, Ordering::Release);
                break;
            }
        }
    }
}

impl HidDevice for HidApiDevice {
    /// Hands `data` to `hid_write` unchanged, so the Finch opcode sits in
    /// byte 0. On Windows hidapi treats byte 0 as the report ID; the Finch
    /// uses no numbered reports and this works on Linux and macOS, but a
    /// Windows host may need a leading `0x00` report ID instead.
    fn write_report(&mut self, data: &[u8]) -> HidResult<usize> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(HidError::Disconnected);
        }
        let guard = self.handle.lock();
        let device = guard.as_ref().ok_or(HidError::Disconnected)?;
        device
            .write(data)
            .map_err(|e| HidError::WriteError(e.to_string()))
    }

    fn subscribe_input(&mut self) -> HidResult<InputReceiver> {
        if self.reader.is_some() {
            return Err(HidError::AlreadySubscribed);
        }
        if !self.connected.load(Ordering::Acquire) {
            return Err(HidError::Disconnected);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let join = std::thread::Builder::new()
            .name("finch-hid-reader".to_string())
            .spawn({
                let path = self.info.path.clone();
                let handle = Arc::clone(&self.handle);
                let connected = Arc::clone(&self.connected);
                let stop = Arc::clone(&stop);
                move || read_loop(path, handle, connected, stop, tx)
            })
            .map_err(|e| HidError::ReadError(format!("failed to spawn reader: {e}")))?;

        self.reader = Some(ReaderThread { stop, join });
        Ok(rx)
    }

    fn device_info(&self) -> &HidDeviceInfo {
        &self.info
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn close(&mut self) -> HidResult<()> {
        self.stop_reader();
        self.connected.store(false, Ordering::Release);
        if self.handle.lock().take().is_some() {
            info!(path = %self.info.path, "closed HID device");
        }
        Ok(())
    }
}

impl Drop for HidApiDevice {
    fn drop(&mut self) {
        self.stop_reader();
    }
}
