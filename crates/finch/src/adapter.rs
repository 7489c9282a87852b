//! The protocol adapter: one method per robot capability.
//!
//! Every method validates its arguments before anything is written, so an
//! out-of-range value never reaches the wire. Sensor reads write a request
//! frame and then wait for the next input report. At most one request is in
//! flight because every method takes `&mut self`; reports that were already
//! queued when a request is sent are discarded rather than taken as the
//! answer. After a timed-out read, the next read first waits up to one read
//! timeout for the overdue reply and discards it.

use finch_hid_common::{HidApiPort, HidDeviceInfo, HidError, HidPort, InputReport};
use finch_hid_protocol::{
    BuzzerCommand, Command, CommandFrame, LedColor, MotorCommand, Opcode, RawPayload,
    SensorKind, SensorReading, decode, parse_temperature,
};
use tracing::{debug, warn};

use crate::config::FinchConfig;
use crate::error::{FinchError, Result};
use crate::locator::{ConnectedDevice, locate};

/// A connected Finch.
#[derive(Debug)]
pub struct Finch {
    device: ConnectedDevice,
    config: FinchConfig,
    /// Request whose answer was never consumed because the read timed out
    /// or its future was dropped.
    stale_request: Option<Opcode>,
}

impl Finch {
    /// Connect through the system HID stack, configured from the
    /// environment.
    pub async fn connect() -> Result<Self> {
        let config = FinchConfig::from_env()?;
        let port = HidApiPort::new().map_err(FinchError::Connection)?;
        Self::connect_with(&port, config).await
    }

    /// Connect through `port` using `config`.
    pub async fn connect_with(port: &dyn HidPort, config: FinchConfig) -> Result<Self> {
        config.validate()?;
        let device = locate(port, config.identity).await?;
        Ok(Self {
            device,
            config,
            stale_request: None,
        })
    }

    pub fn config(&self) -> &FinchConfig {
        &self.config
    }

    pub fn device_info(&self) -> &HidDeviceInfo {
        self.device.info()
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_connected()
    }

    /// Set the beak LED. Each channel must be in `0..=255`.
    pub fn set_led(&mut self, red: i32, green: i32, blue: i32) -> Result<()> {
        let color = LedColor::try_new(red, green, blue)?;
        self.send(color.encode()?)
    }

    /// Set both wheel motors. Directions are `0` (forward) or `1`
    /// (backward); speeds are in `0..=255`.
    pub fn drive(
        &mut self,
        left_direction: i32,
        left_speed: i32,
        right_direction: i32,
        right_speed: i32,
    ) -> Result<()> {
        let motors =
            MotorCommand::try_new(left_direction, left_speed, right_direction, right_speed)?;
        self.send(motors.encode()?)
    }

    /// Sound the buzzer. Both arguments must be in `0..=65535`.
    pub fn buzz(&mut self, duration_ms: i32, frequency_hz: i32) -> Result<()> {
        let buzzer = BuzzerCommand::try_new(duration_ms, frequency_hz)?;
        self.send(buzzer.encode()?)
    }

    /// Return to the idle colour-cycling mode.
    pub fn idle(&mut self) -> Result<()> {
        self.send(CommandFrame::bare(Opcode::ResetToIdle))
    }

    /// Stop the motors and turn the LED off.
    pub fn stop(&mut self) -> Result<()> {
        self.send(CommandFrame::bare(Opcode::Stop))
    }

    /// Send the connectivity test frame. The reply, if any, is not awaited.
    pub fn probe(&mut self) -> Result<()> {
        self.send(CommandFrame::bare(Opcode::ConnectivityProbe))
    }

    /// Run an already-validated command. Sensor requests return their
    /// reading; everything else returns `None` once written.
    pub async fn execute(&mut self, command: &Command) -> Result<Option<SensorReading>> {
        match command {
            Command::Read(kind) => self.read_sensor(*kind).await.map(Some),
            other => self.send(other.encode()?).map(|()| None),
        }
    }

    /// Temperature in degrees Celsius.
    pub async fn read_temperature(&mut self) -> Result<f64> {
        let report = self.request(SensorKind::Temperature).await?;
        Ok(parse_temperature(&report)?)
    }

    pub async fn read_light(&mut self) -> Result<RawPayload> {
        self.read_raw(SensorKind::Light).await
    }

    pub async fn read_accelerometer(&mut self) -> Result<RawPayload> {
        self.read_raw(SensorKind::Accelerometer).await
    }

    pub async fn read_obstacle(&mut self) -> Result<RawPayload> {
        self.read_raw(SensorKind::Obstacle).await
    }

    pub async fn read_sensor(&mut self, kind: SensorKind) -> Result<SensorReading> {
        let report = self.request(kind).await?;
        Ok(decode(kind, &report)?)
    }

    /// Release the device.
    pub fn close(mut self) -> Result<()> {
        self.device.close().map_err(FinchError::Connection)
    }

    async fn read_raw(&mut self, kind: SensorKind) -> Result<RawPayload> {
        let report = self.request(kind).await?;
        Ok(RawPayload::from_report(&report)?)
    }

    async fn request(&mut self, kind: SensorKind) -> Result<InputReport> {
        let opcode = kind.request_opcode();

        if let Some(stale) = self.stale_request {
            self.resync(stale).await?;
            self.stale_request = None;
        }
        let dropped = self.device.drain_input();
        if dropped > 0 {
            warn!(dropped, "discarded input reports queued before {opcode}");
        }

        self.send(CommandFrame::bare(opcode))?;
        self.stale_request = Some(opcode);

        let timeout = self.config.read_timeout();
        let report = match tokio::time::timeout(timeout, self.device.next_input()).await {
            Ok(Some(report)) => report,
            Ok(None) => {
                self.stale_request = None;
                return Err(FinchError::InputClosed);
            }
            Err(_elapsed) => {
                warn!("no response to {opcode} after {}ms", self.config.read_timeout_ms);
                return Err(FinchError::ResponseTimeout {
                    opcode,
                    timeout_ms: self.config.read_timeout_ms,
                });
            }
        };
        self.stale_request = None;

        debug!(len = report.len(), "{opcode} answered with {:02X?}", report);
        Ok(report)
    }

    /// Wait out the reply to a request that timed out earlier so it cannot
    /// be taken as the answer to the next one. Gives up after one read
    /// timeout.
    async fn resync(&mut self, stale: Opcode) -> Result<()> {
        let dropped = self.device.drain_input();
        if dropped > 0 {
            warn!(dropped, "discarded late reply to {stale}");
            return Ok(());
        }

        match tokio::time::timeout(self.config.read_timeout(), self.device.next_input()).await {
            Ok(Some(report)) => {
                warn!("discarded late reply to {stale}: {:02X?}", report);
                Ok(())
            }
            Ok(None) => Err(FinchError::InputClosed),
            Err(_elapsed) => {
                warn!("{stale} was never answered, continuing");
                Ok(())
            }
        }
    }

    /// The single write path. A write that leaves part of the frame behind
    /// is treated as a failure.
    fn send(&mut self, frame: CommandFrame) -> Result<()> {
        let expected = frame.len();
        let written = self
            .device
            .write(frame.as_bytes())
            .map_err(FinchError::TransportWrite)?;
        if written < expected {
            warn!(written, expected, "short write for {}", frame.opcode());
            return Err(FinchError::TransportWrite(HidError::ShortWrite {
                written,
                expected,
            }));
        }
        debug!("sent {} [{frame}]", frame.opcode());
        Ok(())
    }
}
