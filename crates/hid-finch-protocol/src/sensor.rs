//! Sensor request kinds and input report decoding.
//!
//! # Input report layout (9 bytes)
//!
//! Only the temperature layout is documented: byte 0 carries the raw reading
//! and the rest is unused.
//!
//! | Sensor        | Decoding                                   |
//! |---------------|--------------------------------------------|
//! | temperature   | `°C = (byte0 − 127) / 2.4 + 25.0`          |
//! | light         | raw bytes (layout unconfirmed)             |
//! | accelerometer | raw bytes (layout unconfirmed)             |
//! | obstacle      | raw bytes (layout unconfirmed)             |
//!
//! ⚠ **Unverified.** No hardware documentation for the light, accelerometer,
//! and obstacle reports was available, so they are handed to the caller
//! untouched rather than decoded against a guessed layout.

use core::fmt;

use crate::opcode::Opcode;

/// Input report length in bytes.
pub const INPUT_REPORT_LEN: usize = 9;

/// Raw temperature value that corresponds to [`TEMPERATURE_REFERENCE_C`].
pub const TEMPERATURE_RAW_REFERENCE: f64 = 127.0;

/// Raw counts per degree Celsius.
pub const TEMPERATURE_COUNTS_PER_DEGREE: f64 = 2.4;

pub const TEMPERATURE_REFERENCE_C: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Temperature,
    Light,
    Accelerometer,
    Obstacle,
}

impl SensorKind {
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Temperature,
        SensorKind::Light,
        SensorKind::Accelerometer,
        SensorKind::Obstacle,
    ];

    /// Opcode of the request frame that asks for this reading.
    pub const fn request_opcode(self) -> Opcode {
        match self {
            SensorKind::Temperature => Opcode::ReadTemperature,
            SensorKind::Light => Opcode::ReadLight,
            SensorKind::Accelerometer => Opcode::ReadAccelerometer,
            SensorKind::Obstacle => Opcode::ReadObstacle,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Light => "light",
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Obstacle => "obstacle",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors returned when an input report cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input report")]
    Empty,
}

/// Undecoded input report bytes, at most [`INPUT_REPORT_LEN`] long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawPayload {
    bytes: [u8; INPUT_REPORT_LEN],
    len: usize,
}

impl RawPayload {
    /// Copy up to [`INPUT_REPORT_LEN`] bytes out of `report`.
    ///
    /// Backends that read into a larger buffer may hand over extra trailing
    /// bytes; those are dropped.
    pub fn from_report(report: &[u8]) -> Result<Self, ParseError> {
        if report.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut bytes = [0u8; INPUT_REPORT_LEN];
        let mut len = 0;
        for (slot, value) in bytes.iter_mut().zip(report) {
            *slot = *value;
            len += 1;
        }
        Ok(Self { bytes, len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.get(..self.len).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for RawPayload {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// A decoded answer to a sensor request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Temperature { celsius: f64, raw: u8 },
    Light(RawPayload),
    Accelerometer(RawPayload),
    Obstacle(RawPayload),
}

impl SensorReading {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Temperature { .. } => SensorKind::Temperature,
            SensorReading::Light(_) => SensorKind::Light,
            SensorReading::Accelerometer(_) => SensorKind::Accelerometer,
            SensorReading::Obstacle(_) => SensorKind::Obstacle,
        }
    }

    pub fn celsius(&self) -> Option<f64> {
        match self {
            SensorReading::Temperature { celsius, .. } => Some(*celsius),
            _ => None,
        }
    }

    pub fn raw_payload(&self) -> Option<&RawPayload> {
        match self {
            SensorReading::Temperature { .. } => None,
            SensorReading::Light(raw)
            | SensorReading::Accelerometer(raw)
            | SensorReading::Obstacle(raw) => Some(raw),
        }
    }
}

/// Convert a raw temperature byte to degrees Celsius.
pub fn decode_temperature(raw: u8) -> f64 {
    (f64::from(raw) - TEMPERATURE_RAW_REFERENCE) / TEMPERATURE_COUNTS_PER_DEGREE
        + TEMPERATURE_REFERENCE_C
}

/// Decode byte 0 of a temperature input report.
pub fn parse_temperature(report: &[u8]) -> Result<f64, ParseError> {
    report
        .first()
        .copied()
        .map(decode_temperature)
        .ok_or(ParseError::Empty)
}

/// Decode an input report received in answer to a `kind` request.
pub fn decode(kind: SensorKind, report: &[u8]) -> Result<SensorReading, ParseError> {
    match kind {
        SensorKind::Temperature => {
            let raw = report.first().copied().ok_or(ParseError::Empty)?;
            Ok(SensorReading::Temperature {
                celsius: decode_temperature(raw),
                raw,
            })
        }
        SensorKind::Light => RawPayload::from_report(report).map(SensorReading::Light),
        SensorKind::Accelerometer => {
            RawPayload::from_report(report).map(SensorReading::Accelerometer)
        }
        SensorKind::Obstacle => RawPayload::from_report(report).map(SensorReading::Obstacle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_reference_point() {
        assert!((decode_temperature(127) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn temperature_extremes() {
        let cold = decode_temperature(0);
        assert!((cold - (-27.916_666_666_666_664)).abs() < 1e-9, "{cold}");
        let hot = decode_temperature(255);
        assert!((hot - (128.0 / 2.4 + 25.0)).abs() < 1e-9, "{hot}");
    }

    #[test]
    fn temperature_from_report() -> Result<(), ParseError> {
        let report = [151u8, 1, 2, 3, 4, 5, 6, 7, 8];
        assert!((parse_temperature(&report)? - 35.0).abs() < 1e-9);
        assert_eq!(parse_temperature(&[]), Err(ParseError::Empty));
        Ok(())
    }

    #[test]
    fn decode_keeps_raw_payloads() -> Result<(), ParseError> {
        let report = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
        for kind in [SensorKind::Light, SensorKind::Accelerometer, SensorKind::Obstacle] {
            let reading = decode(kind, &report)?;
            assert_eq!(reading.kind(), kind);
            assert_eq!(reading.celsius(), None);
            let raw = reading.raw_payload().map(RawPayload::as_bytes);
            assert_eq!(raw, Some(&report[..]));
        }
        Ok(())
    }

    #[test]
    fn raw_payload_truncates_long_reports() -> Result<(), ParseError> {
        let report = [0xEEu8; 64];
        let raw = RawPayload::from_report(&report)?;
        assert_eq!(raw.len(), INPUT_REPORT_LEN);
        assert_eq!(raw.as_bytes(), &[0xEE; INPUT_REPORT_LEN]);
        Ok(())
    }

    #[test]
    fn raw_payload_keeps_short_reports() -> Result<(), ParseError> {
        let raw = RawPayload::from_report(&[7, 8])?;
        assert_eq!(raw.as_bytes(), &[7, 8]);
        assert!(!raw.is_empty());
        Ok(())
    }

    #[test]
    fn empty_reports_rejected() {
        for kind in SensorKind::ALL {
            assert_eq!(decode(kind, &[]), Err(ParseError::Empty));
        }
    }

    #[test]
    fn decode_temperature_reading() -> Result<(), ParseError> {
        let reading = decode(SensorKind::Temperature, &[127, 0, 0, 0, 0, 0, 0, 0, 0])?;
        assert_eq!(reading.kind(), SensorKind::Temperature);
        assert!(matches!(reading, SensorReading::Temperature { raw: 127, .. }));
        assert!(reading.celsius().is_some_and(|c| (c - 25.0).abs() < 1e-12));
        Ok(())
    }

    #[test]
    fn request_opcodes() {
        assert_eq!(SensorKind::Temperature.request_opcode(), Opcode::ReadTemperature);
        assert_eq!(SensorKind::Light.request_opcode(), Opcode::ReadLight);
        assert_eq!(SensorKind::Accelerometer.request_opcode(), Opcode::ReadAccelerometer);
        assert_eq!(SensorKind::Obstacle.request_opcode(), Opcode::ReadObstacle);
    }
}
