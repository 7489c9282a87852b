//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use finch::hid::HidDeviceInfo;
use finch::{Command, SensorReading};
use serde_json::{Value, json};

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "causes": chain,
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

pub fn print_device_list(devices: &[HidDeviceInfo], json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "devices": devices,
        }));
        return;
    }

    if devices.is_empty() {
        println!("{}", "No devices found".yellow());
        return;
    }

    println!("{}", "Attached Devices:".bold());
    for device in devices {
        println!("  {}", format_device(device));
    }
}

fn format_device(device: &HidDeviceInfo) -> String {
    let mut line = format!(
        "{:04x}:{:04x} {} ({})",
        device.vendor_id,
        device.product_id,
        device.display_name(),
        device.path
    );
    if let Some(serial) = &device.serial_number {
        line.push_str(&format!(" serial={serial}"));
    }
    line
}

/// Report a completed command: the reading for sensor requests, otherwise
/// the frame that was sent.
pub fn print_outcome(
    command: &Command,
    reading: Option<&SensorReading>,
    device: &HidDeviceInfo,
    json: bool,
) {
    if json {
        let mut output = json!({
            "success": true,
            "command": command.opcode().name(),
            "device": device.path,
        });
        if let (Some(reading), Some(fields)) = (reading, output.as_object_mut()) {
            fields.insert("reading".to_string(), reading_json(reading));
        }
        print_json(&output);
        return;
    }

    match reading {
        Some(reading) => println!("{}", format_reading(reading)),
        None => println!(
            "{} {} sent to {}",
            "✓".green(),
            command.opcode().name().bold(),
            device.display_name()
        ),
    }
}

fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_reading(reading: &SensorReading) -> String {
    match reading {
        SensorReading::Temperature { celsius, raw } => {
            format!("Temperature: {celsius:.2} °C (raw {raw})")
        }
        SensorReading::Light(payload) => format!("Light: {}", format_hex(payload.as_bytes())),
        SensorReading::Accelerometer(payload) => {
            format!("Accelerometer: {}", format_hex(payload.as_bytes()))
        }
        SensorReading::Obstacle(payload) => {
            format!("Obstacle: {}", format_hex(payload.as_bytes()))
        }
    }
}

pub fn reading_json(reading: &SensorReading) -> Value {
    let sensor = reading.kind().name();
    match reading {
        SensorReading::Temperature { celsius, raw } => json!({
            "sensor": sensor,
            "celsius": celsius,
            "raw": raw,
        }),
        SensorReading::Light(payload)
        | SensorReading::Accelerometer(payload)
        | SensorReading::Obstacle(payload) => json!({
            "sensor": sensor,
            "raw": payload.as_bytes(),
        }),
    }
}
