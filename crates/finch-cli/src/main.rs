//! finchctl - Finch robot control CLI
//!
//! Drives a USB-attached Finch from the shell: set the LED, run the motors,
//! sound the buzzer, and read sensors. Use `--json` for machine-readable
//! output.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use finch::hid::{HidApiPort, HidPort};
use finch::protocol::{BuzzerCommand, LedColor, MotorCommand, parse_id};
use finch::{Command, Finch, FinchConfig, FinchError, SensorKind};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "finchctl")]
#[command(about = "Finch robot control CLI - LED, motors, buzzer, and sensors over USB HID")]
#[command(version)]
#[command(long_about = "
finchctl talks to a Finch robot attached over USB. Arguments are range-checked
before anything is sent, so an invalid value never reaches the robot.

The FINCH_VENDOR_ID, FINCH_PRODUCT_ID and FINCH_READ_TIMEOUT_MS environment
variables set defaults; --vid, --pid and --timeout-ms override them.
Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Sensor response timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// USB vendor id, hex (0x2354) or decimal (9044)
    #[arg(long, global = true, value_parser = parse_id)]
    vid: Option<u16>,

    /// USB product id, hex (0x1111) or decimal (4369)
    #[arg(long, global = true, value_parser = parse_id)]
    pid: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached HID devices
    List {
        /// Show every HID device, not only Finches
        #[arg(long)]
        all: bool,
    },

    /// Set the beak LED colour (each channel 0-255)
    #[command(allow_negative_numbers = true)]
    Led { red: i32, green: i32, blue: i32 },

    /// Set both motors (direction 0=forward 1=backward, speed 0-255)
    #[command(allow_negative_numbers = true)]
    Drive {
        left_direction: i32,
        left_speed: i32,
        right_direction: i32,
        right_speed: i32,
    },

    /// Sound the buzzer (duration and frequency 0-65535)
    #[command(allow_negative_numbers = true)]
    Buzz { duration_ms: i32, frequency_hz: i32 },

    /// Return to idle colour cycling
    Idle,

    /// Stop the motors and turn the LED off
    Stop,

    /// Send the connectivity test frame
    Probe,

    /// Read one sensor
    Read {
        #[arg(value_enum)]
        sensor: SensorArg,
    },

    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SensorArg {
    Temperature,
    Light,
    Accelerometer,
    Obstacle,
}

impl From<SensorArg> for SensorKind {
    fn from(arg: SensorArg) -> Self {
        match arg {
            SensorArg::Temperature => SensorKind::Temperature,
            SensorArg::Light => SensorKind::Light,
            SensorArg::Accelerometer => SensorKind::Accelerometer,
            SensorArg::Obstacle => SensorKind::Obstacle,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("finchctl={log_level},finch={log_level},finch_hid_common={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<FinchError>() {
        Some(FinchError::DeviceNotFound { .. }) => 2,
        Some(FinchError::InvalidArgument(_)) | Some(FinchError::Config(_)) => 4,
        _ => 1,
    }
}

/// Environment defaults with command-line overrides applied on top.
fn resolve_config(cli: &Cli) -> Result<FinchConfig, FinchError> {
    let mut config = FinchConfig::from_env()?;
    if let Some(vendor_id) = cli.vid {
        config.identity.vendor_id = vendor_id;
    }
    if let Some(product_id) = cli.pid {
        config.identity.product_id = product_id;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.read_timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

/// Validate a device command's arguments. `None` for commands that do not
/// talk to the robot.
fn robot_command(command: &Commands) -> Result<Option<Command>, FinchError> {
    let command = match *command {
        Commands::Led { red, green, blue } => {
            Command::SetLed(LedColor::try_new(red, green, blue)?)
        }
        Commands::Drive {
            left_direction,
            left_speed,
            right_direction,
            right_speed,
        } => Command::Drive(MotorCommand::try_new(
            left_direction,
            left_speed,
            right_direction,
            right_speed,
        )?),
        Commands::Buzz {
            duration_ms,
            frequency_hz,
        } => Command::Buzz(BuzzerCommand::try_new(duration_ms, frequency_hz)?),
        Commands::Idle => Command::Idle,
        Commands::Stop => Command::Stop,
        Commands::Probe => Command::ConnectivityProbe,
        Commands::Read { sensor } => Command::Read(sensor.into()),
        Commands::List { .. } | Commands::Completion { .. } => return Ok(None),
    };
    Ok(Some(command))
}

async fn execute_command(cli: &Cli) -> Result<()> {
    if let Commands::Completion { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "finchctl", &mut std::io::stdout());
        return Ok(());
    }

    let command = robot_command(&cli.command)?;
    let config = resolve_config(cli)?;
    debug!(?config, "resolved configuration");

    let port = HidApiPort::new()
        .map_err(FinchError::Connection)
        .context("HID backend unavailable")?;

    let Some(command) = command else {
        let all = matches!(cli.command, Commands::List { all: true });
        let devices = if all {
            port.list_devices().await.map_err(FinchError::Enumeration)?
        } else {
            finch::find_all(&port, config.identity).await?
        };
        output::print_device_list(&devices, cli.json);
        return Ok(());
    };

    let mut finch = Finch::connect_with(&port, config).await?;
    let reading = finch
        .execute(&command)
        .await
        .with_context(|| format!("{} failed", command.opcode().name()))?;
    output::print_outcome(&command, reading.as_ref(), finch.device_info(), cli.json);
    finch.close()?;
    Ok(())
}
