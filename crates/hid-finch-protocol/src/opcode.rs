//! Command opcodes.
//!
//! Each opcode is a single ASCII character placed in byte 0 of the output
//! report.
//!
//! | Opcode              | Char | Byte   |
//! |---------------------|------|--------|
//! | `SetLed`            | `O`  | `0x4F` |
//! | `SetMotors`         | `M`  | `0x4D` |
//! | `SetBuzzer`         | `B`  | `0x42` |
//! | `ReadTemperature`   | `T`  | `0x54` |
//! | `ReadLight`         | `L`  | `0x4C` |
//! | `ReadAccelerometer` | `A`  | `0x41` |
//! | `ReadObstacle`      | `I`  | `0x49` |
//! | `Stop`              | `X`  | `0x58` |
//! | `ResetToIdle`       | `R`  | `0x52` |
//! | `ConnectivityProbe` | `z`  | `0x7A` |

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    SetLed = b'O',
    SetMotors = b'M',
    SetBuzzer = b'B',
    ReadTemperature = b'T',
    ReadLight = b'L',
    ReadAccelerometer = b'A',
    ReadObstacle = b'I',
    Stop = b'X',
    ResetToIdle = b'R',
    ConnectivityProbe = b'z',
}

impl Opcode {
    pub const ALL: [Opcode; 10] = [
        Opcode::SetLed,
        Opcode::SetMotors,
        Opcode::SetBuzzer,
        Opcode::ReadTemperature,
        Opcode::ReadLight,
        Opcode::ReadAccelerometer,
        Opcode::ReadObstacle,
        Opcode::Stop,
        Opcode::ResetToIdle,
        Opcode::ConnectivityProbe,
    ];

    /// The wire byte for this opcode.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.byte() == byte)
    }

    /// `true` for opcodes the device answers with an input report.
    pub const fn expects_response(self) -> bool {
        matches!(
            self,
            Opcode::ReadTemperature
                | Opcode::ReadLight
                | Opcode::ReadAccelerometer
                | Opcode::ReadObstacle
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Opcode::SetLed => "set-led",
            Opcode::SetMotors => "set-motors",
            Opcode::SetBuzzer => "set-buzzer",
            Opcode::ReadTemperature => "read-temperature",
            Opcode::ReadLight => "read-light",
            Opcode::ReadAccelerometer => "read-accelerometer",
            Opcode::ReadObstacle => "read-obstacle",
            Opcode::Stop => "stop",
            Opcode::ResetToIdle => "reset-to-idle",
            Opcode::ConnectivityProbe => "connectivity-probe",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}')", self.name(), char::from(self.byte()))
    }
}
