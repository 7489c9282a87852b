//! Fixed-length command frame construction.
//!
//! # Output report layout (9 bytes)
//! | Offset | Field   | Value                                  |
//! |--------|---------|----------------------------------------|
//! | 0      | opcode  | ASCII tag, see [`Opcode`]              |
//! | 1–8    | payload | opcode-specific, zero-padded to 8 bytes |

use core::fmt;

use crate::opcode::Opcode;

/// Output report length in bytes, opcode included.
pub const FRAME_LEN: usize = 9;

/// Largest payload that fits after the opcode byte.
pub const MAX_PAYLOAD_LEN: usize = FRAME_LEN - 1;

/// Errors returned by [`CommandFrame::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("payload for {opcode} is {len} bytes, frame holds at most {max}")]
    PayloadTooLong {
        opcode: Opcode,
        len: usize,
        max: usize,
    },
}

/// A complete 9-byte output report, ready for transmission.
///
/// The only way to build one is through [`CommandFrame::new`] or
/// [`CommandFrame::bare`], so every value is exactly [`FRAME_LEN`] bytes with
/// unused trailing bytes zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandFrame {
    opcode: Opcode,
    bytes: [u8; FRAME_LEN],
}

impl CommandFrame {
    /// Place `opcode` first, then `payload`, and zero-fill the remainder.
    pub fn new(opcode: Opcode, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLong {
                opcode,
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = opcode.byte();
        for (slot, value) in bytes.iter_mut().skip(1).zip(payload) {
            *slot = *value;
        }
        Ok(Self { opcode, bytes })
    }

    /// A frame carrying only the opcode.
    pub const fn bare(opcode: Opcode) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = opcode.byte();
        Self { opcode, bytes }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Bytes 1–8.
    pub fn payload(&self) -> &[u8] {
        self.bytes.get(1..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<CommandFrame> for [u8; FRAME_LEN] {
    fn from(frame: CommandFrame) -> Self {
        frame.bytes
    }
}

/// Space-separated upper-case hex, e.g. `4F FF 00 00 00 00 00 00 00`.
impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_zero_padded() -> Result<(), FrameError> {
        let frame = CommandFrame::new(Opcode::Stop, &[])?;
        assert_eq!(frame.as_bytes(), &[0x58, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frame, CommandFrame::bare(Opcode::Stop));
        Ok(())
    }

    #[test]
    fn payload_follows_opcode() -> Result<(), FrameError> {
        let frame = CommandFrame::new(Opcode::SetLed, &[1, 2, 3])?;
        assert_eq!(frame.as_bytes(), &[0x4F, 1, 2, 3, 0, 0, 0, 0, 0]);
        assert_eq!(frame.payload(), &[1, 2, 3, 0, 0, 0, 0, 0]);
        assert_eq!(frame.opcode(), Opcode::SetLed);
        Ok(())
    }

    #[test]
    fn full_payload_fits() -> Result<(), FrameError> {
        let frame = CommandFrame::new(Opcode::SetMotors, &[8; MAX_PAYLOAD_LEN])?;
        assert_eq!(frame.as_bytes(), &[0x4D, 8, 8, 8, 8, 8, 8, 8, 8]);
        Ok(())
    }

    #[test]
    fn oversized_payload_rejected() {
        let err = CommandFrame::new(Opcode::SetBuzzer, &[0; 9]);
        assert_eq!(
            err,
            Err(FrameError::PayloadTooLong {
                opcode: Opcode::SetBuzzer,
                len: 9,
                max: 8,
            })
        );
    }

    #[test]
    fn length_is_always_nine() -> Result<(), FrameError> {
        for len in 0..=MAX_PAYLOAD_LEN {
            let payload = vec![0xAA; len];
            let frame = CommandFrame::new(Opcode::SetLed, &payload)?;
            assert_eq!(frame.len(), FRAME_LEN);
            assert_eq!(frame.as_ref().len(), FRAME_LEN);
        }
        Ok(())
    }

    #[test]
    fn display_is_hex() {
        let frame = CommandFrame::bare(Opcode::ResetToIdle);
        assert_eq!(frame.to_string(), "52 00 00 00 00 00 00 00 00");
    }
}
