//! Property-based tests for Finch command encoding and validation.
//!
//! Covers byte placement for every payload-carrying command, rejection of
//! out-of-range arguments, the fixed frame length, and the temperature curve.

use finch_hid_protocol::{
    BuzzerCommand, CommandFrame, FRAME_LEN, LedColor, MAX_PAYLOAD_LEN, MotorCommand, Opcode,
    decode_temperature,
};
use proptest::prelude::*;

fn any_opcode() -> impl Strategy<Value = Opcode> {
    prop::sample::select(Opcode::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any in-range colour lands in bytes 1–3 with the tail zeroed.
    #[test]
    fn prop_led_layout(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let frame = LedColor::try_new(i32::from(r), i32::from(g), i32::from(b))
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .encode()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let expected = [0x4F, r, g, b, 0, 0, 0, 0, 0];
        prop_assert_eq!(frame.as_bytes(), &expected);
    }

    /// A channel outside 0..=255 is always rejected, never clamped.
    #[test]
    fn prop_led_rejects_out_of_range(
        bad in prop_oneof![i32::MIN..0i32, 256i32..=i32::MAX],
        slot in 0usize..3,
    ) {
        let mut channels = [0i32; 3];
        if let Some(channel) = channels.get_mut(slot) {
            *channel = bad;
        }
        let [r, g, b] = channels;
        prop_assert!(LedColor::try_new(r, g, b).is_err());
    }

    /// Motor arguments are copied verbatim in left/right order.
    #[test]
    fn prop_motor_layout(
        ld in 0u8..=1,
        ls in any::<u8>(),
        rd in 0u8..=1,
        rs in any::<u8>(),
    ) {
        let frame =
            MotorCommand::try_new(i32::from(ld), i32::from(ls), i32::from(rd), i32::from(rs))
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .encode()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let expected = [0x4D, ld, ls, rd, rs, 0, 0, 0, 0];
        prop_assert_eq!(frame.as_bytes(), &expected);
    }

    /// Direction flags other than 0 and 1 are rejected.
    #[test]
    fn prop_motor_rejects_bad_direction(dir in prop_oneof![i32::MIN..0i32, 2i32..=i32::MAX]) {
        prop_assert!(MotorCommand::try_new(dir, 0, 0, 0).is_err());
        prop_assert!(MotorCommand::try_new(0, 0, dir, 0).is_err());
    }

    /// Buzzer fields split big-endian and reassemble to the inputs.
    #[test]
    fn prop_buzzer_big_endian(duration in 0i32..=65_535, frequency in 0i32..=65_535) {
        let frame = BuzzerCommand::try_new(duration, frequency)
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .encode()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let [op, d_hi, d_lo, f_hi, f_lo, tail @ ..] = *frame.as_bytes();
        prop_assert_eq!(op, 0x42);
        prop_assert_eq!(i32::from(u16::from_be_bytes([d_hi, d_lo])), duration);
        prop_assert_eq!(i32::from(u16::from_be_bytes([f_hi, f_lo])), frequency);
        prop_assert_eq!(tail, [0u8; 4]);
    }

    /// Values that do not fit in 16 bits unsigned are rejected.
    #[test]
    fn prop_buzzer_rejects_out_of_range(bad in prop_oneof![i32::MIN..0i32, 65_536i32..=i32::MAX]) {
        prop_assert!(BuzzerCommand::try_new(bad, 0).is_err());
        prop_assert!(BuzzerCommand::try_new(0, bad).is_err());
    }

    /// Any payload up to 8 bytes yields exactly 9 bytes, opcode first,
    /// payload next, zeros after.
    #[test]
    fn prop_frame_always_nine_bytes(
        opcode in any_opcode(),
        payload in prop::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_LEN),
    ) {
        let frame = CommandFrame::new(opcode, &payload)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(frame.as_bytes().len(), FRAME_LEN);
        prop_assert_eq!(frame.as_bytes().first().copied(), Some(opcode.byte()));
        let (head, tail) = frame.payload().split_at(payload.len());
        prop_assert_eq!(head, payload.as_slice());
        prop_assert!(tail.iter().all(|b| *b == 0));
    }

    /// Payloads longer than 8 bytes never produce a frame.
    #[test]
    fn prop_oversized_payload_rejected(
        opcode in any_opcode(),
        payload in prop::collection::vec(any::<u8>(), (MAX_PAYLOAD_LEN + 1)..32),
    ) {
        prop_assert!(CommandFrame::new(opcode, &payload).is_err());
    }

    /// Temperature rises monotonically with the raw byte at 1/2.4 °C per count.
    #[test]
    fn prop_temperature_linear(raw in 0u8..255) {
        let step = decode_temperature(raw + 1) - decode_temperature(raw);
        prop_assert!((step - 1.0 / 2.4).abs() < 1e-9, "step {step}");
    }
}
