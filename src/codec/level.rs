//! Level and delay encodings.
//!
//! Signed values use sign-and-magnitude: the high bit marks a negative value
//! and the low bits hold the magnitude in steps.

/// Sign bit for negative levels.
const NEGATIVE: u8 = 0x80;

/// Largest tone/balance offset in dB.
pub const MAX_SIGNED: i8 = 12;

/// Largest subwoofer trim in dB.
pub const MAX_HALF_DB: f32 = 10.0;

/// Largest lipsync delay in milliseconds.
pub const MAX_LIPSYNC_MS: u16 = 250;

/// Lipsync delay step in milliseconds.
pub const LIPSYNC_STEP_MS: u16 = 5;

/// Largest volume step.
pub const MAX_VOLUME: u8 = 99;

/// Encode a signed whole-dB offset (bass, treble, balance).
///
/// Values outside `-12..=12` are clamped.
pub fn encode_signed(value: i8) -> u8 {
    let value = value.clamp(-MAX_SIGNED, MAX_SIGNED);
    if value < 0 {
        NEGATIVE | value.unsigned_abs()
    } else {
        value as u8
    }
}

/// Decode a signed whole-dB offset.
pub fn decode_signed(byte: u8) -> i8 {
    let magnitude = (byte & !NEGATIVE) as i8;
    if byte & NEGATIVE != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Encode a half-dB trim (subwoofer trim).
///
/// The value is rounded to the nearest 0.5 dB and clamped to `-10.0..=10.0`.
pub fn encode_half_db(db: f32) -> u8 {
    let steps = (db.clamp(-MAX_HALF_DB, MAX_HALF_DB) * 2.0).round() as i8;
    if steps < 0 {
        NEGATIVE | steps.unsigned_abs()
    } else {
        steps as u8
    }
}

/// Decode a half-dB trim.
pub fn decode_half_db(byte: u8) -> f32 {
    let db = (byte & !NEGATIVE) as f32 / 2.0;
    if byte & NEGATIVE != 0 {
        -db
    } else {
        db
    }
}

/// Encode a lipsync delay in milliseconds, rounded down to 5 ms steps.
pub fn encode_lipsync(ms: u16) -> u8 {
    (ms.min(MAX_LIPSYNC_MS) / LIPSYNC_STEP_MS) as u8
}

/// Decode a lipsync delay to milliseconds.
pub fn decode_lipsync(byte: u8) -> u16 {
    byte as u16 * LIPSYNC_STEP_MS
}

/// Encode a volume step, clamped to `0..=99`.
pub fn encode_volume(volume: u8) -> u8 {
    volume.min(MAX_VOLUME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_positive() {
        assert_eq!(encode_signed(0), 0x00);
        assert_eq!(encode_signed(5), 0x05);
        assert_eq!(encode_signed(12), 0x0C);
        assert_eq!(decode_signed(0x0C), 12);
    }

    #[test]
    fn test_signed_negative() {
        assert_eq!(encode_signed(-1), 0x81);
        assert_eq!(encode_signed(-12), 0x8C);
        assert_eq!(decode_signed(0x81), -1);
        assert_eq!(decode_signed(0x8C), -12);
    }

    #[test]
    fn test_signed_clamps() {
        assert_eq!(encode_signed(40), 0x0C);
        assert_eq!(encode_signed(i8::MIN), 0x8C);
    }

    #[test]
    fn test_half_db() {
        assert_eq!(encode_half_db(0.0), 0x00);
        assert_eq!(encode_half_db(0.5), 0x01);
        assert_eq!(encode_half_db(10.0), 0x14);
        assert_eq!(encode_half_db(-0.5), 0x81);
        assert_eq!(encode_half_db(-10.0), 0x94);
        assert_eq!(decode_half_db(0x14), 10.0);
        assert_eq!(decode_half_db(0x83), -1.5);
    }

    #[test]
    fn test_half_db_rounds_and_clamps() {
        assert_eq!(encode_half_db(1.3), 0x03);
        assert_eq!(encode_half_db(25.0), 0x14);
        assert_eq!(encode_half_db(-25.0), 0x94);
    }

    #[test]
    fn test_lipsync() {
        assert_eq!(encode_lipsync(0), 0x00);
        assert_eq!(encode_lipsync(5), 0x01);
        assert_eq!(encode_lipsync(12), 0x02);
        assert_eq!(encode_lipsync(250), 0x32);
        assert_eq!(encode_lipsync(1000), 0x32);
        assert_eq!(decode_lipsync(0x32), 250);
    }

    #[test]
    fn test_volume_clamps() {
        assert_eq!(encode_volume(50), 50);
        assert_eq!(encode_volume(120), 99);
    }
}
