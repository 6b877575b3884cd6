//! Pure decoders for LEB128-encoded integers over a byte window.
//!
//! <https://en.wikipedia.org/wiki/LEB128>
//!
//! Each function reads from the start of the given window and reports how
//! many bytes the encoding consumed, so the caller can advance its cursor.
//! Encodings longer than necessary are accepted as long as the surplus bytes
//! are pure sign (or zero) extension; surplus *payload* bits are rejected.

/// Decodes an unsigned 32-bit integer, returning the value and the number of
/// bytes consumed.
///
/// At most 5 bytes are read; on the 5th byte only the low 4 bits may carry
/// payload. Returns `None` when the window ends before a terminating byte or
/// when the value would not fit in 32 bits.
pub fn read_u32_leb128(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;

    // 5 == ceil(32/7)
    for (i, &byte) in bytes.iter().take(5).enumerate() {
        result |= u32::from(byte & 0x7F) << (7 * i);

        let continuation_bit = byte & 0x80;
        if continuation_bit == 0 {
            if i == 4 && (byte & 0xF0) != 0 {
                // 4*7=28 payload bits have been consumed by the first four
                // bytes, leaving room for no more than 32-28=4 bits here.
                return None;
            }
            return Some((result, i + 1));
        }
    }

    None
}

/// Decodes a signed 32-bit integer, returning the value and the number of
/// bytes consumed.
///
/// On the 5th byte, bit 3 is the sign and the top four bits must be its
/// sign-extension; anything else is rejected with `None`, as is a window
/// that ends before a terminating byte.
pub fn read_i32_leb128(bytes: &[u8]) -> Option<(i32, usize)> {
    let mut result: u32 = 0;

    for (i, &byte) in bytes.iter().take(5).enumerate() {
        result |= u32::from(byte & 0x7F) << (7 * i);

        let continuation_bit = byte & 0x80;
        if continuation_bit == 0 {
            if i == 4 {
                let sign_bit_set = (byte & 0x08) != 0;
                let top_bits = byte & 0xF0;
                if (sign_bit_set && top_bits != 0x70) || (!sign_bit_set && top_bits != 0) {
                    return None;
                }
            } else {
                // sign-extend from bit 7*(i+1) - 1
                let shift = 32 - 7 * (i as u32 + 1);
                result = (((result << shift) as i32) >> shift) as u32;
            }
            return Some((result as i32, i + 1));
        }
    }

    None
}

/// The two ways a signed 64-bit LEB128 can fail; they surface as different
/// decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I64LebError {
    /// The 10th byte carried bits that are not a sign-extension of bit 0.
    InvalidSignExtension,
    /// The window ended before a terminating byte.
    PastEnd,
}

/// Decodes a signed 64-bit integer, returning the value and the number of
/// bytes consumed.
///
/// At most 10 bytes are read; on the 10th byte, bit 0 is the sign and bits
/// 1-7 must equal its sign-extension.
pub fn read_i64_leb128(bytes: &[u8]) -> Result<(i64, usize), I64LebError> {
    let mut result: u64 = 0;

    // 10 == ceil(64/7)
    for (i, &byte) in bytes.iter().take(10).enumerate() {
        result |= u64::from(byte & 0x7F) << (7 * i);

        let continuation_bit = byte & 0x80;
        if continuation_bit == 0 {
            if i == 9 {
                let sign_bit_set = (byte & 0x01) != 0;
                let top_bits = byte & 0x7E;
                if (sign_bit_set && top_bits != 0x7E) || (!sign_bit_set && top_bits != 0) {
                    return Err(I64LebError::InvalidSignExtension);
                }
            } else {
                let shift = 64 - 7 * (i as u32 + 1);
                result = (((result << shift) as i64) >> shift) as u64;
            }
            return Ok((result as i64, i + 1));
        }
    }

    Err(I64LebError::PastEnd)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal unsigned LEB128 encoding, for round-trip inputs.
    fn encode_uleb128(value: u32) -> Vec<u8> {
        let mut out = Vec::new();
        let mut rest = value;
        while rest >= 0x80 {
            out.push(rest as u8 | 0x80);
            rest >>= 7;
        }
        out.push(rest as u8);
        out
    }

    /// Minimal signed LEB128 encoding; terminates once the remaining bits
    /// are pure sign extension.
    fn encode_sleb128(value: i64) -> Vec<u8> {
        let mut out = Vec::new();
        let mut rest = value;
        loop {
            let byte = (rest & 0x7F) as u8;
            rest >>= 7;
            let sign_clear = byte & 0x40 == 0;
            if (rest == 0 && sign_clear) || (rest == -1 && !sign_clear) {
                out.push(byte);
                return out;
            }
            out.push(byte | 0x80);
        }
    }

    #[test]
    fn read_u32_decodes_simple_values() {
        for value in [0, 1, 127, 128, 624485, u32::MAX] {
            let bytes = encode_uleb128(value);
            let len = bytes.len();
            assert_eq!(read_u32_leb128(&bytes), Some((value, len)));
        }
    }

    #[test]
    fn read_u32_consumes_only_the_encoding() {
        let mut bytes = encode_uleb128(624485);
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(read_u32_leb128(&bytes), Some((624485, 3)));
    }

    #[test]
    fn read_u32_rejects_payload_bits_in_last_byte() {
        assert_eq!(read_u32_leb128(&[0x80, 0x80, 0x80, 0x80, 0x10]), None);
        assert_eq!(read_u32_leb128(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]), None);
    }

    #[test]
    fn read_u32_accepts_extended_zero() {
        assert_eq!(read_u32_leb128(&[0x80, 0x00]), Some((0, 2)));
    }

    #[test]
    fn read_u32_rejects_empty_and_unterminated_windows() {
        assert_eq!(read_u32_leb128(&[]), None);
        assert_eq!(read_u32_leb128(&[0x80]), None);
        assert_eq!(read_u32_leb128(&[0x80, 0x80, 0x80, 0x80, 0x80]), None);
    }

    #[test]
    fn read_i32_decodes_edge_values() {
        for value in [0, 1, -1, -32, i32::MAX, i32::MIN] {
            let bytes = encode_sleb128(value.into());
            let len = bytes.len();
            assert_eq!(read_i32_leb128(&bytes), Some((value, len)));
        }
    }

    #[test]
    fn read_i32_accepts_extended_negative_one() {
        assert_eq!(read_i32_leb128(&[0xFF, 0x7F]), Some((-1, 2)));
    }

    #[test]
    fn read_i32_rejects_bad_sign_extension_in_last_byte() {
        // i32::MIN is 80 80 80 80 78; flipping a padding bit breaks it.
        assert_eq!(read_i32_leb128(&[0x80, 0x80, 0x80, 0x80, 0x78]), Some((i32::MIN, 5)));
        assert_eq!(read_i32_leb128(&[0x80, 0x80, 0x80, 0x80, 0x58]), None);
        // positive terminator with payload in the top nibble
        assert_eq!(read_i32_leb128(&[0xFF, 0xFF, 0xFF, 0xFF, 0x17]), None);
    }

    #[test]
    fn read_i32_rejects_unterminated_window() {
        assert_eq!(read_i32_leb128(&[0x80, 0x80, 0x80, 0x80, 0x80]), None);
    }

    #[test]
    fn read_i64_decodes_edge_values() {
        for value in [0i64, 1, -1, i64::MAX, i64::MIN] {
            let bytes = encode_sleb128(value);
            let len = bytes.len();
            assert_eq!(read_i64_leb128(&bytes), Ok((value, len)));
        }
    }

    #[test]
    fn read_i64_accepts_extended_zero() {
        assert_eq!(read_i64_leb128(&[0x80, 0x00]), Ok((0, 2)));
    }

    #[test]
    fn read_i64_rejects_incorrect_negative_padding() {
        let mut bytes = encode_sleb128(i64::MIN);
        assert_eq!(bytes.len(), 10);
        *bytes.last_mut().unwrap() &= !0x02; // flip one of the padding bits
        assert_eq!(read_i64_leb128(&bytes), Err(I64LebError::InvalidSignExtension));
    }

    #[test]
    fn read_i64_rejects_incorrect_positive_padding() {
        let mut bytes = vec![0x80; 9];
        bytes.push(0x02);
        assert_eq!(read_i64_leb128(&bytes), Err(I64LebError::InvalidSignExtension));
    }

    #[test]
    fn read_i64_rejects_unterminated_window() {
        assert_eq!(read_i64_leb128(&[0x80; 10]), Err(I64LebError::PastEnd));
        assert_eq!(read_i64_leb128(&[0x80; 3]), Err(I64LebError::PastEnd));
    }

    #[test]
    fn read_i64_accepts_full_length_boundaries() {
        let mut min = vec![0x80; 9];
        min.push(0x7F);
        assert_eq!(read_i64_leb128(&min), Ok((i64::MIN, 10)));

        let mut max = vec![0xFF; 9];
        max.push(0x00);
        assert_eq!(read_i64_leb128(&max), Ok((i64::MAX, 10)));
    }
}
