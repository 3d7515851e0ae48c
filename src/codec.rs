//! Stateless conversions between hex strings, binary strings, bytes, ASCII
//! text and integers.
//!
//! Hex output is always uppercase. Every function either succeeds or returns a
//! typed error; none of them signal failure with an empty string.

use crate::error::{Result, StegError};

/// Normalise and decode a hex string.
///
/// Whitespace is stripped and an odd-length string is left-padded with `'0'`.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>> {
    let mut digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 == 1 {
        digits.insert(0, '0');
    }
    hex::decode(&digits).map_err(|e| StegError::InvalidHex(format!("{:?}: {}", s, e)))
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Hex rendering of `bytes[offset..offset + length]`
pub fn bytes_to_hex_range(bytes: &[u8], offset: usize, length: usize) -> Result<String> {
    Ok(bytes_to_hex(slice_range(bytes, offset, length)?))
}

fn slice_range(bytes: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
    offset
        .checked_add(length)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(StegError::Range {
            offset,
            length,
            len: bytes.len(),
        })
}

/// Each hex digit becomes four binary digits
pub fn hex_to_binary_string(hex: &str, reverse: bool) -> Result<String> {
    let mut bin = String::with_capacity(hex.len() * 4);
    for c in hex.chars() {
        let nibble = c
            .to_digit(16)
            .ok_or_else(|| StegError::InvalidHex(hex.to_string()))?;
        bin.push_str(&format!("{:04b}", nibble));
    }
    Ok(if reverse { reverse_str(&bin) } else { bin })
}

pub fn reverse_str(s: &str) -> String {
    s.chars().rev().collect()
}

/// Binary rendering of `value`, left-padded with zeros to `pad` digits when
/// `pad > 0`.
pub fn int_to_binary_string(value: u64, pad: usize, reverse: bool) -> Result<String> {
    let mut bin = format!("{:b}", value);
    if pad > 0 {
        if bin.len() > pad {
            return Err(StegError::PaddingOverflow {
                len: bin.len(),
                pad,
            });
        }
        bin = format!("{:0>width$}", bin, width = pad);
    }
    Ok(if reverse { reverse_str(&bin) } else { bin })
}

/// Left-pad to a multiple of 8 and render each group of eight as a hex byte
pub fn binary_string_to_hex(bits: &str) -> Result<String> {
    if let Some(bad) = bits.chars().find(|c| *c != '0' && *c != '1') {
        return Err(StegError::InvalidBinary(format!(
            "unexpected {:?} in {:?}",
            bad, bits
        )));
    }

    let padded_len = bits.len().div_ceil(8) * 8;
    let padded = format!("{:0>width$}", bits, width = padded_len);

    let bytes: Vec<u8> = padded
        .as_bytes()
        .chunks(8)
        .map(|group| group.iter().fold(0u8, |acc, b| (acc << 1) | (b - b'0')))
        .collect();
    Ok(bytes_to_hex(&bytes))
}

/// One byte per character; anything outside 7-bit ASCII becomes `'?'`
pub fn ascii_to_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

pub fn str_to_hex(s: &str) -> String {
    bytes_to_hex(&ascii_to_bytes(s))
}

/// Decode hex pairs into characters; a trailing unpaired digit is ignored
pub fn hex_to_ascii(hex: &str) -> Result<String> {
    let paired = hex.len() - hex.len() % 2;
    let bytes = hex::decode(&hex.as_bytes()[..paired])
        .map_err(|e| StegError::InvalidHex(format!("{:?}: {}", hex, e)))?;
    Ok(bytes.into_iter().map(char::from).collect())
}

pub fn bytes_to_ascii(bytes: &[u8], offset: usize, length: usize) -> Result<String> {
    Ok(slice_range(bytes, offset, length)?
        .iter()
        .map(|&b| char::from(b))
        .collect())
}

/// Render bytes as text, one character per byte, dropping NUL bytes
pub fn bytes_to_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

/// Parse one byte from at most two hex digits (no `0x` prefix)
pub fn hex_to_byte(s: &str) -> Result<u8> {
    check_hex_digits(s)?;
    u8::from_str_radix(s, 16).map_err(|_| StegError::InvalidHex(s.to_string()))
}

/// Parse up to eight hex digits (no `0x` prefix)
pub fn hex_to_int(s: &str) -> Result<u32> {
    check_hex_digits(s)?;
    u32::from_str_radix(s, 16).map_err(|_| StegError::InvalidHex(s.to_string()))
}

// from_str_radix tolerates a leading sign
fn check_hex_digits(s: &str) -> Result<()> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StegError::InvalidHex(s.to_string()));
    }
    Ok(())
}

/// Big-endian integer from at most eight bytes
pub fn bytes_to_long(bytes: &[u8]) -> Result<u64> {
    if bytes.len() > 8 {
        return Err(StegError::Width {
            value: bytes.len() as u64,
            width: 64,
        });
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

pub fn bytes_to_long_range(bytes: &[u8], offset: usize, length: usize) -> Result<u64> {
    bytes_to_long(slice_range(bytes, offset, length)?)
}

/// Big-endian rendering of `value` in exactly `count` bytes
pub fn int_to_bytes(value: u64, count: usize) -> Result<Vec<u8>> {
    if count < 8 && value >> (count * 8) != 0 {
        return Err(StegError::Width {
            value,
            width: count * 8,
        });
    }
    let be = value.to_be_bytes();
    let mut out = vec![0u8; count.saturating_sub(8)];
    out.extend_from_slice(&be[8usize.saturating_sub(count)..]);
    Ok(out)
}

/// Swap each adjacent nibble pair: `"A0B1"` becomes `"0A1B"`.
///
/// A final unpaired nibble `x` becomes `"Fx"`. With `strip_padding`, trailing
/// `'F'` nibbles are removed from the result.
pub fn nibble_swap(hex: &str, strip_padding: bool) -> String {
    let chars: Vec<char> = hex.chars().collect();
    let mut out = String::with_capacity(chars.len() + 1);

    let mut pairs = chars.chunks_exact(2);
    for pair in pairs.by_ref() {
        out.push(pair[1]);
        out.push(pair[0]);
    }
    if let [last] = pairs.remainder() {
        out.push('F');
        out.push(*last);
    }

    if strip_padding {
        let kept = out.trim_end_matches('F').len();
        out.truncate(kept);
    }
    out
}

/// Bit-reverse either the whole byte stream or each byte on its own
pub fn binary_reverse(bytes: &[u8], whole: bool) -> Vec<u8> {
    if whole {
        bytes.iter().rev().map(|b| b.reverse_bits()).collect()
    } else {
        bytes.iter().map(|b| b.reverse_bits()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_bytes_normalises() {
        assert_eq!(hex_to_bytes("0A ff\r\n10").unwrap(), vec![0x0A, 0xFF, 0x10]);
        assert_eq!(hex_to_bytes("ABC").unwrap(), vec![0x0A, 0xBC]);
        assert!(hex_to_bytes("").unwrap().is_empty());
    }

    #[test]
    fn test_hex_to_bytes_rejects_garbage() {
        assert!(matches!(hex_to_bytes("0G"), Err(StegError::InvalidHex(_))));
        assert!(matches!(hex_to_bytes("0x12"), Err(StegError::InvalidHex(_))));
    }

    #[test]
    fn test_bytes_to_hex() {
        assert_eq!(bytes_to_hex(&[0xDE, 0xAD, 0x01]), "DEAD01");
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn test_bytes_to_hex_range() {
        let data = [0x00, 0x11, 0x22, 0x33];
        assert_eq!(bytes_to_hex_range(&data, 1, 2).unwrap(), "1122");
        assert_eq!(bytes_to_hex_range(&data, 4, 0).unwrap(), "");
        assert!(matches!(
            bytes_to_hex_range(&data, 3, 2),
            Err(StegError::Range {
                offset: 3,
                length: 2,
                len: 4
            })
        ));
        assert!(bytes_to_hex_range(&data, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_hex_to_binary_string() {
        assert_eq!(hex_to_binary_string("A1", false).unwrap(), "10100001");
        assert_eq!(hex_to_binary_string("A1", true).unwrap(), "10000101");
        assert!(hex_to_binary_string("Z", false).is_err());
    }

    #[test]
    fn test_int_to_binary_string() {
        assert_eq!(int_to_binary_string(5, 0, false).unwrap(), "101");
        assert_eq!(int_to_binary_string(5, 8, false).unwrap(), "00000101");
        assert_eq!(int_to_binary_string(6, 4, true).unwrap(), "0110");
        assert_eq!(int_to_binary_string(0, 0, false).unwrap(), "0");
        assert!(matches!(
            int_to_binary_string(256, 8, false),
            Err(StegError::PaddingOverflow { len: 9, pad: 8 })
        ));
    }

    #[test]
    fn test_binary_string_to_hex() {
        assert_eq!(binary_string_to_hex("101").unwrap(), "05");
        assert_eq!(binary_string_to_hex("111111110").unwrap(), "01FE");
        assert_eq!(binary_string_to_hex("").unwrap(), "");
        assert!(matches!(
            binary_string_to_hex("10a1"),
            Err(StegError::InvalidBinary(_))
        ));
    }

    #[test]
    fn test_ascii_conversions() {
        assert_eq!(ascii_to_bytes("Hi!"), b"Hi!".to_vec());
        assert_eq!(ascii_to_bytes("né"), b"n?".to_vec());
        assert_eq!(str_to_hex("HELLO"), "48454C4C4F");
        assert_eq!(hex_to_ascii("48454C4C4F").unwrap(), "HELLO");
        assert!(hex_to_ascii("4G").is_err());
        assert_eq!(bytes_to_ascii(b"xHELLOx", 1, 5).unwrap(), "HELLO");
        assert!(bytes_to_ascii(b"abc", 2, 5).is_err());
    }

    #[test]
    fn test_bytes_to_string_drops_nul() {
        assert_eq!(bytes_to_string(b"A\0B\0\0"), "AB");
        assert_eq!(bytes_to_string(&[]), "");
    }

    #[test]
    fn test_hex_scalars() {
        assert_eq!(hex_to_byte("ff").unwrap(), 0xFF);
        assert!(hex_to_byte("100").is_err());
        assert_eq!(hex_to_int("DEADBEEF").unwrap(), 0xDEAD_BEEF);
        assert!(hex_to_int("1DEADBEEF").is_err());
    }

    #[test]
    fn test_hex_scalars_reject_sign() {
        assert!(matches!(hex_to_byte("+F"), Err(StegError::InvalidHex(_))));
        assert!(matches!(hex_to_int("+1"), Err(StegError::InvalidHex(_))));
        assert!(matches!(hex_to_int("-1"), Err(StegError::InvalidHex(_))));
        assert!(matches!(hex_to_ascii("+A41"), Err(StegError::InvalidHex(_))));
        assert!(hex_to_byte("").is_err());
        assert_eq!(hex_to_ascii("414").unwrap(), "A");
    }

    #[test]
    fn test_bytes_to_long() {
        assert_eq!(bytes_to_long(&[0x01, 0x00]).unwrap(), 256);
        assert_eq!(bytes_to_long(&[]).unwrap(), 0);
        assert!(bytes_to_long(&[0; 9]).is_err());
        assert_eq!(bytes_to_long_range(&[9, 0x12, 0x34, 9], 1, 2).unwrap(), 0x1234);
        assert!(bytes_to_long_range(&[1, 2], 1, 2).is_err());
    }

    #[test]
    fn test_int_to_bytes() {
        assert_eq!(int_to_bytes(0x1234, 2).unwrap(), vec![0x12, 0x34]);
        assert_eq!(int_to_bytes(0x12, 3).unwrap(), vec![0x00, 0x00, 0x12]);
        assert_eq!(int_to_bytes(1, 10).unwrap().len(), 10);
        assert!(int_to_bytes(0x1_0000, 2).is_err());
        assert!(int_to_bytes(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_nibble_swap() {
        assert_eq!(nibble_swap("A0B1", false), "0A1B");
        assert_eq!(nibble_swap("123", false), "21F3");
        assert_eq!(nibble_swap("2143F5", true), "12345");
        assert_eq!(nibble_swap("", true), "");
    }

    #[test]
    fn test_binary_reverse() {
        assert_eq!(binary_reverse(&[0x01, 0x80], false), vec![0x80, 0x01]);
        assert_eq!(binary_reverse(&[0x01, 0x03], true), vec![0xC0, 0x80]);
        assert_eq!(binary_reverse(&[0x0F], true), vec![0xF0]);
    }
}
