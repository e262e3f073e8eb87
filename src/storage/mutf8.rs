//! Wire primitives: modified UTF-8 strings and booleans.
//!
//! All multi-byte integers in the file format are big-endian (via
//! `byteorder`); strings are length-prefixed modified UTF-8 as produced by
//! legacy readers: a `u16` big-endian byte length followed by the encoded
//! bytes. The encoding differs from standard UTF-8 in two places:
//!
//! - U+0000 is encoded as the two-byte form `C0 80` so encoded strings never
//!   contain a raw NUL byte.
//! - Code points above U+FFFF are encoded as a surrogate pair, each surrogate
//!   written as an independent three-byte group (CESU-8).

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{DictError, Result};

/// Byte length of `s` in the modified UTF-8 encoding.
///
/// The wire format counts UTF-16 code units, so supplementary-plane
/// characters cost two three-byte groups.
pub fn encoded_len(s: &str) -> usize {
    let mut len = 0;
    for unit in s.encode_utf16() {
        len += match unit {
            0x0001..=0x007f => 1,
            0x0000 | 0x0080..=0x07ff => 2,
            _ => 3,
        };
    }
    len
}

/// Writes `s` as a length-prefixed modified UTF-8 string.
pub fn write_mutf8<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    let len = encoded_len(s);
    if len > u16::MAX as usize {
        return Err(DictError::invalid_parameter(format!(
            "string too long for modified UTF-8: {} bytes",
            len
        )));
    }
    writer.write_u16::<BigEndian>(len as u16)?;
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007f => writer.write_u8(unit as u8)?,
            0x0000 | 0x0080..=0x07ff => {
                writer.write_u8(0xc0 | ((unit >> 6) & 0x1f) as u8)?;
                writer.write_u8(0x80 | (unit & 0x3f) as u8)?;
            }
            _ => {
                writer.write_u8(0xe0 | ((unit >> 12) & 0x0f) as u8)?;
                writer.write_u8(0x80 | ((unit >> 6) & 0x3f) as u8)?;
                writer.write_u8(0x80 | (unit & 0x3f) as u8)?;
            }
        }
    }
    Ok(())
}

/// Reads a length-prefixed modified UTF-8 string.
pub fn read_mutf8<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    decode(&bytes)
}

/// Decodes a modified UTF-8 byte sequence without its length prefix.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            0x00..=0x7f => {
                units.push(b as u16);
                i += 1;
            }
            0xc0..=0xdf => {
                if i + 1 >= bytes.len() || bytes[i + 1] & 0xc0 != 0x80 {
                    return Err(malformed(i));
                }
                units.push(((b as u16 & 0x1f) << 6) | (bytes[i + 1] as u16 & 0x3f));
                i += 2;
            }
            0xe0..=0xef => {
                if i + 2 >= bytes.len()
                    || bytes[i + 1] & 0xc0 != 0x80
                    || bytes[i + 2] & 0xc0 != 0x80
                {
                    return Err(malformed(i));
                }
                units.push(
                    ((b as u16 & 0x0f) << 12)
                        | ((bytes[i + 1] as u16 & 0x3f) << 6)
                        | (bytes[i + 2] as u16 & 0x3f),
                );
                i += 3;
            }
            _ => return Err(malformed(i)),
        }
    }
    String::from_utf16(&units)
        .map_err(|_| DictError::corrupt("unpaired surrogate in modified UTF-8 string"))
}

fn malformed(pos: usize) -> DictError {
    DictError::corrupt(format!("malformed modified UTF-8 group at byte {}", pos))
}

/// Reads a single-byte boolean (any non-zero byte is true).
pub fn read_bool<R: Read>(reader: &mut R) -> Result<bool> {
    Ok(reader.read_u8()? != 0)
}

/// Writes a single-byte boolean.
pub fn write_bool<W: Write>(writer: &mut W, value: bool) -> Result<()> {
    writer.write_u8(value as u8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(s: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        write_mutf8(&mut buf, s).expect("encode");
        let decoded = read_mutf8(&mut Cursor::new(&buf)).expect("decode");
        assert_eq!(decoded, s);
        buf
    }

    #[test]
    fn ascii() {
        let buf = roundtrip("hello");
        assert_eq!(buf, [0x00, 0x05, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn empty() {
        assert_eq!(roundtrip(""), [0x00, 0x00]);
    }

    // Fixture bytes taken from a Java DataOutputStream.writeUTF call.
    #[test]
    fn two_byte_form() {
        let buf = roundtrip("café");
        assert_eq!(buf, [0x00, 0x05, b'c', b'a', b'f', 0xc3, 0xa9]);
    }

    #[test]
    fn nul_uses_long_form() {
        let buf = roundtrip("a\u{0}b");
        assert_eq!(buf, [0x00, 0x04, b'a', 0xc0, 0x80, b'b']);
    }

    #[test]
    fn supplementary_plane_is_cesu8() {
        // U+1D11E (musical G clef) = surrogates D834 DD1E.
        let buf = roundtrip("\u{1D11E}");
        assert_eq!(
            buf,
            [0x00, 0x06, 0xed, 0xa0, 0xb4, 0xed, 0xb4, 0x9e]
        );
    }

    #[test]
    fn cjk_three_byte_form() {
        roundtrip("中文");
    }

    #[test]
    fn rejects_oversized_string() {
        let long = "x".repeat(70_000);
        let mut buf = Vec::new();
        assert!(write_mutf8(&mut buf, &long).is_err());
    }

    #[test]
    fn rejects_truncated_group() {
        // Two-byte group with the continuation byte missing.
        assert!(decode(&[0xc3]).is_err());
        // Stray continuation byte.
        assert!(decode(&[0x80]).is_err());
        // 4-byte UTF-8 lead byte is not legal in this encoding.
        assert!(decode(&[0xf0, 0x9d, 0x84, 0x9e]).is_err());
    }
}
