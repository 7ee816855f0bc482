use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

/// Protocol ceiling: a varint over the 32-bit space never exceeds 5 bytes.
pub const VARINT_MAX_BYTES: usize = 5;

const CONTINUE_BIT: u8 = 0x80;
const DATA_BITS: u8 = 0x7F;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("varint exceeds 5 bytes")]
    MalformedVarint,
    #[error("not enough data")]
    NotEnoughData,
    #[error("string too long: {0} > {1}")]
    StringTooLong(usize, usize),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Whether a prefix byte signals that more varint bytes follow.
#[inline]
pub fn expect_more(byte: u8) -> bool {
    byte & CONTINUE_BIT != 0
}

/// Decode a varint from the front of a slice, returning the value and the
/// number of bytes consumed. Five continuation bytes in a row is a protocol
/// violation; a slice that runs out before a terminating byte is not.
pub fn decode_varint(buf: &[u8]) -> CodecResult<(u32, usize)> {
    let mut result: u32 = 0;
    for (i, &byte) in buf.iter().take(VARINT_MAX_BYTES).enumerate() {
        result |= u32::from(byte & DATA_BITS) << (7 * i);
        if !expect_more(byte) {
            return Ok((result, i + 1));
        }
    }
    if buf.len() >= VARINT_MAX_BYTES {
        Err(CodecError::MalformedVarint)
    } else {
        Err(CodecError::NotEnoughData)
    }
}

/// Read a varint from the buffer, consuming its bytes.
pub fn read_varint(buf: &mut BytesMut) -> CodecResult<u32> {
    let (value, consumed) = decode_varint(&buf[..])?;
    buf.advance(consumed);
    Ok(value)
}

/// Write a varint to the buffer.
pub fn write_varint(buf: &mut BytesMut, mut value: u32) {
    loop {
        let mut byte = (value & u32::from(DATA_BITS)) as u8;
        value >>= 7;
        if value != 0 {
            byte |= CONTINUE_BIT;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Calculate the byte length of a varint.
pub fn varint_len(value: u32) -> usize {
    let mut val = value;
    let mut len = 0;
    loop {
        len += 1;
        val >>= 7;
        if val == 0 {
            break;
        }
    }
    len
}

/// Read a protocol string (varint-prefixed UTF-8).
pub fn read_string(buf: &mut BytesMut, max_len: usize) -> CodecResult<String> {
    let len = read_varint(buf)? as usize;
    if len > max_len * 4 {
        return Err(CodecError::StringTooLong(len, max_len));
    }
    if buf.remaining() < len {
        return Err(CodecError::NotEnoughData);
    }
    let bytes = buf.split_to(len);
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a protocol string.
pub fn write_string(buf: &mut BytesMut, s: &str) {
    write_varint(buf, s.len() as u32);
    buf.put_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        let test_cases = vec![
            (0u32, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (255, vec![0xFF, 0x01]),
            (25565, vec![0xDD, 0xC7, 0x01]),
            (2097151, vec![0xFF, 0xFF, 0x7F]),
            (u32::MAX, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];

        for (value, expected_bytes) in test_cases {
            let mut buf = BytesMut::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.to_vec(), expected_bytes, "write_varint({}) failed", value);

            let (decoded, consumed) = decode_varint(&expected_bytes).unwrap();
            assert_eq!(decoded, value, "decode_varint for {} failed", value);
            assert_eq!(consumed, expected_bytes.len());
        }
    }

    #[test]
    fn test_varint_decode_leaves_trailing_bytes() {
        let bytes = [0x80, 0x01, 0xAB, 0xCD];
        let (value, consumed) = decode_varint(&bytes).unwrap();
        assert_eq!(value, 128);
        assert_eq!(consumed, 2);

        let mut buf = BytesMut::from(&bytes[..]);
        assert_eq!(read_varint(&mut buf).unwrap(), 128);
        assert_eq!(&buf[..], &[0xAB, 0xCD]);
    }

    #[test]
    fn test_varint_ceiling() {
        // Continuation bits past the 5th byte are a protocol violation.
        let bytes = [CONTINUE_BIT; 6];
        assert!(matches!(
            decode_varint(&bytes),
            Err(CodecError::MalformedVarint)
        ));
        assert!(matches!(
            decode_varint(&bytes[..5]),
            Err(CodecError::MalformedVarint)
        ));
    }

    #[test]
    fn test_varint_truncated() {
        assert!(matches!(
            decode_varint(&[0x80, 0x80]),
            Err(CodecError::NotEnoughData)
        ));
        assert!(matches!(decode_varint(&[]), Err(CodecError::NotEnoughData)));
    }

    #[test]
    fn test_varint_len() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(25565), 3);
        assert_eq!(varint_len(u32::MAX), 5);
    }

    #[test]
    fn test_string_roundtrip() {
        let test_str = "Hello, Minecraft!";
        let mut buf = BytesMut::new();
        write_string(&mut buf, test_str);
        let result = read_string(&mut buf, 32767).unwrap();
        assert_eq!(result, test_str);
    }

    #[test]
    fn test_string_truncated() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 10);
        buf.put_slice(b"short");
        assert!(matches!(
            read_string(&mut buf, 32767),
            Err(CodecError::NotEnoughData)
        ));
    }
}
