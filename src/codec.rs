//! Primitive field codecs shared by every packet layout.
//!
//! Readers work on a `Cursor` over the packet body and hand back views into the
//! underlying buffer. Writers work on any [`BufMut`], usually the caller's
//! destination slice.

use std::io::Cursor;

use bytes::{Buf, BufMut};

use crate::{
    constants::{MAX_REMAINING_LENGTH, MAX_STRING_LENGTH},
    error::Error,
};

/// Decode the remaining length field.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718023>
///
/// **Specification:**
///
/// ```text
/// multiplier = 1
/// value = 0
/// do
///    encodedByte = 'next byte from stream'
///    value += (encodedByte AND 127) * multiplier
///    multiplier *= 128
///    if (multiplier > 128*128*128)
///       throw Error(Malformed Remaining Length)
/// while ((encodedByte AND 128) != 0)
/// ```
///
/// Returns the decoded value and the number of bytes it occupied.
///
/// # Errors
/// - `BufferTooShort` if `src` ends before a byte without the continuation bit.
/// - `MalformedRemainingLength` if the 4th byte still sets the continuation bit.
pub fn decode_remaining_length(src: &[u8]) -> Result<(u32, usize), Error> {
    let mut multiplier = 1;
    let mut decoded_value = 0u32;

    for (i, &encoded_byte) in src.iter().take(4).enumerate() {
        // Take the 7 least significant bits
        decoded_value += u32::from(encoded_byte & 127) * multiplier;

        // If the continuation bit is not set, we are done
        if encoded_byte & 128 == 0 {
            return Ok((decoded_value, i + 1));
        }

        multiplier *= 128;
    }

    if src.len() >= 4 {
        Err(Error::MalformedRemainingLength)
    } else {
        Err(Error::BufferTooShort)
    }
}

/// Encode the remaining length field into `dst`.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718023>
///
/// Returns the number of bytes written.
///
/// # Errors
/// - `RemainingLengthTooLarge` if `value` exceeds [`MAX_REMAINING_LENGTH`].
/// - `BufferTooShort` if `dst` cannot hold the encoded value.
pub fn encode_remaining_length(value: usize, dst: &mut [u8]) -> Result<usize, Error> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::RemainingLengthTooLarge(value));
    }

    let len = remaining_length_len(value);
    if dst.len() < len {
        return Err(Error::BufferTooShort);
    }

    let mut value = value;
    for slot in dst.iter_mut().take(len) {
        // Extract the 7 least significant bits from the current value
        let mut encoded_byte = (value % 128) as u8;
        value /= 128;

        // If there are still remaining bits, mark this byte as continuation
        if value > 0 {
            encoded_byte |= 128;
        }

        *slot = encoded_byte;
    }

    Ok(len)
}

/// Number of bytes the remaining length field needs for `value`.
pub fn remaining_length_len(value: usize) -> usize {
    match value {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}

/// Encoded size of a length-prefixed string.
pub fn string_len(value: &str) -> usize {
    2 + value.len()
}

/// Encoded size of length-prefixed binary data.
pub fn binary_len(value: &[u8]) -> usize {
    2 + value.len()
}

/// Read a single byte.
pub fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !cursor.has_remaining() {
        return Err(Error::BufferTooShort);
    }

    Ok(cursor.get_u8())
}

/// Read a 2-byte big-endian unsigned integer.
pub fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, Error> {
    if cursor.remaining() < 2 {
        return Err(Error::BufferTooShort);
    }

    Ok(cursor.get_u16())
}

/// Read a packet identifier, rejecting the value 0.
pub fn read_packet_id(cursor: &mut Cursor<&[u8]>) -> Result<u16, Error> {
    match read_u16(cursor)? {
        0 => Err(Error::ZeroPacketId),
        packet_id => Ok(packet_id),
    }
}

/// Take `len` bytes as a view into the underlying buffer.
pub fn read_bytes<'a>(cursor: &mut Cursor<&'a [u8]>, len: usize) -> Result<&'a [u8], Error> {
    if cursor.remaining() < len {
        return Err(Error::BufferTooShort);
    }

    let start = cursor.position() as usize;
    let bytes: &'a [u8] = *cursor.get_ref();
    cursor.advance(len);

    Ok(&bytes[start..start + len])
}

/// Take everything left in the cursor.
pub fn read_remaining<'a>(cursor: &mut Cursor<&'a [u8]>) -> &'a [u8] {
    let start = (cursor.position() as usize).min(cursor.get_ref().len());
    let bytes: &'a [u8] = *cursor.get_ref();
    cursor.set_position(bytes.len() as u64);

    &bytes[start..]
}

/// Decode binary data.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718016>
///
/// **Specification:**
/// - The length is a two-byte integer followed by that many bytes of data.
pub fn read_binary<'a>(cursor: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let len = read_u16(cursor)? as usize;
    read_bytes(cursor, len)
}

/// Decode a UTF-8 string.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718016>
///
/// **Specification:**
/// - Length is a two-byte integer representing the size of the following string.
/// - String must be valid UTF-8.
///
/// # Errors
/// - `BufferTooShort` if the length prefix or the data runs past the cursor.
/// - `InvalidUtf8` if the data is not UTF-8.
pub fn read_utf8_string<'a>(cursor: &mut Cursor<&'a [u8]>) -> Result<&'a str, Error> {
    let bytes = read_binary(cursor)?;
    std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
}

/// Write a single byte.
pub fn write_u8<B: BufMut>(buf: &mut B, value: u8) -> Result<(), Error> {
    if !buf.has_remaining_mut() {
        return Err(Error::BufferTooShort);
    }

    buf.put_u8(value);
    Ok(())
}

/// Write a 2-byte big-endian unsigned integer.
pub fn write_u16<B: BufMut>(buf: &mut B, value: u16) -> Result<(), Error> {
    if buf.remaining_mut() < 2 {
        return Err(Error::BufferTooShort);
    }

    buf.put_u16(value);
    Ok(())
}

/// Write a packet identifier, rejecting the value 0.
pub fn write_packet_id<B: BufMut>(buf: &mut B, packet_id: u16) -> Result<(), Error> {
    if packet_id == 0 {
        return Err(Error::ZeroPacketId);
    }

    write_u16(buf, packet_id)
}

/// Write raw bytes without a length prefix.
pub fn write_bytes<B: BufMut>(buf: &mut B, value: &[u8]) -> Result<(), Error> {
    if buf.remaining_mut() < value.len() {
        return Err(Error::BufferTooShort);
    }

    buf.put_slice(value);
    Ok(())
}

/// Encode binary data with its 2-byte length prefix.
///
/// # Errors
/// - `StringTooLong` if `value` is longer than [`MAX_STRING_LENGTH`].
/// - `BufferTooShort` if `buf` cannot hold the encoded data.
pub fn write_binary<B: BufMut>(buf: &mut B, value: &[u8]) -> Result<(), Error> {
    if value.len() > MAX_STRING_LENGTH {
        return Err(Error::StringTooLong(value.len()));
    }

    write_u16(buf, value.len() as u16)?;
    write_bytes(buf, value)
}

/// Encode a UTF-8 string with its 2-byte length prefix.
pub fn write_utf8_string<B: BufMut>(buf: &mut B, value: &str) -> Result<(), Error> {
    write_binary(buf, value.as_bytes())
}
