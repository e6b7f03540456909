use log::trace;

use crate::{codec::decode_remaining_length, error::Error};

pub mod fixed_header;
pub mod packet_type;
pub mod qos;

use packet_type::PacketType;

/// Finds the length and type of the packet at the start of `src`.
///
/// Returns `Ok(None)` while the fixed header is incomplete, which is the only
/// "read more bytes" signal. Once the header parses, the returned length is the
/// header plus the declared remaining length, whether or not the body is
/// buffered yet. Neither the body nor the flags are inspected.
///
/// # Errors
/// - `MalformedRemainingLength` if the remaining length uses more than 4 bytes.
pub fn detect(src: &[u8]) -> Result<Option<(usize, PacketType)>, Error> {
    if src.len() < 2 {
        return Ok(None);
    }

    let packet_type = PacketType::from_header_byte(src[0]);

    match decode_remaining_length(&src[1..]) {
        Ok((remaining_length, len)) => {
            let total_len = 1 + len + remaining_length as usize;
            trace!("detected {packet_type} with total length {total_len}");
            Ok(Some((total_len, packet_type)))
        }
        Err(Error::BufferTooShort) => Ok(None),
        Err(e) => Err(e),
    }
}
