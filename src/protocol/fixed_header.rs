use crate::{
    codec::{decode_remaining_length, encode_remaining_length, remaining_length_len},
    constants::MAX_REMAINING_LENGTH,
    error::Error,
};

use super::packet_type::PacketType;

/// The first 2 to 5 bytes of every MQTT packet.
///
/// Reference: <https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718020>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub packet_type: PacketType,

    /// The low nibble of the first byte.
    pub flags: u8,

    /// Number of bytes following the fixed header.
    pub remaining_length: u32,
}

impl FixedHeader {
    /// Builds a header for a body of `remaining_length` bytes.
    ///
    /// # Errors
    /// - `RemainingLengthTooLarge` if the body cannot be described by the remaining length field.
    pub fn new(packet_type: PacketType, flags: u8, remaining_length: usize) -> Result<Self, Error> {
        if remaining_length > MAX_REMAINING_LENGTH {
            return Err(Error::RemainingLengthTooLarge(remaining_length));
        }

        Ok(Self { packet_type, flags: flags & 0x0F, remaining_length: remaining_length as u32 })
    }

    /// Decodes a fixed header from the start of `src`.
    ///
    /// Returns the header and the number of bytes it occupied.
    ///
    /// # Errors
    /// - `BufferTooShort` if `src` ends inside the header.
    /// - `MalformedFlags` if the flags are not allowed for the packet type.
    /// - `MalformedRemainingLength` if the remaining length uses more than 4 bytes.
    pub fn decode(src: &[u8]) -> Result<(Self, usize), Error> {
        let Some((&byte, rest)) = src.split_first() else {
            return Err(Error::BufferTooShort);
        };

        let packet_type = PacketType::from_header_byte(byte);
        let flags = byte & 0x0F;
        packet_type.validate_flags(flags)?;

        let (remaining_length, len) = decode_remaining_length(rest)?;

        Ok((Self { packet_type, flags, remaining_length }, 1 + len))
    }

    /// Number of bytes this header occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        1 + remaining_length_len(self.remaining_length as usize)
    }

    /// Header length plus remaining length.
    pub fn packet_len(&self) -> usize {
        self.encoded_len() + self.remaining_length as usize
    }

    /// Writes the header to the start of `dst`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    /// - `BufferTooShort` if `dst` is smaller than [`FixedHeader::encoded_len`].
    pub fn encode(&self, dst: &mut [u8]) -> Result<usize, Error> {
        if dst.len() < self.encoded_len() {
            return Err(Error::BufferTooShort);
        }

        let Some((first, rest)) = dst.split_first_mut() else {
            return Err(Error::BufferTooShort);
        };

        *first = (self.packet_type.to_u8() << 4) | self.flags;
        let len = encode_remaining_length(self.remaining_length as usize, rest)?;

        Ok(1 + len)
    }
}
