use std::{fmt, io::Cursor};

use crate::{
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

/// The DISCONNECT packet is the final packet sent from the client to the server.
///
/// It has no variable header and no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisconnectPacket;

impl ControlPacket for DisconnectPacket {
    const PACKET_TYPE: PacketType = PacketType::Disconnect;
}

impl<'a> DecodablePacket<'a> for DisconnectPacket {
    fn validate_remaining_length(remaining_length: u32) -> Result<(), Error> {
        if remaining_length != 0 {
            return Err(Error::MalformedRemainingLength);
        }

        Ok(())
    }

    fn decode_body(_header: &FixedHeader, _cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error> {
        Ok(Self)
    }
}

impl EncodablePacket for DisconnectPacket {
    fn remaining_len(&self) -> usize {
        0
    }

    fn encode_body(&self, _buf: &mut &mut [u8]) -> Result<(), Error> {
        Ok(())
    }
}

impl fmt::Display for DisconnectPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::PACKET_TYPE)
    }
}
