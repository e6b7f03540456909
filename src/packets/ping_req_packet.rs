use std::{fmt, io::Cursor};

use crate::{
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

/// Keep-alive probe sent by the client. Header only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingReqPacket;

impl ControlPacket for PingReqPacket {
    const PACKET_TYPE: PacketType = PacketType::PingReq;
}

impl<'a> DecodablePacket<'a> for PingReqPacket {
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

impl EncodablePacket for PingReqPacket {
    fn remaining_len(&self) -> usize {
        0
    }

    fn encode_body(&self, _buf: &mut &mut [u8]) -> Result<(), Error> {
        Ok(())
    }
}

impl fmt::Display for PingReqPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::PACKET_TYPE)
    }
}
