use std::{fmt, io::Cursor};

use bytes::Buf;

use crate::{
    codec::{read_packet_id, read_u8, write_packet_id, write_u8},
    constants::QOS_FAILURE,
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType, qos::QoS},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

/// Outcome of one requested subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubAckReturnCode {
    /// Subscription accepted with the granted maximum `QoS`.
    Success(QoS),

    /// Subscription refused, `0x80` on the wire.
    Failure,
}

impl SubAckReturnCode {
    pub fn from_u8(value: u8) -> Result<Self, Error> {
        match value {
            QOS_FAILURE => Ok(Self::Failure),
            value => QoS::from_u8(value).map(Self::Success).ok_or(Error::InvalidQos(value)),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Success(qos) => qos.to_u8(),
            Self::Failure => QOS_FAILURE,
        }
    }
}

impl fmt::Display for SubAckReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(qos) => write!(f, "{qos}"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Represents an MQTT SUBACK packet, one return code per filter of the SUBSCRIBE it answers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubAckPacket {
    pub packet_id: u16,
    pub return_codes: Vec<SubAckReturnCode>,
}

impl ControlPacket for SubAckPacket {
    const PACKET_TYPE: PacketType = PacketType::SubAck;
}

impl<'a> DecodablePacket<'a> for SubAckPacket {
    fn decode_body(_header: &FixedHeader, cursor: &mut Cursor<&'a [u8]>) -> Result<Self, Error> {
        let packet_id = read_packet_id(cursor)?;

        let mut return_codes = Vec::with_capacity(cursor.remaining());
        while cursor.has_remaining() {
            return_codes.push(SubAckReturnCode::from_u8(read_u8(cursor)?)?);
        }

        Ok(Self { packet_id, return_codes })
    }
}

impl EncodablePacket for SubAckPacket {
    fn validate(&self) -> Result<(), Error> {
        if self.packet_id == 0 {
            return Err(Error::ZeroPacketId);
        }

        Ok(())
    }

    fn remaining_len(&self) -> usize {
        2 + self.return_codes.len()
    }

    fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error> {
        write_packet_id(buf, self.packet_id)?;

        for return_code in &self.return_codes {
            write_u8(buf, return_code.to_u8())?;
        }

        Ok(())
    }
}

impl fmt::Display for SubAckPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let return_codes: Vec<String> =
            self.return_codes.iter().map(ToString::to_string).collect();

        write!(
            f,
            "{}: packet_id={} return_codes=[{}]",
            Self::PACKET_TYPE,
            self.packet_id,
            return_codes.join(", ")
        )
    }
}
