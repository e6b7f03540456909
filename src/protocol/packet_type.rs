use std::fmt;

use crate::error::Error;

/// Represents the MQTT Control Packet Types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Reserved, forbidden on the wire.
    Reserved = 0x00,

    /// Connection request.
    /// Sent by: Client to Server.
    Connect = 0x01,

    /// Connect acknowledgment.
    /// Sent by: Server to Client.
    ConnAck = 0x02,

    /// Publish message.
    /// Sent by: Client to Server or Server to Client.
    Publish = 0x03,

    /// Publish acknowledgment (`QoS` 1).
    /// Sent by: Client to Server or Server to Client.
    PubAck = 0x04,

    /// Publish received (`QoS` 2 delivery part 1).
    /// Sent by: Client to Server or Server to Client.
    PubRec = 0x05,

    /// Publish release (`QoS` 2 delivery part 2).
    /// Sent by: Client to Server or Server to Client.
    PubRel = 0x06,

    /// Publish complete (`QoS` 2 delivery part 3).
    /// Sent by: Client to Server or Server to Client.
    PubComp = 0x07,

    /// Subscribe request.
    /// Sent by: Client to Server.
    Subscribe = 0x08,

    /// Subscribe acknowledgment.
    /// Sent by: Server to Client.
    SubAck = 0x09,

    /// Unsubscribe request.
    /// Sent by: Client to Server.
    Unsubscribe = 0x0A,

    /// Unsubscribe acknowledgment.
    /// Sent by: Server to Client.
    UnsubAck = 0x0B,

    /// PING request.
    /// Sent by: Client to Server.
    PingReq = 0x0C,

    /// PING response.
    /// Sent by: Server to Client.
    PingResp = 0x0D,

    /// Disconnect notification.
    /// Sent by: Client to Server.
    Disconnect = 0x0E,

    /// Reserved, forbidden on the wire.
    Reserved2 = 0x0F,
}

impl PacketType {
    /// Converts a 4-bit type code to a `PacketType`.
    ///
    /// Returns `None` if the value does not fit in a nibble.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Reserved),
            0x01 => Some(Self::Connect),
            0x02 => Some(Self::ConnAck),
            0x03 => Some(Self::Publish),
            0x04 => Some(Self::PubAck),
            0x05 => Some(Self::PubRec),
            0x06 => Some(Self::PubRel),
            0x07 => Some(Self::PubComp),
            0x08 => Some(Self::Subscribe),
            0x09 => Some(Self::SubAck),
            0x0A => Some(Self::Unsubscribe),
            0x0B => Some(Self::UnsubAck),
            0x0C => Some(Self::PingReq),
            0x0D => Some(Self::PingResp),
            0x0E => Some(Self::Disconnect),
            0x0F => Some(Self::Reserved2),
            _ => None,
        }
    }

    /// Reads the packet type from the first byte of a fixed header.
    pub fn from_header_byte(byte: u8) -> Self {
        match byte >> 4 {
            0x01 => Self::Connect,
            0x02 => Self::ConnAck,
            0x03 => Self::Publish,
            0x04 => Self::PubAck,
            0x05 => Self::PubRec,
            0x06 => Self::PubRel,
            0x07 => Self::PubComp,
            0x08 => Self::Subscribe,
            0x09 => Self::SubAck,
            0x0A => Self::Unsubscribe,
            0x0B => Self::UnsubAck,
            0x0C => Self::PingReq,
            0x0D => Self::PingResp,
            0x0E => Self::Disconnect,
            0x0F => Self::Reserved2,
            _ => Self::Reserved,
        }
    }

    /// Converts the `PacketType` to its numeric value.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// The flags value the protocol mandates for this packet type.
    ///
    /// Returns `None` for `Publish`, whose flags carry DUP, `QoS` and RETAIN.
    pub fn fixed_flags(self) -> Option<u8> {
        match self {
            Self::Publish => None,
            // For these packets, the 4 LSB are reserved and must be: 0010
            Self::PubRel | Self::Subscribe | Self::Unsubscribe => Some(0b0000_0010),
            // For every other packet, the 4 LSB are reserved and must be: 0000
            _ => Some(0b0000_0000),
        }
    }

    /// Checks a flags nibble against what this packet type allows.
    ///
    /// # Errors
    /// - `MalformedFlags` if the flags differ from the mandated value, or if a
    ///   PUBLISH carries the `QoS` bits `11`.
    pub fn validate_flags(self, flags: u8) -> Result<(), Error> {
        let valid = match self.fixed_flags() {
            Some(mandated) => flags == mandated,
            None => (flags >> 1) & 0b11 != 0b11,
        };

        if valid {
            Ok(())
        } else {
            Err(Error::MalformedFlags { packet_type: self, flags })
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Reserved => "RESERVED",
            Self::Connect => "CONNECT",
            Self::ConnAck => "CONNACK",
            Self::Publish => "PUBLISH",
            Self::PubAck => "PUBACK",
            Self::PubRec => "PUBREC",
            Self::PubRel => "PUBREL",
            Self::PubComp => "PUBCOMP",
            Self::Subscribe => "SUBSCRIBE",
            Self::SubAck => "SUBACK",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::UnsubAck => "UNSUBACK",
            Self::PingReq => "PINGREQ",
            Self::PingResp => "PINGRESP",
            Self::Disconnect => "DISCONNECT",
            Self::Reserved2 => "RESERVED2",
        };

        write!(f, "{value}")
    }
}
