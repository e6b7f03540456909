use std::fmt;

use crate::protocol::packet_type::PacketType;

/// Errors produced while encoding or decoding MQTT packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Fewer bytes were supplied than the operation requires.
    BufferTooShort,

    /// The remaining length field is malformed or disagrees with the body.
    MalformedRemainingLength,

    /// The flags nibble does not match the value mandated for the packet type.
    MalformedFlags { packet_type: PacketType, flags: u8 },

    /// A per-type decode was invoked on a packet of another type.
    MismatchedMessageType { expected: PacketType, actual: PacketType },

    /// The packet type code is reserved.
    InvalidMessageType(u8),

    /// A packet identifier of zero where the protocol requires one.
    ZeroPacketId,

    /// The body is larger than the remaining length field can express.
    RemainingLengthTooLarge(usize),

    /// A QoS or SUBACK return code outside the defined values.
    InvalidQos(u8),

    /// A string field is not valid UTF-8.
    InvalidUtf8,

    /// A string or binary field is longer than a 2-byte length prefix allows.
    StringTooLong(usize),

    /// CONNECT carries a protocol level other than 3 or 4.
    UnsupportedProtocolVersion(u8),

    /// The packet violates a structural rule of the protocol.
    MalformedPacket(&'static str),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooShort => write!(f, "Buffer Too Short"),
            Self::MalformedRemainingLength => write!(f, "Malformed Remaining Length"),
            Self::MalformedFlags { packet_type, flags } => {
                write!(f, "Malformed Flags: {flags:#06b} for {packet_type}")
            }
            Self::MismatchedMessageType { expected, actual } => {
                write!(f, "Mismatched Message Type: expected {expected}, got {actual}")
            }
            Self::InvalidMessageType(code) => write!(f, "Invalid Message Type: {code}"),
            Self::ZeroPacketId => write!(f, "Zero Packet Identifier"),
            Self::RemainingLengthTooLarge(len) => write!(f, "Remaining Length Too Large: {len}"),
            Self::InvalidQos(value) => write!(f, "Invalid QoS: {value:#04x}"),
            Self::InvalidUtf8 => write!(f, "Invalid UTF-8 String"),
            Self::StringTooLong(len) => write!(f, "String Too Long: {len}"),
            Self::UnsupportedProtocolVersion(version) => {
                write!(f, "Unsupported Protocol Version: {version}")
            }
            Self::MalformedPacket(reason) => write!(f, "Malformed Packet: {reason}"),
        }
    }
}
