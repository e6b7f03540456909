//! Packets whose only content is a packet identifier.

use std::{fmt, io::Cursor};

use crate::{
    codec::{read_packet_id, write_packet_id},
    error::Error,
    protocol::{fixed_header::FixedHeader, packet_type::PacketType},
};

use super::{ControlPacket, DecodablePacket, EncodablePacket};

macro_rules! identified_packet {
    ($(#[$meta:meta])* $name:ident, $packet_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            /// Identifier of the flow this packet belongs to. Never 0 on the wire.
            pub packet_id: u16,
        }

        impl $name {
            pub fn new(packet_id: u16) -> Self {
                Self { packet_id }
            }
        }

        impl ControlPacket for $name {
            const PACKET_TYPE: PacketType = $packet_type;
        }

        impl<'a> DecodablePacket<'a> for $name {
            fn validate_remaining_length(remaining_length: u32) -> Result<(), Error> {
                if remaining_length != 2 {
                    return Err(Error::MalformedRemainingLength);
                }

                Ok(())
            }

            fn decode_body(
                _header: &FixedHeader,
                cursor: &mut Cursor<&'a [u8]>,
            ) -> Result<Self, Error> {
                let packet_id = read_packet_id(cursor)?;
                Ok(Self { packet_id })
            }
        }

        impl EncodablePacket for $name {
            fn validate(&self) -> Result<(), Error> {
                if self.packet_id == 0 {
                    return Err(Error::ZeroPacketId);
                }

                Ok(())
            }

            fn remaining_len(&self) -> usize {
                2
            }

            fn encode_body(&self, buf: &mut &mut [u8]) -> Result<(), Error> {
                write_packet_id(buf, self.packet_id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}: packet_id={}", Self::PACKET_TYPE, self.packet_id)
            }
        }
    };
}

identified_packet!(
    /// Acknowledges a `QoS` 1 PUBLISH.
    PubAckPacket,
    PacketType::PubAck
);

identified_packet!(
    /// First answer to a `QoS` 2 PUBLISH.
    PubRecPacket,
    PacketType::PubRec
);

identified_packet!(
    /// Answer to a PUBREC. Carries the mandated flags `0010`.
    PubRelPacket,
    PacketType::PubRel
);

identified_packet!(
    /// Completes a `QoS` 2 flow.
    PubCompPacket,
    PacketType::PubComp
);

identified_packet!(
    /// Acknowledges an UNSUBSCRIBE.
    UnsubAckPacket,
    PacketType::UnsubAck
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_pubrel() {
        let (packet, len) = PubRelPacket::decode(&[0x62, 0x02, 0x00, 0x07]).unwrap();

        assert_eq!(len, 4);
        assert_eq!(packet.packet_id, 7);
        assert_eq!(packet.to_string(), "PUBREL: packet_id=7");
    }

    #[test]
    fn decode_pubrel_needs_flags() {
        assert_eq!(
            PubRelPacket::decode(&[0x60, 0x02, 0x00, 0x07]),
            Err(Error::MalformedFlags { packet_type: PacketType::PubRel, flags: 0 })
        );
    }

    #[test]
    fn decode_puback_wrong_remaining_length() {
        assert_eq!(PubAckPacket::decode(&[0x40, 0x01, 0x00]), Err(Error::MalformedRemainingLength));
        assert_eq!(
            PubAckPacket::decode(&[0x40, 0x03, 0x00, 0x01, 0x00]),
            Err(Error::MalformedRemainingLength)
        );
    }

    #[test]
    fn decode_zero_packet_id() {
        assert_eq!(PubCompPacket::decode(&[0x70, 0x02, 0x00, 0x00]), Err(Error::ZeroPacketId));
    }

    #[test]
    fn decode_incomplete_body() {
        assert_eq!(UnsubAckPacket::decode(&[0xB0, 0x02, 0x00]), Err(Error::BufferTooShort));
    }

    #[test]
    fn decode_mismatched_type() {
        assert_eq!(
            PubRecPacket::decode(&[0x40, 0x02, 0x00, 0x01]),
            Err(Error::MismatchedMessageType {
                expected: PacketType::PubRec,
                actual: PacketType::PubAck
            })
        );
    }

    fn encode<P: EncodablePacket>(packet: P) -> Vec<u8> {
        let mut buf = vec![0u8; packet.encoded_len()];
        let len = packet.encode(&mut buf).unwrap();
        assert_eq!(len, buf.len());
        buf
    }

    #[test]
    fn encode_each_type() {
        assert_eq!(encode(PubAckPacket::new(0x1234)), [0x40, 0x02, 0x12, 0x34]);
        assert_eq!(encode(PubRecPacket::new(0x1234)), [0x50, 0x02, 0x12, 0x34]);
        assert_eq!(encode(PubRelPacket::new(0x1234)), [0x62, 0x02, 0x12, 0x34]);
        assert_eq!(encode(PubCompPacket::new(0x1234)), [0x70, 0x02, 0x12, 0x34]);
        assert_eq!(encode(UnsubAckPacket::new(0x1234)), [0xB0, 0x02, 0x12, 0x34]);
    }

    #[test]
    fn encode_zero_packet_id() {
        let mut buf = [0u8; 4];
        assert_eq!(PubAckPacket::new(0).encode(&mut buf), Err(Error::ZeroPacketId));
    }

    #[test]
    fn encode_short_destination() {
        let mut buf = [0u8; 3];
        assert_eq!(PubAckPacket::new(1).encode(&mut buf), Err(Error::BufferTooShort));
    }
}
